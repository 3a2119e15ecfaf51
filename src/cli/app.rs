//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::output::{Output, OutputFormat};
use super::{category_cmd, coc_cmd, combo_cmd, element_cmd, option_cmd};
use crate::domain::CombinationGenerator;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "catcombo")]
#[command(author, version, about = "Generate and reconcile category option combinations")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new catcombo project with the default dimension
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage category options
    #[command(name = "option", subcommand)]
    CategoryOption(option_cmd::OptionCommands),

    /// Manage categories
    #[command(subcommand)]
    Category(category_cmd::CategoryCommands),

    /// Manage category combos and generate their option combos
    #[command(subcommand)]
    Combo(combo_cmd::ComboCommands),

    /// Inspect category option combos
    #[command(subcommand)]
    Coc(coc_cmd::CocCommands),

    /// Manage data elements and their operands
    #[command(subcommand)]
    Element(element_cmd::ElementCommands),

    /// Rewrite the metadata store with one line per record
    Compact,

    /// Print the Cartesian product of comma-separated lists
    ///
    /// Example:
    ///   catcombo cartesian A,B,C A,B
    Cartesian {
        /// One comma-separated list per dimension
        #[arg(required = true)]
        lists: Vec<String>,
    },
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins over `--verbose` when set.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "catcombo=debug"
    } else {
        "catcombo=warn"
    };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("catcombo starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Using metadata store: {}", project.metadata_store().path().display()),
            );
            output.success(&format!(
                "Initialized catcombo project at {}",
                project.root().display()
            ));
        }

        Commands::CategoryOption(cmd) => option_cmd::run(cmd, &output)?,
        Commands::Category(cmd) => category_cmd::run(cmd, &output)?,
        Commands::Combo(cmd) => combo_cmd::run(cmd, &output)?,
        Commands::Coc(cmd) => coc_cmd::run(cmd, &output)?,
        Commands::Element(cmd) => element_cmd::run(cmd, &output)?,

        Commands::Compact => compact(&output)?,
        Commands::Cartesian { lists } => cartesian(&output, &lists),
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Drops lines superseded by later records with the same kind and UID
fn compact(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.metadata_store();
    output.verbose_ctx("compact", &format!("Compacting {}", store.path().display()));

    let count = store.compact()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "records": count }));
    } else {
        output.success(&format!("Compacted metadata store to {} records", count));
    }

    Ok(())
}

/// Splits each argument on commas and prints every combination
fn cartesian(output: &Output, lists: &[String]) {
    let dimensions: Vec<Vec<String>> = lists
        .iter()
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect()
        })
        .collect();

    let generator = CombinationGenerator::new(dimensions);
    output.verbose_ctx(
        "cartesian",
        &format!(
            "{} dimensions, {} combinations",
            generator.dimensions(),
            generator.remaining()
        ),
    );

    if output.is_json() {
        let combinations: Vec<Vec<String>> = generator.collect();
        output.data(&combinations);
    } else {
        for combination in generator {
            println!("{}", combination.join(", "));
        }
    }
}
