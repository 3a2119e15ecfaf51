//! Category option CLI commands

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use crate::domain::CategoryOption;
use crate::storage::{Project, Record};

#[derive(Subcommand)]
pub enum OptionCommands {
    /// Add a category option
    Add {
        /// Option name
        name: String,

        /// Unique code
        #[arg(long)]
        code: Option<String>,

        /// First day the option may be used (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day the option may be used (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Restrict the option to an organisation unit (repeatable)
        #[arg(long = "org-unit")]
        org_units: Vec<String>,
    },

    /// List category options
    List {
        /// Only options active on this date
        #[arg(long)]
        on: Option<NaiveDate>,

        /// Only options available in this organisation unit
        #[arg(long = "org-unit")]
        org_unit: Option<String>,
    },

    /// Rename a category option (run `coc rename` to update option combo names)
    Rename {
        /// Option reference (UID, code or name)
        option: String,

        /// New name
        name: String,
    },

    /// Delete a category option no category or option combo uses
    Delete {
        /// Option reference (UID, code or name)
        option: String,
    },
}

pub fn run(cmd: OptionCommands, output: &Output) -> Result<()> {
    match cmd {
        OptionCommands::Add {
            name,
            code,
            start,
            end,
            org_units,
        } => add_option(output, &name, code, start, end, org_units),
        OptionCommands::List { on, org_unit } => list_options(output, on, org_unit.as_deref()),
        OptionCommands::Rename { option, name } => rename_option(output, &option, &name),
        OptionCommands::Delete { option } => delete_option(output, &option),
    }
}

fn add_option(
    output: &Output,
    name: &str,
    code: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    org_units: Vec<String>,
) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            bail!("End date {} is before start date {}", end, start);
        }
    }

    let project = Project::open_current()?;
    let catalog = project.load_catalog()?;

    if let Some(code) = &code {
        if catalog.find_option(code).is_some() {
            bail!("Category option code already in use: {}", code);
        }
    }

    let mut option = CategoryOption::new(name);
    option.code = code;
    option.start_date = start;
    option.end_date = end;
    option.org_units = org_units.into_iter().collect();

    let uid = option.uid.clone();
    project
        .metadata_store()
        .append(&Record::CategoryOption(option.clone()))?;
    output.verbose_ctx("option", &format!("Appended option {}", uid));

    if output.is_json() {
        output.data(&option);
    } else {
        output.success(&format!("Created category option: {} - {}", uid, option.name));
    }

    Ok(())
}

fn list_options(output: &Output, on: Option<NaiveDate>, org_unit: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let catalog = project.load_catalog()?;

    let options: Vec<&CategoryOption> = catalog
        .options()
        .filter(|o| on.map_or(true, |date| o.is_active_on(date)))
        .filter(|o| org_unit.map_or(true, |ou| o.is_available_in(ou)))
        .collect();

    if output.is_json() {
        output.data(&options);
        return Ok(());
    }

    if options.is_empty() {
        println!("No category options found.");
        return Ok(());
    }

    for option in options {
        output.row(&[
            option.uid.as_str(),
            option.code.as_deref().unwrap_or("-"),
            &option.name,
        ]);
    }

    Ok(())
}

fn rename_option(output: &Output, reference: &str, name: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut catalog = project.load_catalog()?;

    let uid = catalog
        .find_option(reference)
        .map(|o| o.uid.clone())
        .ok_or_else(|| anyhow!("Category option not found: {}", reference))?;
    let option = catalog
        .option_mut(&uid)
        .ok_or_else(|| anyhow!("Category option not found: {}", reference))?;

    if option.is_default() {
        bail!("The default category option cannot be renamed");
    }

    let previous = std::mem::replace(&mut option.name, name.to_string());
    project.save(&catalog)?;

    output.success(&format!(
        "Renamed category option {}: {} -> {}",
        uid, previous, name
    ));
    Ok(())
}

fn delete_option(output: &Output, reference: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut catalog = project.load_catalog()?;

    let uid = catalog
        .find_option(reference)
        .map(|o| o.uid.clone())
        .ok_or_else(|| anyhow!("Category option not found: {}", reference))?;

    let option = catalog.remove_option(&uid)?;
    project.save(&catalog)?;

    if output.is_json() {
        output.data(&option);
    } else {
        output.success(&format!("Deleted category option: {} - {}", uid, option.name));
    }

    Ok(())
}
