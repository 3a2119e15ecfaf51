//! Category option combo CLI commands

use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Result};
use clap::Subcommand;

use super::category_cmd::resolve_option;
use super::combo_cmd::resolve_combo;
use super::output::Output;
use crate::domain::{Catalog, CategoryOptionCombo, Uid};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum CocCommands {
    /// List option combos, optionally for one combo in generation order
    List {
        /// Combo reference
        #[arg(long)]
        combo: Option<String>,
    },

    /// Find the option combo holding exactly the given options
    Find {
        /// Option references (UID, code or name)
        #[arg(required = true)]
        options: Vec<String>,

        /// Restrict the search to one combo
        #[arg(long)]
        combo: Option<String>,

        /// List every option combo holding any of the options
        #[arg(long)]
        any: bool,
    },

    /// Rename option combos whose names no longer match their options
    Rename,
}

pub fn run(cmd: CocCommands, output: &Output) -> Result<()> {
    match cmd {
        CocCommands::List { combo } => list(output, combo.as_deref()),
        CocCommands::Find {
            options,
            combo,
            any,
        } => find(output, &options, combo.as_deref(), any),
        CocCommands::Rename => rename(output),
    }
}

fn print_option_combos(output: &Output, catalog: &Catalog, option_combos: &[&CategoryOptionCombo]) {
    if output.is_json() {
        output.data(&option_combos);
        return;
    }

    if option_combos.is_empty() {
        println!("No category option combos found.");
        return;
    }

    for coc in option_combos {
        let combo = catalog
            .combo(&coc.category_combo)
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        output.row(&[coc.uid.as_str(), &coc.name, combo]);
    }
}

fn list(output: &Output, combo: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let catalog = project.load_catalog()?;

    let option_combos: Vec<&CategoryOptionCombo> = match combo {
        Some(reference) => {
            let uid = resolve_combo(&catalog, reference)?;
            let combo = catalog
                .combo(&uid)
                .ok_or_else(|| anyhow!("Category combo not found: {}", reference))?;
            combo.sorted_option_combos(&catalog)?
        }
        None => catalog.option_combos().collect(),
    };

    print_option_combos(output, &catalog, &option_combos);
    Ok(())
}

fn find(output: &Output, options: &[String], combo: Option<&str>, any: bool) -> Result<()> {
    let project = Project::open_current()?;
    let service = project.service()?;
    let catalog = service.catalog();

    let option_uids: Vec<Uid> = options
        .iter()
        .map(|reference| resolve_option(catalog, reference))
        .collect::<Result<_>>()?;

    if any {
        let matches = service.option_combos_for_options(&option_uids);
        print_option_combos(output, catalog, &matches);
        return Ok(());
    }

    let wanted: BTreeSet<Uid> = option_uids.into_iter().collect();
    let found = match combo {
        Some(reference) => {
            let combo_uid = resolve_combo(catalog, reference)?;
            service.find_option_combo(&combo_uid, &wanted)
        }
        None => service.find_option_combo_by_options(&wanted),
    };

    match found {
        Some(coc) => {
            output.verbose_ctx(
                "find",
                &format!(
                    "Matched {} via {} options",
                    coc.uid,
                    catalog.options_of_option_combo(&coc.uid).len()
                ),
            );
            print_option_combos(output, catalog, &[coc]);
            Ok(())
        }
        None => bail!(
            "No category option combo holds exactly: {}",
            options.join(", ")
        ),
    }
}

fn rename(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut service = project.service()?;

    let renamed = service.update_option_combo_names();
    if renamed > 0 {
        project.save(service.catalog())?;
    }

    if output.is_json() {
        output.data(&serde_json::json!({ "renamed": renamed }));
    } else {
        output.success(&format!("Renamed {} category option combos", renamed));
    }

    Ok(())
}
