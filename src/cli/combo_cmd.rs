//! Category combo CLI commands

use anyhow::{anyhow, Result};
use clap::Subcommand;

use super::category_cmd::resolve_category;
use super::output::Output;
use crate::domain::{Catalog, CategoryCombo, DataDimensionType, Uid};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum ComboCommands {
    /// Add a category combo and generate its option combos
    ///
    /// Example:
    ///   catcombo combo add "Sex and age" --category Sex --category Age
    Add {
        /// Combo name
        name: String,

        /// Unique code
        #[arg(long)]
        code: Option<String>,

        /// Mark as an attribute combo instead of a disaggregation
        #[arg(long)]
        attribute: bool,

        /// Hide the total during data entry
        #[arg(long)]
        skip_total: bool,

        /// Category reference (UID, code or name), in order; repeatable
        #[arg(long = "category", required = true)]
        categories: Vec<String>,
    },

    /// List category combos
    List,

    /// Show a category combo with its option combos in generation order
    Show {
        /// Combo reference
        combo: String,
    },

    /// Replace all option combos of a combo with a freshly generated set
    ///
    /// Protected option combos are kept and reported as ignored.
    Generate {
        /// Combo reference
        combo: String,
    },

    /// Add missing option combos and delete obsolete ones
    Prune {
        /// Combo reference
        combo: String,

        /// Only add missing option combos
        #[arg(long)]
        add_only: bool,
    },

    /// Add and prune option combos for every combo
    PruneAll,
}

pub fn run(cmd: ComboCommands, output: &Output) -> Result<()> {
    match cmd {
        ComboCommands::Add {
            name,
            code,
            attribute,
            skip_total,
            categories,
        } => add_combo(output, &name, code, attribute, skip_total, &categories),
        ComboCommands::List => list_combos(output),
        ComboCommands::Show { combo } => show_combo(output, &combo),
        ComboCommands::Generate { combo } => generate(output, &combo),
        ComboCommands::Prune { combo, add_only } => prune(output, &combo, add_only),
        ComboCommands::PruneAll => prune_all(output),
    }
}

pub(super) fn resolve_combo(catalog: &Catalog, reference: &str) -> Result<Uid> {
    catalog
        .find_combo(reference)
        .map(|c| c.uid.clone())
        .ok_or_else(|| anyhow!("Category combo not found: {}", reference))
}

fn add_combo(
    output: &Output,
    name: &str,
    code: Option<String>,
    attribute: bool,
    skip_total: bool,
    categories: &[String],
) -> Result<()> {
    let project = Project::open_current()?;
    let mut service = project.service()?;

    let mut combo = CategoryCombo::new(name);
    combo.code = code;
    combo.skip_total = skip_total;
    if attribute {
        combo.data_dimension_type = DataDimensionType::Attribute;
    }
    for reference in categories {
        let category = resolve_category(service.catalog(), reference)?;
        if !combo.add_category(category) {
            output.verbose_ctx("combo", &format!("Ignoring repeated category {}", reference));
        }
    }

    let uid = combo.uid.clone();
    let summary = service.add_combo(combo)?;
    project.save(service.catalog())?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "uid": uid,
            "name": name,
            "option_combos": summary.imported(),
        }));
    } else {
        output.success(&format!(
            "Created category combo: {} - {} ({} option combos)",
            uid,
            name,
            summary.imported()
        ));
    }

    Ok(())
}

fn list_combos(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let catalog = project.load_catalog()?;

    if output.is_json() {
        let combos: Vec<&CategoryCombo> = catalog.combos().collect();
        output.data(&combos);
        return Ok(());
    }

    for combo in catalog.combos() {
        let categories: Vec<&str> = combo
            .categories
            .iter()
            .filter_map(|uid| catalog.category(uid))
            .map(|c| c.name.as_str())
            .collect();
        let count = combo.option_combos.len().to_string();
        output.row(&[combo.uid.as_str(), &combo.name, &categories.join(" x "), &count]);
    }

    Ok(())
}

fn show_combo(output: &Output, reference: &str) -> Result<()> {
    let project = Project::open_current()?;
    let catalog = project.load_catalog()?;

    let uid = resolve_combo(&catalog, reference)?;
    let combo = catalog
        .combo(&uid)
        .ok_or_else(|| anyhow!("Category combo not found: {}", reference))?;

    let valid = combo.is_valid(&catalog);
    let option_combos = if valid {
        combo.sorted_option_combos(&catalog)?
    } else {
        catalog.option_combos_of(&uid)
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "combo": combo,
            "valid": valid,
            "option_combos": option_combos,
        }));
        return Ok(());
    }

    println!("{} - {}", combo.uid, combo.name);
    println!("Type: {}", combo.data_dimension_type.as_str());
    if let Some(code) = &combo.code {
        println!("Code: {}", code);
    }
    if combo.skip_total {
        println!("Skip total: yes");
    }

    println!();
    println!("Categories:");
    for category in combo.categories.iter().filter_map(|c| catalog.category(c)) {
        println!("  {} - {} ({} options)", category.uid, category.name, category.options.len());
    }

    if !valid {
        println!();
        println!("Invalid: option combos cannot be generated");
    }

    println!();
    println!("Option combos ({}):", option_combos.len());
    for coc in option_combos {
        println!("  {} - {}", coc.uid, coc.name);
    }

    Ok(())
}

fn generate(output: &Output, reference: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut service = project.service()?;

    let uid = resolve_combo(service.catalog(), reference)?;
    let combo = service
        .catalog()
        .combo(&uid)
        .ok_or_else(|| anyhow!("Category combo not found: {}", reference))?;
    service.validate_combo(combo)?;

    let summary = service.generate_option_combos(&uid)?;

    if summary.is_modified() {
        project.save(service.catalog())?;
    } else {
        output.verbose_ctx("generate", "Only protected option combos, store left untouched");
    }

    output.summary(&summary);
    Ok(())
}

fn prune(output: &Output, reference: &str, add_only: bool) -> Result<()> {
    let project = Project::open_current()?;
    let mut service = project.service()?;

    let uid = resolve_combo(service.catalog(), reference)?;
    let summary = if add_only {
        service.add_missing_option_combos(&uid)?
    } else {
        service.add_and_prune_option_combos(&uid)?
    };

    if summary.is_modified() {
        project.save(service.catalog())?;
    } else {
        output.verbose_ctx("prune", "No changes, metadata store left untouched");
    }

    output.summary(&summary);
    Ok(())
}

fn prune_all(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut service = project.service()?;

    let summary = service.add_and_prune_all_option_combos();

    if summary.is_modified() {
        project.save(service.catalog())?;
    } else {
        output.verbose_ctx("prune", "No changes, metadata store left untouched");
    }

    output.summary(&summary);
    Ok(())
}
