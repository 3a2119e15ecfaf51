//! Category CLI commands
//!
//! Changing a category's options reconciles every category combo that uses
//! it, so the option combos stay in step with the new options.

use anyhow::{anyhow, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{Catalog, Category, DataDimensionType, Uid};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category
    ///
    /// Examples:
    ///   catcombo category add Sex --option Male --option Female
    ///   catcombo category add Funding --attribute --option Donor
    Add {
        /// Category name
        name: String,

        /// Unique code
        #[arg(long)]
        code: Option<String>,

        /// Mark as an attribute category instead of a disaggregation
        #[arg(long)]
        attribute: bool,

        /// Option reference (UID, code or name), in order; repeatable
        #[arg(long = "option")]
        options: Vec<String>,
    },

    /// List categories
    List,

    /// Append an option to a category and update affected option combos
    AddOption {
        /// Category reference
        category: String,

        /// Option reference
        option: String,
    },

    /// Remove an option from a category and update affected option combos
    RemoveOption {
        /// Category reference
        category: String,

        /// Option reference
        option: String,
    },
}

pub fn run(cmd: CategoryCommands, output: &Output) -> Result<()> {
    match cmd {
        CategoryCommands::Add {
            name,
            code,
            attribute,
            options,
        } => add_category(output, &name, code, attribute, &options),
        CategoryCommands::List => list_categories(output),
        CategoryCommands::AddOption { category, option } => {
            change_options(output, &category, &option, true)
        }
        CategoryCommands::RemoveOption { category, option } => {
            change_options(output, &category, &option, false)
        }
    }
}

pub(super) fn resolve_category(catalog: &Catalog, reference: &str) -> Result<Uid> {
    catalog
        .find_category(reference)
        .map(|c| c.uid.clone())
        .ok_or_else(|| anyhow!("Category not found: {}", reference))
}

pub(super) fn resolve_option(catalog: &Catalog, reference: &str) -> Result<Uid> {
    catalog
        .find_option(reference)
        .map(|o| o.uid.clone())
        .ok_or_else(|| anyhow!("Category option not found: {}", reference))
}

fn add_category(
    output: &Output,
    name: &str,
    code: Option<String>,
    attribute: bool,
    options: &[String],
) -> Result<()> {
    let project = Project::open_current()?;
    let mut service = project.service()?;

    let mut category = Category::new(name);
    category.code = code;
    if attribute {
        category.data_dimension_type = DataDimensionType::Attribute;
    }
    for reference in options {
        let option = resolve_option(service.catalog(), reference)?;
        if !category.add_option(option) {
            output.verbose_ctx("category", &format!("Ignoring repeated option {}", reference));
        }
    }

    let uid = service.add_category(category)?;
    project.save(service.catalog())?;

    let Some(category) = service.catalog().category(&uid) else {
        return Err(anyhow!("Category not found after insert: {}", uid));
    };

    if output.is_json() {
        output.data(category);
    } else {
        output.success(&format!(
            "Created category: {} - {} ({} options)",
            uid,
            category.name,
            category.options.len()
        ));
    }

    Ok(())
}

fn list_categories(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let catalog = project.load_catalog()?;

    if output.is_json() {
        let categories: Vec<&Category> = catalog.categories().collect();
        output.data(&categories);
        return Ok(());
    }

    if catalog.categories().next().is_none() {
        println!("No categories found.");
        return Ok(());
    }

    for category in catalog.categories() {
        let options: Vec<&str> = category
            .options
            .iter()
            .filter_map(|uid| catalog.option(uid))
            .map(|o| o.name.as_str())
            .collect();
        output.row(&[
            category.uid.as_str(),
            &category.name,
            category.data_dimension_type.as_str(),
            &options.join(", "),
        ]);
    }

    Ok(())
}

fn change_options(output: &Output, category: &str, option: &str, add: bool) -> Result<()> {
    let project = Project::open_current()?;
    let mut service = project.service()?;

    let category_uid = resolve_category(service.catalog(), category)?;
    let option_uid = resolve_option(service.catalog(), option)?;

    let has_option = service
        .catalog()
        .category(&category_uid)
        .is_some_and(|c| c.has_option(&option_uid));

    if has_option == add {
        let state = if add { "already has" } else { "does not have" };
        output.success(&format!("Category {} {} option {}", category, state, option));
        return Ok(());
    }

    let summary = if add {
        service.add_option_to_category(&category_uid, &option_uid)?
    } else {
        service.remove_option_from_category(&category_uid, &option_uid)?
    };

    // The category itself changed even when no combo uses it
    project.save(service.catalog())?;
    output.verbose_ctx(
        "category",
        &format!(
            "Reconciled {} category combos",
            service.catalog().combos_with_category(&category_uid).len()
        ),
    );

    output.summary(&summary);
    Ok(())
}
