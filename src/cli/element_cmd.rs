//! Data element CLI commands

use anyhow::{anyhow, Result};
use clap::Subcommand;

use super::combo_cmd::resolve_combo;
use super::output::Output;
use crate::domain::{DataElement, Uid};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum ElementCommands {
    /// Add a data element disaggregated by a category combo
    Add {
        /// Element name
        name: String,

        /// Unique code
        #[arg(long)]
        code: Option<String>,

        /// Combo reference (defaults to the default combo)
        #[arg(long)]
        combo: Option<String>,
    },

    /// List data elements
    List,

    /// List data element operands
    Operands {
        /// Element references (defaults to every element)
        elements: Vec<String>,

        /// Include a total operand for elements with a non-default combo
        #[arg(long)]
        totals: bool,
    },
}

pub fn run(cmd: ElementCommands, output: &Output) -> Result<()> {
    match cmd {
        ElementCommands::Add { name, code, combo } => {
            add_element(output, &name, code, combo.as_deref())
        }
        ElementCommands::List => list_elements(output),
        ElementCommands::Operands { elements, totals } => operands(output, &elements, totals),
    }
}

fn add_element(
    output: &Output,
    name: &str,
    code: Option<String>,
    combo: Option<&str>,
) -> Result<()> {
    let project = Project::open_current()?;
    let mut catalog = project.load_catalog()?;

    let combo_uid = match combo {
        Some(reference) => resolve_combo(&catalog, reference)?,
        None => catalog
            .default_combo()
            .map(|c| c.uid.clone())
            .ok_or_else(|| anyhow!("No default category combo. Run 'catcombo init' first."))?,
    };

    let mut element = DataElement::new(name, combo_uid);
    element.code = code;
    catalog.insert_data_element(element.clone())?;
    project.save(&catalog)?;

    if output.is_json() {
        output.data(&element);
    } else {
        output.success(&format!("Created data element: {} - {}", element.uid, element.name));
    }

    Ok(())
}

fn list_elements(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let catalog = project.load_catalog()?;

    if output.is_json() {
        let elements: Vec<&DataElement> = catalog.data_elements().collect();
        output.data(&elements);
        return Ok(());
    }

    for element in catalog.data_elements() {
        let combo = catalog
            .combo(&element.category_combo)
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        output.row(&[element.uid.as_str(), &element.name, combo]);
    }

    Ok(())
}

fn operands(output: &Output, elements: &[String], totals: bool) -> Result<()> {
    let project = Project::open_current()?;
    let service = project.service()?;
    let catalog = service.catalog();

    let uids: Vec<Uid> = if elements.is_empty() {
        catalog.data_elements().map(|e| e.uid.clone()).collect()
    } else {
        elements
            .iter()
            .map(|reference| {
                catalog
                    .find_data_element(reference)
                    .map(|e| e.uid.clone())
                    .ok_or_else(|| anyhow!("Data element not found: {}", reference))
            })
            .collect::<Result<_>>()?
    };

    let operands = service.operands(&uids, totals)?;

    if output.is_json() {
        let items: Vec<_> = operands
            .iter()
            .map(|op| {
                serde_json::json!({
                    "id": op.id(),
                    "name": op.name,
                    "total": op.is_total(),
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    for operand in &operands {
        let id = operand.id();
        output.row(&[id.as_str(), operand.name.as_str()]);
    }

    Ok(())
}
