//! Data elements and operands

use serde::{Deserialize, Serialize};
use std::fmt;

use super::uid::Uid;

/// A data element disaggregated by one category combo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataElement {
    pub uid: Uid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub name: String,

    pub category_combo: Uid,
}

impl DataElement {
    pub fn new(name: impl Into<String>, category_combo: Uid) -> Self {
        let name = name.into();
        Self {
            uid: Uid::generate_now(&name),
            code: None,
            name,
            category_combo,
        }
    }
}

/// A data element, optionally narrowed to one option combo
///
/// Without an option combo the operand stands for the element total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DataElementOperand {
    pub data_element: Uid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_combo: Option<Uid>,

    pub name: String,
}

impl DataElementOperand {
    pub fn total(element: &DataElement) -> Self {
        Self {
            data_element: element.uid.clone(),
            option_combo: None,
            name: element.name.clone(),
        }
    }

    pub fn new(element: &DataElement, option_combo: &Uid, option_combo_name: &str) -> Self {
        Self {
            data_element: element.uid.clone(),
            option_combo: Some(option_combo.clone()),
            name: format!("{} {}", element.name, option_combo_name),
        }
    }

    pub fn is_total(&self) -> bool {
        self.option_combo.is_none()
    }

    /// Dimension item id: `de` or `de.coc`
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DataElementOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.option_combo {
            Some(coc) => write!(f, "{}.{}", self.data_element, coc),
            None => write!(f, "{}", self.data_element),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_ids() {
        let combo: Uid = "bjDvmb4bfuf".parse().unwrap();
        let mut element = DataElement::new("ANC visits", combo);
        element.uid = "fbfJHSPpUQD".parse().unwrap();
        let coc: Uid = "HllvX50cXC0".parse().unwrap();

        let total = DataElementOperand::total(&element);
        assert!(total.is_total());
        assert_eq!(total.id(), "fbfJHSPpUQD");

        let operand = DataElementOperand::new(&element, &coc, "default");
        assert!(!operand.is_total());
        assert_eq!(operand.id(), "fbfJHSPpUQD.HllvX50cXC0");
        assert_eq!(operand.name, "ANC visits default");
    }
}
