//! Category options and categories
//!
//! A category is one dimension of disaggregation (e.g., "Sex") holding an
//! ordered list of options (e.g., "Male", "Female"). Categories refer to their
//! options by UID; the options themselves live in the catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::uid::Uid;

/// Name and code shared by the default option, category, combo and COC
pub const DEFAULT_NAME: &str = "default";

/// Fixed UIDs of the default dimension
pub const DEFAULT_OPTION_UID: &str = "xYerKDKCefk";
pub const DEFAULT_CATEGORY_UID: &str = "GLevLNI9wkl";
pub const DEFAULT_COMBO_UID: &str = "bjDvmb4bfuf";
pub const DEFAULT_OPTION_COMBO_UID: &str = "HllvX50cXC0";

/// Whether a category or combo disaggregates data or describes its attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataDimensionType {
    #[default]
    Disaggregation,
    Attribute,
}

impl DataDimensionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataDimensionType::Disaggregation => "disaggregation",
            DataDimensionType::Attribute => "attribute",
        }
    }
}

/// One value within a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub uid: Uid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub name: String,

    /// First day the option may be used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Last day the option may be used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Organisation units the option is restricted to (empty means all)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub org_units: BTreeSet<String>,
}

impl CategoryOption {
    /// Creates an unrestricted option with a generated UID
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uid: Uid::generate_now(&name),
            code: None,
            name,
            start_date: None,
            end_date: None,
            org_units: BTreeSet::new(),
        }
    }

    /// Creates an option with a fixed UID
    pub fn with_uid(uid: Uid, name: impl Into<String>) -> Self {
        Self {
            uid,
            ..Self::new(name)
        }
    }

    pub fn is_default(&self) -> bool {
        self.uid.as_str() == DEFAULT_OPTION_UID
    }

    /// Returns true if the date falls within the option's start/end bounds
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }

    /// Returns true if the option may be used in the given organisation unit
    pub fn is_available_in(&self, org_unit: &str) -> bool {
        self.org_units.is_empty() || self.org_units.contains(org_unit)
    }
}

/// A named dimension of disaggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub uid: Uid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub name: String,

    #[serde(default)]
    pub data_dimension_type: DataDimensionType,

    /// Whether the category is exposed as an analytical dimension
    #[serde(default = "default_true")]
    pub data_dimension: bool,

    /// Ordered option UIDs, without duplicates
    #[serde(default)]
    pub options: Vec<Uid>,
}

fn default_true() -> bool {
    true
}

impl Category {
    /// Creates an empty disaggregation category with a generated UID
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uid: Uid::generate_now(&name),
            code: None,
            name,
            data_dimension_type: DataDimensionType::Disaggregation,
            data_dimension: true,
            options: Vec::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.uid.as_str() == DEFAULT_CATEGORY_UID
    }

    /// Appends an option; returns false if it is already present
    pub fn add_option(&mut self, option: Uid) -> bool {
        if self.options.contains(&option) {
            return false;
        }
        self.options.push(option);
        true
    }

    /// Removes an option; returns false if it was not present
    pub fn remove_option(&mut self, option: &Uid) -> bool {
        let len_before = self.options.len();
        self.options.retain(|o| o != option);
        self.options.len() != len_before
    }

    pub fn has_option(&self, option: &Uid) -> bool {
        self.options.contains(option)
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn option_without_bounds_is_always_active() {
        let option = CategoryOption::new("Male");
        assert!(option.is_active_on(date("1900-01-01")));
        assert!(option.is_active_on(date("2100-12-31")));
    }

    #[test]
    fn option_bounds_are_inclusive() {
        let mut option = CategoryOption::new("Project X");
        option.start_date = Some(date("2024-01-01"));
        option.end_date = Some(date("2024-12-31"));

        assert!(!option.is_active_on(date("2023-12-31")));
        assert!(option.is_active_on(date("2024-01-01")));
        assert!(option.is_active_on(date("2024-12-31")));
        assert!(!option.is_active_on(date("2025-01-01")));
    }

    #[test]
    fn org_unit_restriction() {
        let mut option = CategoryOption::new("Partner A");
        assert!(option.is_available_in("ImspTQPwCqd"));

        option.org_units.insert("DiszpKrYNg8".to_string());
        assert!(option.is_available_in("DiszpKrYNg8"));
        assert!(!option.is_available_in("ImspTQPwCqd"));
    }

    #[test]
    fn category_options_stay_unique_and_ordered() {
        let mut category = Category::new("Sex");
        let male = CategoryOption::new("Male");
        let female = CategoryOption::new("Female");

        assert!(category.add_option(male.uid.clone()));
        assert!(category.add_option(female.uid.clone()));
        assert!(!category.add_option(male.uid.clone()));
        assert_eq!(category.options, vec![male.uid.clone(), female.uid.clone()]);

        assert!(category.remove_option(&male.uid));
        assert!(!category.remove_option(&male.uid));
        assert_eq!(category.options, vec![female.uid]);
    }

    #[test]
    fn category_serde_defaults() {
        let json = r#"{"uid":"GLevLNI9wkl","name":"default"}"#;
        let category: Category = serde_json::from_str(json).unwrap();

        assert!(category.is_default());
        assert!(!Category::new(DEFAULT_NAME).is_default());
        assert!(category.data_dimension);
        assert_eq!(category.data_dimension_type, DataDimensionType::Disaggregation);
        assert!(!category.has_options());
    }
}
