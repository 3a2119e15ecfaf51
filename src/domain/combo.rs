//! Category combos and category option combos
//!
//! A category combo is an ordered list of categories. Its option combos are
//! the Cartesian product of the categories' option lists, one option combo
//! (COC) per tuple. Two COCs are the same COC when they belong to the same
//! combo and hold the same option set, whatever their UIDs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use super::catalog::Catalog;
use super::category::{
    CategoryOption, DataDimensionType, DEFAULT_COMBO_UID, DEFAULT_OPTION_COMBO_UID,
};
use super::generator::CombinationGenerator;
use super::uid::Uid;

#[derive(Debug, Error, PartialEq)]
pub enum ComboError {
    #[error("Category combo {0} has no categories")]
    NoCategories(Uid),

    #[error("Category {category} of category combo {combo} has no options")]
    EmptyCategory { combo: Uid, category: Uid },

    #[error("Category combo {combo} refers to unknown category {category}")]
    UnknownCategory { combo: Uid, category: Uid },

    #[error("Category {category} refers to unknown category option {option}")]
    UnknownOption { category: Uid, option: Uid },
}

/// Builds the display name of a COC from its options in category order
pub fn option_combo_name<'a>(options: impl IntoIterator<Item = &'a CategoryOption>) -> String {
    options
        .into_iter()
        .map(|o| o.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One concrete tuple of options, one per category of its combo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryOptionCombo {
    pub uid: Uid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub name: String,

    /// The combo this COC belongs to
    pub category_combo: Uid,

    /// Exactly one option per category of the combo
    pub options: BTreeSet<Uid>,
}

impl CategoryOptionCombo {
    /// Creates a COC with a generated UID
    pub fn new(
        category_combo: Uid,
        options: impl IntoIterator<Item = Uid>,
        name: impl Into<String>,
    ) -> Self {
        let options: BTreeSet<Uid> = options.into_iter().collect();

        let mut seed = category_combo.to_string();
        for option in &options {
            seed.push_str(option.as_str());
        }

        Self {
            uid: Uid::generate_now(&seed),
            code: None,
            name: name.into(),
            category_combo,
            options,
        }
    }

    pub fn is_default(&self) -> bool {
        self.uid.as_str() == DEFAULT_OPTION_COMBO_UID
    }

    /// Returns true if this COC holds exactly the given options
    pub fn has_options(&self, options: &BTreeSet<Uid>) -> bool {
        &self.options == options
    }
}

impl PartialEq for CategoryOptionCombo {
    fn eq(&self, other: &Self) -> bool {
        self.category_combo == other.category_combo && self.options == other.options
    }
}

impl Eq for CategoryOptionCombo {}

impl Hash for CategoryOptionCombo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.category_combo.hash(state);
        self.options.hash(state);
    }
}

/// An ordered set of categories defining a disaggregation scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCombo {
    pub uid: Uid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub name: String,

    #[serde(default)]
    pub data_dimension_type: DataDimensionType,

    /// Whether data entry should hide the total for this combo
    #[serde(default)]
    pub skip_total: bool,

    /// Ordered category UIDs, without duplicates
    #[serde(default)]
    pub categories: Vec<Uid>,

    /// Persisted option combos (unordered)
    #[serde(default)]
    pub option_combos: BTreeSet<Uid>,
}

impl CategoryCombo {
    /// Creates an empty disaggregation combo with a generated UID
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uid: Uid::generate_now(&name),
            code: None,
            name,
            data_dimension_type: DataDimensionType::Disaggregation,
            skip_total: false,
            categories: Vec::new(),
            option_combos: BTreeSet::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.uid.as_str() == DEFAULT_COMBO_UID
    }

    /// Appends a category; returns false if it is already present
    pub fn add_category(&mut self, category: Uid) -> bool {
        if self.categories.contains(&category) {
            return false;
        }
        self.categories.push(category);
        true
    }

    pub fn has_category(&self, category: &Uid) -> bool {
        self.categories.contains(category)
    }

    /// Checks that the combo has categories and every category has options
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ComboError> {
        self.option_dimensions(catalog).map(|_| ())
    }

    /// Returns true if option combos can be generated for this combo
    pub fn is_valid(&self, catalog: &Catalog) -> bool {
        self.validate(catalog).is_ok()
    }

    /// Resolves each category to its ordered options, in category order
    pub fn option_dimensions<'c>(
        &self,
        catalog: &'c Catalog,
    ) -> Result<Vec<Vec<&'c CategoryOption>>, ComboError> {
        if self.categories.is_empty() {
            return Err(ComboError::NoCategories(self.uid.clone()));
        }

        let mut dimensions = Vec::with_capacity(self.categories.len());

        for category_uid in &self.categories {
            let category =
                catalog
                    .category(category_uid)
                    .ok_or_else(|| ComboError::UnknownCategory {
                        combo: self.uid.clone(),
                        category: category_uid.clone(),
                    })?;

            if !category.has_options() {
                return Err(ComboError::EmptyCategory {
                    combo: self.uid.clone(),
                    category: category.uid.clone(),
                });
            }

            let options = category
                .options
                .iter()
                .map(|uid| {
                    catalog
                        .option(uid)
                        .ok_or_else(|| ComboError::UnknownOption {
                            category: category.uid.clone(),
                            option: uid.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            dimensions.push(options);
        }

        Ok(dimensions)
    }

    /// Generates one fresh COC per Cartesian tuple, in enumeration order
    ///
    /// The returned COCs are not in the catalog; each carries a newly
    /// generated UID.
    pub fn generate_option_combos_list(
        &self,
        catalog: &Catalog,
    ) -> Result<Vec<CategoryOptionCombo>, ComboError> {
        let dimensions = self.option_dimensions(catalog)?;

        let option_combos = CombinationGenerator::new(dimensions)
            .map(|tuple| {
                let name = option_combo_name(tuple.iter().copied());
                CategoryOptionCombo::new(
                    self.uid.clone(),
                    tuple.iter().map(|o| o.uid.clone()),
                    name,
                )
            })
            .collect();

        Ok(option_combos)
    }

    /// Returns the persisted COCs in generation order
    ///
    /// Tuples that have no persisted COC yet are skipped, so the result can
    /// be shorter than [`Self::generate_option_combos_list`].
    pub fn sorted_option_combos<'c>(
        &self,
        catalog: &'c Catalog,
    ) -> Result<Vec<&'c CategoryOptionCombo>, ComboError> {
        let persisted: Vec<&CategoryOptionCombo> = self
            .option_combos
            .iter()
            .filter_map(|uid| catalog.option_combo(uid))
            .collect();

        let sorted = self
            .generate_option_combos_list(catalog)?
            .iter()
            .filter_map(|generated| {
                persisted
                    .iter()
                    .find(|coc| coc.has_options(&generated.options))
                    .copied()
            })
            .collect();

        Ok(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    /// Builds Sex = {Male, Female} and Age = {<5, 5+} in a combo
    fn sex_by_age() -> (Catalog, Uid) {
        let mut catalog = Catalog::new();

        let mut sex = Category::new("Sex");
        for name in ["Male", "Female"] {
            let option = CategoryOption::new(name);
            sex.add_option(option.uid.clone());
            catalog.insert_option(option).unwrap();
        }

        let mut age = Category::new("Age");
        for name in ["<5", "5+"] {
            let option = CategoryOption::new(name);
            age.add_option(option.uid.clone());
            catalog.insert_option(option).unwrap();
        }

        let mut combo = CategoryCombo::new("Sex and age");
        combo.add_category(sex.uid.clone());
        combo.add_category(age.uid.clone());
        let combo_uid = combo.uid.clone();

        catalog.insert_category(sex).unwrap();
        catalog.insert_category(age).unwrap();
        catalog.insert_combo(combo).unwrap();

        (catalog, combo_uid)
    }

    #[test]
    fn generates_every_tuple_in_order() {
        let (catalog, combo_uid) = sex_by_age();
        let combo = catalog.combo(&combo_uid).unwrap();

        let generated = combo.generate_option_combos_list(&catalog).unwrap();
        let names: Vec<_> = generated.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["Male, <5", "Male, 5+", "Female, <5", "Female, 5+"]);
        assert!(generated.iter().all(|c| c.category_combo == combo_uid));
        assert!(generated.iter().all(|c| c.options.len() == 2));
    }

    #[test]
    fn equality_ignores_uid_and_name() {
        let combo = Uid::generate_now("combo");
        let a = Uid::generate_now("a");
        let b = Uid::generate_now("b");

        let first = CategoryOptionCombo::new(combo.clone(), [a.clone(), b.clone()], "A, B");
        let mut second = CategoryOptionCombo::new(combo.clone(), [b.clone(), a.clone()], "renamed");
        second.uid = Uid::generate_now("other");

        assert_eq!(first, second);

        let other_combo = CategoryOptionCombo::new(Uid::generate_now("x"), [a, b], "A, B");
        assert_ne!(first, other_combo);
    }

    #[test]
    fn combo_without_categories_is_invalid() {
        let catalog = Catalog::new();
        let combo = CategoryCombo::new("Empty");

        assert!(!combo.is_valid(&catalog));
        assert_eq!(
            combo.generate_option_combos_list(&catalog),
            Err(ComboError::NoCategories(combo.uid.clone()))
        );
    }

    #[test]
    fn category_without_options_is_rejected() {
        let (mut catalog, combo_uid) = sex_by_age();

        let empty = Category::new("Empty");
        let empty_uid = empty.uid.clone();
        catalog.insert_category(empty).unwrap();

        let mut combo = catalog.combo(&combo_uid).unwrap().clone();
        combo.add_category(empty_uid.clone());

        assert_eq!(
            combo.validate(&catalog),
            Err(ComboError::EmptyCategory {
                combo: combo_uid,
                category: empty_uid,
            })
        );
    }

    #[test]
    fn sorted_option_combos_skips_unpersisted_tuples() {
        let (mut catalog, combo_uid) = sex_by_age();
        let combo = catalog.combo(&combo_uid).unwrap().clone();
        let generated = combo.generate_option_combos_list(&catalog).unwrap();

        // Persist only "Female, 5+" and "Male, <5"
        catalog.insert_option_combo(generated[3].clone()).unwrap();
        catalog.insert_option_combo(generated[0].clone()).unwrap();

        let combo = catalog.combo(&combo_uid).unwrap();
        let sorted = combo.sorted_option_combos(&catalog).unwrap();
        let names: Vec<_> = sorted.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["Male, <5", "Female, 5+"]);
        assert_eq!(sorted[0].uid, generated[0].uid);
    }
}
