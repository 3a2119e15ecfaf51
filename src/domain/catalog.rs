//! In-memory metadata catalog
//!
//! Owns every option, category, combo, COC and data element, keyed by UID.
//! References only point from the owning side (combo -> categories ->
//! options, COC -> combo + options); the reverse option -> COC direction is
//! the derived [`MembershipGraph`], updated on every COC insert and removal.

use std::collections::BTreeMap;
use thiserror::Error;

use super::category::{Category, CategoryOption};
use super::combo::{CategoryCombo, CategoryOptionCombo};
use super::element::DataElement;
use super::membership::MembershipGraph;
use super::uid::Uid;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("UID already in use: {0}")]
    DuplicateUid(Uid),

    #[error("{kind} not found: {uid}")]
    NotFound { kind: &'static str, uid: Uid },

    #[error("{kind} {uid} is still used by {used_by}")]
    InUse {
        kind: &'static str,
        uid: Uid,
        used_by: Uid,
    },
}

fn not_found(kind: &'static str, uid: &Uid) -> CatalogError {
    CatalogError::NotFound {
        kind,
        uid: uid.clone(),
    }
}

/// Matches a user-supplied reference against UID, then code, then name
fn resolve<'a, T>(
    items: &'a BTreeMap<Uid, T>,
    reference: &str,
    code: impl Fn(&T) -> Option<&str>,
    name: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let reference = reference.trim();

    if let Ok(uid) = reference.parse::<Uid>() {
        if let Some(item) = items.get(&uid) {
            return Some(item);
        }
    }

    items
        .values()
        .find(|item| code(*item) == Some(reference))
        .or_else(|| items.values().find(|item| name(*item) == reference))
}

/// The full set of disaggregation metadata
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    options: BTreeMap<Uid, CategoryOption>,
    categories: BTreeMap<Uid, Category>,
    combos: BTreeMap<Uid, CategoryCombo>,
    option_combos: BTreeMap<Uid, CategoryOptionCombo>,
    data_elements: BTreeMap<Uid, DataElement>,
    membership: MembershipGraph,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any object already uses the UID
    pub fn contains_uid(&self, uid: &Uid) -> bool {
        self.options.contains_key(uid)
            || self.categories.contains_key(uid)
            || self.combos.contains_key(uid)
            || self.option_combos.contains_key(uid)
            || self.data_elements.contains_key(uid)
    }

    fn ensure_unused(&self, uid: &Uid) -> Result<(), CatalogError> {
        if self.contains_uid(uid) {
            return Err(CatalogError::DuplicateUid(uid.clone()));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
            && self.categories.is_empty()
            && self.combos.is_empty()
            && self.option_combos.is_empty()
            && self.data_elements.is_empty()
    }

    // -------------------------------------------------------------------------
    // Category options
    // -------------------------------------------------------------------------

    pub fn insert_option(&mut self, option: CategoryOption) -> Result<(), CatalogError> {
        self.ensure_unused(&option.uid)?;
        self.options.insert(option.uid.clone(), option);
        Ok(())
    }

    /// Removes an option that no category or COC refers to
    pub fn remove_option(&mut self, uid: &Uid) -> Result<CategoryOption, CatalogError> {
        if !self.options.contains_key(uid) {
            return Err(not_found("Category option", uid));
        }

        if let Some(category) = self.categories.values().find(|c| c.has_option(uid)) {
            return Err(CatalogError::InUse {
                kind: "Category option",
                uid: uid.clone(),
                used_by: category.uid.clone(),
            });
        }

        if let Some(coc) = self.membership.option_combos_of(uid).into_iter().next() {
            return Err(CatalogError::InUse {
                kind: "Category option",
                uid: uid.clone(),
                used_by: coc,
            });
        }

        self.membership.remove_option(uid);
        self.options.remove(uid).ok_or_else(|| not_found("Category option", uid))
    }

    pub fn option(&self, uid: &Uid) -> Option<&CategoryOption> {
        self.options.get(uid)
    }

    pub fn option_mut(&mut self, uid: &Uid) -> Option<&mut CategoryOption> {
        self.options.get_mut(uid)
    }

    pub fn options(&self) -> impl Iterator<Item = &CategoryOption> {
        self.options.values()
    }

    pub fn find_option(&self, reference: &str) -> Option<&CategoryOption> {
        resolve(&self.options, reference, |o| o.code.as_deref(), |o| o.name.as_str())
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    pub fn insert_category(&mut self, category: Category) -> Result<(), CatalogError> {
        self.ensure_unused(&category.uid)?;
        for option in &category.options {
            if !self.options.contains_key(option) {
                return Err(not_found("Category option", option));
            }
        }
        self.categories.insert(category.uid.clone(), category);
        Ok(())
    }

    /// Appends an existing option to an existing category
    pub fn add_option_to_category(
        &mut self,
        category: &Uid,
        option: &Uid,
    ) -> Result<bool, CatalogError> {
        if !self.options.contains_key(option) {
            return Err(not_found("Category option", option));
        }
        let category = self
            .categories
            .get_mut(category)
            .ok_or_else(|| not_found("Category", category))?;
        Ok(category.add_option(option.clone()))
    }

    /// Removes an option from a category; the option itself is kept
    pub fn remove_option_from_category(
        &mut self,
        category: &Uid,
        option: &Uid,
    ) -> Result<bool, CatalogError> {
        let category = self
            .categories
            .get_mut(category)
            .ok_or_else(|| not_found("Category", category))?;
        Ok(category.remove_option(option))
    }

    pub fn category(&self, uid: &Uid) -> Option<&Category> {
        self.categories.get(uid)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn find_category(&self, reference: &str) -> Option<&Category> {
        resolve(&self.categories, reference, |c| c.code.as_deref(), |c| c.name.as_str())
    }

    // -------------------------------------------------------------------------
    // Category combos
    // -------------------------------------------------------------------------

    /// Inserts a combo; its COC set is rebuilt from the COCs already stored
    pub fn insert_combo(&mut self, mut combo: CategoryCombo) -> Result<(), CatalogError> {
        self.ensure_unused(&combo.uid)?;
        for category in &combo.categories {
            if !self.categories.contains_key(category) {
                return Err(not_found("Category", category));
            }
        }

        combo.option_combos = self
            .option_combos
            .values()
            .filter(|coc| coc.category_combo == combo.uid)
            .map(|coc| coc.uid.clone())
            .collect();

        self.combos.insert(combo.uid.clone(), combo);
        Ok(())
    }

    pub fn combo(&self, uid: &Uid) -> Option<&CategoryCombo> {
        self.combos.get(uid)
    }

    pub fn combos(&self) -> impl Iterator<Item = &CategoryCombo> {
        self.combos.values()
    }

    pub fn find_combo(&self, reference: &str) -> Option<&CategoryCombo> {
        resolve(&self.combos, reference, |c| c.code.as_deref(), |c| c.name.as_str())
    }

    /// UIDs of the combos that contain the category
    pub fn combos_with_category(&self, category: &Uid) -> Vec<Uid> {
        self.combos
            .values()
            .filter(|combo| combo.has_category(category))
            .map(|combo| combo.uid.clone())
            .collect()
    }

    // -------------------------------------------------------------------------
    // Category option combos
    // -------------------------------------------------------------------------

    /// Inserts a COC, adds it to its combo and registers its memberships
    pub fn insert_option_combo(&mut self, coc: CategoryOptionCombo) -> Result<(), CatalogError> {
        self.ensure_unused(&coc.uid)?;
        for option in &coc.options {
            if !self.options.contains_key(option) {
                return Err(not_found("Category option", option));
            }
        }

        let combo = self
            .combos
            .get_mut(&coc.category_combo)
            .ok_or_else(|| not_found("Category combo", &coc.category_combo))?;
        combo.option_combos.insert(coc.uid.clone());

        self.membership.register(&coc.uid, &coc.options);
        self.option_combos.insert(coc.uid.clone(), coc);
        Ok(())
    }

    /// Removes a COC from the catalog, its combo and the membership graph
    pub fn remove_option_combo(&mut self, uid: &Uid) -> Result<CategoryOptionCombo, CatalogError> {
        let coc = self
            .option_combos
            .remove(uid)
            .ok_or_else(|| not_found("Category option combo", uid))?;

        if let Some(combo) = self.combos.get_mut(&coc.category_combo) {
            combo.option_combos.remove(uid);
        }
        self.membership.unregister(uid);

        Ok(coc)
    }

    pub fn option_combo(&self, uid: &Uid) -> Option<&CategoryOptionCombo> {
        self.option_combos.get(uid)
    }

    pub fn option_combo_mut(&mut self, uid: &Uid) -> Option<&mut CategoryOptionCombo> {
        self.option_combos.get_mut(uid)
    }

    pub fn option_combos(&self) -> impl Iterator<Item = &CategoryOptionCombo> {
        self.option_combos.values()
    }

    /// The persisted COCs of a combo
    pub fn option_combos_of(&self, combo: &Uid) -> Vec<&CategoryOptionCombo> {
        self.combos
            .get(combo)
            .map(|c| {
                c.option_combos
                    .iter()
                    .filter_map(|uid| self.option_combos.get(uid))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// COCs that hold the option, via the membership graph
    pub fn option_combos_with_option(&self, option: &Uid) -> Vec<&CategoryOptionCombo> {
        self.membership
            .option_combos_of(option)
            .iter()
            .filter_map(|uid| self.option_combos.get(uid))
            .collect()
    }

    /// Options held by a COC, via the membership graph
    pub fn options_of_option_combo(&self, coc: &Uid) -> Vec<&CategoryOption> {
        self.membership
            .options_of(coc)
            .iter()
            .filter_map(|uid| self.options.get(uid))
            .collect()
    }

    pub fn find_option_combo(&self, reference: &str) -> Option<&CategoryOptionCombo> {
        resolve(&self.option_combos, reference, |c| c.code.as_deref(), |c| c.name.as_str())
    }

    /// The COC of the default combo, found by its fixed UID
    pub fn default_option_combo(&self) -> Option<&CategoryOptionCombo> {
        self.option_combos.values().find(|coc| coc.is_default())
    }

    pub fn default_combo(&self) -> Option<&CategoryCombo> {
        self.combos.values().find(|combo| combo.is_default())
    }

    // -------------------------------------------------------------------------
    // Data elements
    // -------------------------------------------------------------------------

    pub fn insert_data_element(&mut self, element: DataElement) -> Result<(), CatalogError> {
        self.ensure_unused(&element.uid)?;
        if !self.combos.contains_key(&element.category_combo) {
            return Err(not_found("Category combo", &element.category_combo));
        }
        self.data_elements.insert(element.uid.clone(), element);
        Ok(())
    }

    pub fn data_element(&self, uid: &Uid) -> Option<&DataElement> {
        self.data_elements.get(uid)
    }

    pub fn data_elements(&self) -> impl Iterator<Item = &DataElement> {
        self.data_elements.values()
    }

    pub fn find_data_element(&self, reference: &str) -> Option<&DataElement> {
        resolve(&self.data_elements, reference, |e| e.code.as_deref(), |e| e.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(catalog: &mut Catalog, name: &str) -> Uid {
        let option = CategoryOption::new(name);
        let uid = option.uid.clone();
        catalog.insert_option(option).unwrap();
        uid
    }

    #[test]
    fn rejects_duplicate_uids_across_kinds() {
        let mut catalog = Catalog::new();
        let male = option(&mut catalog, "Male");

        let mut category = Category::new("Sex");
        category.uid = male.clone();

        assert_eq!(
            catalog.insert_category(category),
            Err(CatalogError::DuplicateUid(male))
        );
    }

    #[test]
    fn category_must_reference_known_options() {
        let mut catalog = Catalog::new();
        let mut category = Category::new("Sex");
        let ghost = Uid::generate_now("ghost");
        category.add_option(ghost.clone());

        assert_eq!(
            catalog.insert_category(category),
            Err(CatalogError::NotFound {
                kind: "Category option",
                uid: ghost,
            })
        );
    }

    #[test]
    fn option_combo_insert_and_remove_keep_indexes_in_step() {
        let mut catalog = Catalog::new();
        let male = option(&mut catalog, "Male");

        let mut sex = Category::new("Sex");
        sex.add_option(male.clone());
        let mut combo = CategoryCombo::new("Sex");
        combo.add_category(sex.uid.clone());
        let combo_uid = combo.uid.clone();
        catalog.insert_category(sex).unwrap();
        catalog.insert_combo(combo).unwrap();

        let coc = CategoryOptionCombo::new(combo_uid.clone(), [male.clone()], "Male");
        let coc_uid = coc.uid.clone();
        catalog.insert_option_combo(coc).unwrap();

        assert!(catalog.combo(&combo_uid).unwrap().option_combos.contains(&coc_uid));
        assert_eq!(catalog.option_combos_with_option(&male).len(), 1);
        assert_eq!(catalog.options_of_option_combo(&coc_uid)[0].name, "Male");

        let removed = catalog.remove_option_combo(&coc_uid).unwrap();
        assert_eq!(removed.uid, coc_uid);
        assert!(catalog.combo(&combo_uid).unwrap().option_combos.is_empty());
        assert!(catalog.option_combos_with_option(&male).is_empty());
    }

    #[test]
    fn option_in_use_cannot_be_removed() {
        let mut catalog = Catalog::new();
        let male = option(&mut catalog, "Male");
        let mut sex = Category::new("Sex");
        sex.add_option(male.clone());
        let sex_uid = sex.uid.clone();
        catalog.insert_category(sex).unwrap();

        assert!(matches!(
            catalog.remove_option(&male),
            Err(CatalogError::InUse { .. })
        ));

        catalog.remove_option_from_category(&sex_uid, &male).unwrap();
        assert_eq!(catalog.remove_option(&male).unwrap().name, "Male");
        assert!(catalog.option(&male).is_none());
    }

    #[test]
    fn default_option_combo_is_found_by_uid_not_name() {
        let mut catalog = Catalog::new();
        let option = option(&mut catalog, "default");
        let mut category = Category::new("Placeholder");
        category.add_option(option.clone());
        let mut combo = CategoryCombo::new("Placeholder");
        combo.add_category(category.uid.clone());
        let combo_uid = combo.uid.clone();
        catalog.insert_category(category).unwrap();
        catalog.insert_combo(combo).unwrap();

        let lookalike = CategoryOptionCombo::new(combo_uid, [option], "default");
        assert!(!lookalike.is_default());
        catalog.insert_option_combo(lookalike).unwrap();

        assert!(catalog.default_option_combo().is_none());
        assert!(catalog.default_combo().is_none());
    }

    #[test]
    fn references_resolve_by_uid_code_then_name() {
        let mut catalog = Catalog::new();
        let mut under_five = CategoryOption::new("Under five");
        under_five.code = Some("AGE_LT5".to_string());
        let uid = under_five.uid.clone();
        catalog.insert_option(under_five).unwrap();

        assert_eq!(catalog.find_option(uid.as_str()).unwrap().uid, uid);
        assert_eq!(catalog.find_option("AGE_LT5").unwrap().uid, uid);
        assert_eq!(catalog.find_option("Under five").unwrap().uid, uid);
        assert!(catalog.find_option("Over five").is_none());
    }
}
