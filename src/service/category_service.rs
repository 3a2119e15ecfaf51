//! Category service
//!
//! Orchestrates option combo generation against the persisted catalog:
//! validation against the configured limits, generate-all, add-and-prune,
//! renaming, the default dimension and operand lookups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::deletion::{DeletionGuard, ProtectedOptionCombos};
use super::summary::{ReconcileSummary, SummaryAction};
use crate::domain::{
    Catalog, CatalogError, Category, CategoryCombo, CategoryOption, CategoryOptionCombo,
    ComboError, DataElementOperand, Uid, UidError, DEFAULT_CATEGORY_UID, DEFAULT_COMBO_UID,
    DEFAULT_NAME, DEFAULT_OPTION_COMBO_UID, DEFAULT_OPTION_UID,
};

#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("E1126: category combo {combo} has {actual} categories, more than the maximum of {max}")]
    TooManyCategories { combo: Uid, max: usize, actual: usize },

    #[error("E1127: category {category} has {actual} options, more than the maximum of {max}")]
    TooManyOptions {
        category: Uid,
        max: usize,
        actual: usize,
    },

    #[error("E1128: category combo {combo} would produce {actual} combinations, more than the maximum of {max}")]
    TooManyCombinations { combo: Uid, max: usize, actual: usize },

    #[error("Category combo is invalid: {0}")]
    InvalidCombo(#[from] ComboError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Uid(#[from] UidError),
}

impl ServiceError {
    /// Conflict code for limit violations
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ServiceError::TooManyCategories { .. } => Some("E1126"),
            ServiceError::TooManyOptions { .. } => Some("E1127"),
            ServiceError::TooManyCombinations { .. } => Some("E1128"),
            _ => None,
        }
    }
}

/// Size limits on metadata that feeds the combination generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_options_per_category: usize,
    pub max_categories_per_combo: usize,
    pub max_combinations: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_options_per_category: 50,
            max_categories_per_combo: 5,
            max_combinations: 500,
        }
    }
}

/// Which parts of a reconciliation run are performed
#[derive(Debug, Clone, Copy)]
struct Reconcile {
    add: bool,
    prune: bool,
    rename: bool,
}

impl Reconcile {
    const FULL: Self = Self {
        add: true,
        prune: true,
        rename: true,
    };
    const ADD_ONLY: Self = Self {
        add: true,
        prune: false,
        rename: false,
    };
    const RENAME_ONLY: Self = Self {
        add: false,
        prune: false,
        rename: true,
    };
}

fn fixed_uid(uid: &str) -> Result<Uid, UidError> {
    uid.parse()
}

/// Service over an owned catalog
pub struct CategoryService {
    catalog: Catalog,
    limits: Limits,
    guard: Box<dyn DeletionGuard>,
}

impl CategoryService {
    /// Creates a service with default limits that protects the default COC
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            limits: Limits::default(),
            guard: Box::new(ProtectedOptionCombos::default()),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_guard(mut self, guard: impl DeletionGuard + 'static) -> Self {
        self.guard = Box::new(guard);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    fn combo(&self, uid: &Uid) -> Result<&CategoryCombo, ServiceError> {
        self.catalog.combo(uid).ok_or_else(|| {
            CatalogError::NotFound {
                kind: "Category combo",
                uid: uid.clone(),
            }
            .into()
        })
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    pub fn validate_category(&self, category: &Category) -> Result<(), ServiceError> {
        let actual = category.options.len();
        if actual > self.limits.max_options_per_category {
            return Err(ServiceError::TooManyOptions {
                category: category.uid.clone(),
                max: self.limits.max_options_per_category,
                actual,
            });
        }
        Ok(())
    }

    pub fn validate_combo(&self, combo: &CategoryCombo) -> Result<(), ServiceError> {
        let actual = combo.categories.len();
        if actual > self.limits.max_categories_per_combo {
            return Err(ServiceError::TooManyCategories {
                combo: combo.uid.clone(),
                max: self.limits.max_categories_per_combo,
                actual,
            });
        }

        let mut combinations = 1usize;
        for uid in &combo.categories {
            let category = self
                .catalog
                .category(uid)
                .ok_or_else(|| ComboError::UnknownCategory {
                    combo: combo.uid.clone(),
                    category: uid.clone(),
                })?;
            self.validate_category(category)?;
            combinations = combinations.saturating_mul(category.options.len());
        }

        if combinations > self.limits.max_combinations {
            return Err(ServiceError::TooManyCombinations {
                combo: combo.uid.clone(),
                max: self.limits.max_combinations,
                actual: combinations,
            });
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Metadata changes that feed generation
    // -------------------------------------------------------------------------

    /// Validates and inserts a category
    pub fn add_category(&mut self, category: Category) -> Result<Uid, ServiceError> {
        self.validate_category(&category)?;
        let uid = category.uid.clone();
        self.catalog.insert_category(category)?;
        Ok(uid)
    }

    /// Validates and inserts a combo, then generates its option combos
    pub fn add_combo(&mut self, combo: CategoryCombo) -> Result<ReconcileSummary, ServiceError> {
        self.validate_combo(&combo)?;
        combo.validate(&self.catalog)?;
        let uid = combo.uid.clone();
        self.catalog.insert_combo(combo)?;
        self.add_and_prune_option_combos(&uid)
    }

    /// Appends an option to a category and reconciles every combo using it
    pub fn add_option_to_category(
        &mut self,
        category: &Uid,
        option: &Uid,
    ) -> Result<ReconcileSummary, ServiceError> {
        if !self.catalog.add_option_to_category(category, option)? {
            return Ok(ReconcileSummary::new());
        }

        if let Err(err) = self.validate_after_category_change(category) {
            self.catalog.remove_option_from_category(category, option)?;
            return Err(err);
        }

        Ok(self.update_option_combos_for_category(category))
    }

    /// Removes an option from a category and reconciles every combo using it
    pub fn remove_option_from_category(
        &mut self,
        category: &Uid,
        option: &Uid,
    ) -> Result<ReconcileSummary, ServiceError> {
        if !self.catalog.remove_option_from_category(category, option)? {
            return Ok(ReconcileSummary::new());
        }
        Ok(self.update_option_combos_for_category(category))
    }

    fn validate_after_category_change(&self, category: &Uid) -> Result<(), ServiceError> {
        for combo_uid in self.catalog.combos_with_category(category) {
            self.validate_combo(self.combo(&combo_uid)?)?;
        }
        if let Some(category) = self.catalog.category(category) {
            self.validate_category(category)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Option combo generation
    // -------------------------------------------------------------------------

    /// Replaces a combo's option combos with a freshly generated set
    ///
    /// Existing option combos are discarded together with their UIDs, except
    /// those the deletion guard refuses, which are kept in place of their
    /// generated tuple and reported as ignored. Use
    /// [`Self::add_and_prune_option_combos`] to keep unchanged ones.
    pub fn generate_option_combos(
        &mut self,
        combo_uid: &Uid,
    ) -> Result<ReconcileSummary, ServiceError> {
        let combo = self.combo(combo_uid)?;
        let combo_name = combo.name.clone();
        let mut generated = combo.generate_option_combos_list(&self.catalog)?;

        let persisted: Vec<CategoryOptionCombo> = self
            .catalog
            .option_combos_of(combo_uid)
            .into_iter()
            .cloned()
            .collect();

        let mut summary = ReconcileSummary::new();

        for existing in &persisted {
            if let Err(err) = self.guard.check(existing) {
                let msg = format!(
                    "Kept category option combo `{}` due to `{}`",
                    existing.name, err.reason
                );
                warn!("{}", msg);
                summary.record(SummaryAction::Ignored, combo_uid, Some(&existing.uid), msg);
                generated.retain(|candidate| candidate != existing);
                continue;
            }

            self.catalog.remove_option_combo(&existing.uid)?;
            summary.record(
                SummaryAction::Deleted,
                combo_uid,
                Some(&existing.uid),
                format!("Replaced category option combo `{}`", existing.name),
            );
        }

        for candidate in generated {
            let uid = candidate.uid.clone();
            let msg = format!(
                "Generated category option combo `{}` for category combo `{}`",
                candidate.name, combo_name
            );
            self.catalog.insert_option_combo(candidate)?;
            summary.record(SummaryAction::Imported, combo_uid, Some(&uid), msg);
        }

        info!(
            "Regenerated {} option combos for category combo `{}`, replacing {}, keeping {}",
            summary.imported(),
            combo_name,
            summary.deleted(),
            summary.ignored()
        );

        Ok(summary)
    }

    /// Adds missing option combos, renames drifted ones and prunes obsolete ones
    pub fn add_and_prune_option_combos(
        &mut self,
        combo: &Uid,
    ) -> Result<ReconcileSummary, ServiceError> {
        self.reconcile(combo, Reconcile::FULL)
    }

    /// Adds missing option combos without pruning or renaming
    pub fn add_missing_option_combos(
        &mut self,
        combo: &Uid,
    ) -> Result<ReconcileSummary, ServiceError> {
        self.reconcile(combo, Reconcile::ADD_ONLY)
    }

    /// Adds and prunes option combos for every combo in the catalog
    ///
    /// Invalid combos are skipped and reported as errors.
    pub fn add_and_prune_all_option_combos(&mut self) -> ReconcileSummary {
        let combos: Vec<Uid> = self.catalog.combos().map(|c| c.uid.clone()).collect();
        self.reconcile_each(&combos, Reconcile::FULL)
    }

    /// Adds and prunes option combos for every combo containing the category
    pub fn update_option_combos_for_category(&mut self, category: &Uid) -> ReconcileSummary {
        let combos = self.catalog.combos_with_category(category);
        self.reconcile_each(&combos, Reconcile::FULL)
    }

    /// Renames every option combo whose name no longer matches its options
    ///
    /// Returns the number of renamed option combos.
    pub fn update_option_combo_names(&mut self) -> usize {
        let combos: Vec<Uid> = self.catalog.combos().map(|c| c.uid.clone()).collect();
        self.reconcile_each(&combos, Reconcile::RENAME_ONLY).updated()
    }

    fn reconcile_each(&mut self, combos: &[Uid], mode: Reconcile) -> ReconcileSummary {
        let mut summary = ReconcileSummary::new();

        for combo in combos {
            match self.reconcile(combo, mode) {
                Ok(result) => summary.merge(result),
                Err(err) => {
                    warn!("Could not update option combos for category combo `{}`: {}", combo, err);
                    summary.record(SummaryAction::Error, combo, None, err.to_string());
                }
            }
        }

        summary
    }

    fn reconcile(
        &mut self,
        combo_uid: &Uid,
        mode: Reconcile,
    ) -> Result<ReconcileSummary, ServiceError> {
        let combo = self.combo(combo_uid)?;
        let combo_name = combo.name.clone();

        let generated = match combo.generate_option_combos_list(&self.catalog) {
            Ok(generated) => generated,
            Err(err) => {
                warn!("Category combo `{}` is invalid, could not update option combos", combo_name);
                return Err(err.into());
            }
        };

        let persisted: Vec<CategoryOptionCombo> = self
            .catalog
            .option_combos_of(combo_uid)
            .into_iter()
            .cloned()
            .collect();

        debug!(
            "Reconciling category combo `{}`: {} generated, {} persisted",
            combo_name,
            generated.len(),
            persisted.len()
        );

        let mut summary = ReconcileSummary::new();

        for existing in &persisted {
            match generated
                .iter()
                .find(|g| *g == existing || g.uid == existing.uid)
            {
                Some(expected) => {
                    if mode.rename && existing.name != expected.name {
                        if let Some(coc) = self.catalog.option_combo_mut(&existing.uid) {
                            coc.name = expected.name.clone();
                        }
                        let msg = format!(
                            "Updated category option combo `{}` name to `{}`",
                            existing.uid, expected.name
                        );
                        info!("{}", msg);
                        summary.record(SummaryAction::Updated, combo_uid, Some(&existing.uid), msg);
                    }
                }
                None if mode.prune => self.delete_obsolete(existing, &combo_name, &mut summary)?,
                None => {}
            }
        }

        if mode.add {
            for candidate in generated {
                if candidate.options.is_empty() {
                    warn!(
                        "Generated category option combo `{}` has no options, skipped for category combo `{}`",
                        candidate.name, combo_name
                    );
                } else if !persisted.contains(&candidate) {
                    let msg = format!(
                        "Added missing category option combo `{}` for category combo `{}`",
                        candidate.name, combo_name
                    );
                    let uid = candidate.uid.clone();
                    self.catalog.insert_option_combo(candidate)?;
                    info!("{}", msg);
                    summary.record(SummaryAction::Imported, combo_uid, Some(&uid), msg);
                }
            }
        }

        Ok(summary)
    }

    fn delete_obsolete(
        &mut self,
        coc: &CategoryOptionCombo,
        combo_name: &str,
        summary: &mut ReconcileSummary,
    ) -> Result<(), ServiceError> {
        if let Err(err) = self.guard.check(coc) {
            let msg = format!(
                "Could not delete category option combo `{}` due to `{}`",
                coc.name, err.reason
            );
            warn!("{}", msg);
            summary.record(SummaryAction::Ignored, &coc.category_combo, Some(&coc.uid), msg);
            return Ok(());
        }

        self.catalog.remove_option_combo(&coc.uid)?;

        let msg = format!(
            "Deleted obsolete category option combo `{}` for category combo `{}`",
            coc.name, combo_name
        );
        info!("{}", msg);
        summary.record(SummaryAction::Deleted, &coc.category_combo, Some(&coc.uid), msg);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Default dimension
    // -------------------------------------------------------------------------

    /// Creates the default option, category, combo and option combo
    ///
    /// Returns false if the default combo already exists.
    pub fn generate_default_dimension(&mut self) -> Result<bool, ServiceError> {
        let combo_uid = fixed_uid(DEFAULT_COMBO_UID)?;
        if self.catalog.combo(&combo_uid).is_some() {
            return Ok(false);
        }

        let mut option = CategoryOption::with_uid(fixed_uid(DEFAULT_OPTION_UID)?, DEFAULT_NAME);
        option.code = Some(DEFAULT_NAME.to_string());
        let option_uid = option.uid.clone();
        self.catalog.insert_option(option)?;

        let mut category = Category::new(DEFAULT_NAME);
        category.uid = fixed_uid(DEFAULT_CATEGORY_UID)?;
        category.code = Some(DEFAULT_NAME.to_string());
        category.data_dimension = false;
        category.add_option(option_uid.clone());
        let category_uid = category.uid.clone();
        self.catalog.insert_category(category)?;

        let mut combo = CategoryCombo::new(DEFAULT_NAME);
        combo.uid = combo_uid.clone();
        combo.code = Some(DEFAULT_NAME.to_string());
        combo.add_category(category_uid);
        self.catalog.insert_combo(combo)?;

        let mut coc = CategoryOptionCombo::new(combo_uid, [option_uid], DEFAULT_NAME);
        coc.uid = fixed_uid(DEFAULT_OPTION_COMBO_UID)?;
        coc.code = Some(DEFAULT_NAME.to_string());
        self.catalog.insert_option_combo(coc)?;

        info!("Generated default dimension");
        Ok(true)
    }

    pub fn default_option_combo(&self) -> Option<&CategoryOptionCombo> {
        self.catalog.default_option_combo()
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// The option combo of a combo holding exactly the given options
    pub fn find_option_combo(
        &self,
        combo: &Uid,
        options: &BTreeSet<Uid>,
    ) -> Option<&CategoryOptionCombo> {
        self.catalog
            .option_combos_of(combo)
            .into_iter()
            .find(|coc| coc.has_options(options))
    }

    /// The first option combo, in any combo, holding exactly the given options
    pub fn find_option_combo_by_options(
        &self,
        options: &BTreeSet<Uid>,
    ) -> Option<&CategoryOptionCombo> {
        self.catalog.option_combos().find(|coc| coc.has_options(options))
    }

    /// Option combos holding any of the given options
    pub fn option_combos_for_options(&self, options: &[Uid]) -> Vec<&CategoryOptionCombo> {
        let uids: BTreeSet<&Uid> = options
            .iter()
            .flat_map(|option| self.catalog.option_combos_with_option(option))
            .map(|coc| &coc.uid)
            .collect();

        uids.into_iter()
            .filter_map(|uid| self.catalog.option_combo(uid))
            .collect()
    }

    /// Operands for the given data elements
    ///
    /// With `include_totals`, an element whose combo is not the default one
    /// also gets a total operand ahead of its option combo operands.
    pub fn operands(
        &self,
        elements: &[Uid],
        include_totals: bool,
    ) -> Result<Vec<DataElementOperand>, ServiceError> {
        let mut operands = Vec::new();

        for uid in elements {
            let element = self
                .catalog
                .data_element(uid)
                .ok_or_else(|| CatalogError::NotFound {
                    kind: "Data element",
                    uid: uid.clone(),
                })?;
            let combo = self.combo(&element.category_combo)?;

            if include_totals && !combo.is_default() {
                operands.push(DataElementOperand::total(element));
            }

            for coc in combo.sorted_option_combos(&self.catalog)? {
                operands.push(DataElementOperand::new(element, &coc.uid, &coc.name));
            }
        }

        Ok(operands)
    }
}
