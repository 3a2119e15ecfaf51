//! # Category Service
//!
//! Keeps persisted option combos in step with the categories that define
//! them.
//!
//! ## Operations
//!
//! | Operation | Adds | Renames | Deletes |
//! |-----------|------|---------|---------|
//! | [`CategoryService::add_and_prune_option_combos`] | yes | yes | yes |
//! | [`CategoryService::add_missing_option_combos`] | yes | no | no |
//! | [`CategoryService::update_option_combo_names`] | no | yes | no |
//! | [`CategoryService::generate_option_combos`] | all | no | all unprotected |
//!
//! Deletions go through a [`DeletionGuard`]; refused deletions are reported
//! in the [`ReconcileSummary`] as ignored.

mod category_service;
mod deletion;
mod summary;

pub use crate::domain::{
    DEFAULT_CATEGORY_UID, DEFAULT_COMBO_UID, DEFAULT_OPTION_COMBO_UID, DEFAULT_OPTION_UID,
};
pub use category_service::{CategoryService, Limits, ServiceError};
pub use deletion::{AllowAll, DeleteNotAllowed, DeletionGuard, ProtectedOptionCombos};
pub use summary::{ReconcileSummary, SummaryAction, SummaryEntry};
