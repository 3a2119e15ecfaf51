//! Reconciliation reports
//!
//! Every add, rename, delete or skipped delete performed while reconciling
//! option combos is recorded as one entry, so callers can print what changed
//! and decide whether anything needs to be saved.

use serde::Serialize;

use crate::domain::Uid;

/// What happened to one option combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryAction {
    /// A missing option combo was created
    Imported,
    /// A persisted option combo was renamed
    Updated,
    /// An obsolete option combo was deleted
    Deleted,
    /// An obsolete option combo could not be deleted
    Ignored,
    /// The category combo could not be reconciled
    Error,
}

impl SummaryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryAction::Imported => "imported",
            SummaryAction::Updated => "updated",
            SummaryAction::Deleted => "deleted",
            SummaryAction::Ignored => "ignored",
            SummaryAction::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub action: SummaryAction,
    pub category_combo: Uid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_combo: Option<Uid>,

    pub description: String,
}

/// Everything a reconciliation run changed or refused to change
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileSummary {
    pub entries: Vec<SummaryEntry>,
}

impl ReconcileSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        action: SummaryAction,
        category_combo: &Uid,
        option_combo: Option<&Uid>,
        description: impl Into<String>,
    ) {
        self.entries.push(SummaryEntry {
            action,
            category_combo: category_combo.clone(),
            option_combo: option_combo.cloned(),
            description: description.into(),
        });
    }

    /// Appends the entries of another summary
    pub fn merge(&mut self, other: ReconcileSummary) {
        self.entries.extend(other.entries);
    }

    pub fn count(&self, action: SummaryAction) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    pub fn imported(&self) -> usize {
        self.count(SummaryAction::Imported)
    }

    pub fn updated(&self) -> usize {
        self.count(SummaryAction::Updated)
    }

    pub fn deleted(&self) -> usize {
        self.count(SummaryAction::Deleted)
    }

    pub fn ignored(&self) -> usize {
        self.count(SummaryAction::Ignored)
    }

    pub fn errors(&self) -> usize {
        self.count(SummaryAction::Error)
    }

    /// Returns true if the catalog was changed and needs saving
    pub fn is_modified(&self) -> bool {
        self.imported() + self.updated() + self.deleted() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One-line count of each action
    pub fn totals(&self) -> String {
        format!(
            "{} imported, {} updated, {} deleted, {} ignored, {} errors",
            self.imported(),
            self.updated(),
            self.deleted(),
            self.ignored(),
            self.errors()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_is_not_modified() {
        let summary = ReconcileSummary::new();
        assert!(summary.is_empty());
        assert!(!summary.is_modified());
    }

    #[test]
    fn ignored_and_errors_do_not_count_as_modifications() {
        let combo = Uid::generate_now("combo");
        let mut summary = ReconcileSummary::new();
        summary.record(SummaryAction::Ignored, &combo, None, "protected");
        summary.record(SummaryAction::Error, &combo, None, "invalid");

        assert!(!summary.is_modified());
        assert_eq!(summary.ignored(), 1);
        assert_eq!(summary.errors(), 1);
    }

    #[test]
    fn merge_and_totals() {
        let combo = Uid::generate_now("combo");
        let coc = Uid::generate_now("coc");

        let mut first = ReconcileSummary::new();
        first.record(SummaryAction::Imported, &combo, Some(&coc), "added");

        let mut second = ReconcileSummary::new();
        second.record(SummaryAction::Deleted, &combo, Some(&coc), "removed");
        second.record(SummaryAction::Imported, &combo, Some(&coc), "added");

        first.merge(second);

        assert!(first.is_modified());
        assert_eq!(
            first.totals(),
            "2 imported, 0 updated, 1 deleted, 0 ignored, 0 errors"
        );
    }
}
