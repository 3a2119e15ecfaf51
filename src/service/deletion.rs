//! Deletion veto for obsolete option combos
//!
//! Pruning asks a [`DeletionGuard`] before removing each option combo. A
//! refused deletion leaves the option combo in place and is reported as
//! ignored.

use std::collections::BTreeSet;
use thiserror::Error;

use crate::domain::{CategoryOptionCombo, Uid};

#[derive(Debug, Error, PartialEq)]
#[error("Not allowed to delete category option combo {uid}: {reason}")]
pub struct DeleteNotAllowed {
    pub uid: Uid,
    pub reason: String,
}

/// Decides whether an option combo may be deleted
pub trait DeletionGuard {
    fn check(&self, option_combo: &CategoryOptionCombo) -> Result<(), DeleteNotAllowed>;
}

/// Allows every deletion
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl DeletionGuard for AllowAll {
    fn check(&self, _option_combo: &CategoryOptionCombo) -> Result<(), DeleteNotAllowed> {
        Ok(())
    }
}

/// Refuses to delete the default option combo and a configured set of UIDs
#[derive(Debug, Clone, Default)]
pub struct ProtectedOptionCombos {
    protected: BTreeSet<Uid>,
}

impl ProtectedOptionCombos {
    pub fn new(protected: impl IntoIterator<Item = Uid>) -> Self {
        Self {
            protected: protected.into_iter().collect(),
        }
    }

    pub fn is_protected(&self, uid: &Uid) -> bool {
        self.protected.contains(uid)
    }
}

impl DeletionGuard for ProtectedOptionCombos {
    fn check(&self, option_combo: &CategoryOptionCombo) -> Result<(), DeleteNotAllowed> {
        if option_combo.is_default() {
            return Err(DeleteNotAllowed {
                uid: option_combo.uid.clone(),
                reason: "the default option combo cannot be deleted".to_string(),
            });
        }

        if self.is_protected(&option_combo.uid) {
            return Err(DeleteNotAllowed {
                uid: option_combo.uid.clone(),
                reason: "listed in pruning.protected_option_combos".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::DEFAULT_OPTION_COMBO_UID;

    fn coc(name: &str) -> CategoryOptionCombo {
        CategoryOptionCombo::new(Uid::generate_now("combo"), [Uid::generate_now(name)], name)
    }

    fn default_coc() -> CategoryOptionCombo {
        let mut coc = coc("default");
        coc.uid = DEFAULT_OPTION_COMBO_UID.parse().unwrap();
        coc
    }

    #[test]
    fn allow_all_allows_default() {
        assert!(AllowAll.check(&default_coc()).is_ok());
    }

    #[test]
    fn default_option_combo_is_protected() {
        let guard = ProtectedOptionCombos::default();
        let err = guard.check(&default_coc()).unwrap_err();
        assert!(err.reason.contains("default"));
    }

    #[test]
    fn option_combo_named_default_is_not_protected() {
        let guard = ProtectedOptionCombos::default();
        assert!(guard.check(&coc("default")).is_ok());
    }

    #[test]
    fn listed_option_combos_are_protected() {
        let listed = coc("Male");
        let other = coc("Female");
        let guard = ProtectedOptionCombos::new([listed.uid.clone()]);

        assert!(guard.check(&listed).is_err());
        assert!(guard.check(&other).is_ok());
    }
}
