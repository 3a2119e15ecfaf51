//! Domain models for catcombo
//!
//! Contains the metadata model and the combination logic without any I/O
//! concerns.

mod uid;
mod generator;
mod category;
mod combo;
mod element;
mod membership;
mod catalog;

pub use uid::{Uid, UidError, UID_LENGTH};
pub use generator::CombinationGenerator;
pub use category::{
    Category, CategoryOption, DataDimensionType, DEFAULT_CATEGORY_UID, DEFAULT_COMBO_UID,
    DEFAULT_NAME, DEFAULT_OPTION_COMBO_UID, DEFAULT_OPTION_UID,
};
pub use combo::{option_combo_name, CategoryCombo, CategoryOptionCombo, ComboError};
pub use element::{DataElement, DataElementOperand};
pub use membership::MembershipGraph;
pub use catalog::{Catalog, CatalogError};
