//! catcombo - category option combination generator
//!
//! Data is disaggregated by categories (Sex, Age, ...). A category combo
//! multiplies its categories' options into one category option combo per
//! Cartesian tuple. catcombo generates those combos, keeps the persisted set
//! in step when categories change, and exposes the result to data elements
//! as operands.

pub mod cli;
pub mod domain;
pub mod service;
pub mod storage;

pub use domain::{
    Catalog, Category, CategoryCombo, CategoryOption, CategoryOptionCombo, CombinationGenerator,
    DataElement, DataElementOperand, Uid,
};
pub use service::{CategoryService, ReconcileSummary};
