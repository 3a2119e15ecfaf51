//! # Storage Layer
//!
//! Persistence for catcombo projects in git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Metadata | JSONL tagged by `kind` | `.catcombo/metadata.jsonl` |
//! | Config | TOML | `.catcombo/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`MetadataStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .catcombo/
//! ├── metadata.jsonl        # Options, categories, combos, option combos, data elements
//! ├── config.toml           # Limits and pruning settings
//! └── .gitignore            # Ignores interrupted writes
//! ```
//!
//! The option/option-combo membership graph is never stored; it is rebuilt
//! when the catalog is loaded.

mod config;
mod jsonl;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PruningConfig};
pub use jsonl::{catalog_records, MetadataStore, Record};
pub use project::{Project, ProjectError};
