//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup and store upkeep | `init`, `compact` |
//! | Option | Category options | `option add`, `option rename`, `option delete` |
//! | Category | Categories and their options | `category add`, `category add-option` |
//! | Combo | Combos and option combo generation | `combo add`, `combo prune`, `combo prune-all` |
//! | Coc | Option combo lookups | `coc list`, `coc find`, `coc rename` |
//! | Element | Data elements and operands | `element add`, `element operands` |
//! | Utility | Plain Cartesian products | `cartesian A,B,C A,B` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output and debug-level log events:
//! ```bash
//! catcombo --verbose combo prune "Sex and age"
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod category_cmd;
mod coc_cmd;
mod combo_cmd;
mod element_cmd;
mod option_cmd;
mod output;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
