//! Consolidate a directory of QFX/OFX statement exports into one CSV report.
//!
//! A run clears the staging store, parses every export in the input
//! directory, stages the records of each file as one batch and finally
//! writes `money_mapper_output.csv` from everything staged.
//!
//! ```rust,ignore
//! use money_mapper::{RunConfig, run};
//!
//! let summary = run(&RunConfig::new("qfx_files", "output"))?;
//! summary.log_summary();
//! ```

mod builder;
mod types;

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod parsers;
pub mod report;
pub mod staging;

pub use builder::{FileFormat, ParsedFile, ParserBuilder};
pub use config::RunConfig;
pub use coordinator::{Coordinator, RunSummary, discover_files, run};
pub use parsers::prelude::*;
pub use report::ReportGenerator;
pub use staging::{MemoryStagingStore, SqliteStagingStore, StagingStore};
pub use types::Record;
