use std::path::{Path, PathBuf};

use crate::{
    errors::{RunError, RunResult},
    report::REPORT_FILE_NAME,
};

pub const DEFAULT_QFX_DIRECTORY: &str = "qfx_files";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "output";
pub const STAGING_FILE_NAME: &str = "money_mapper_staging.db";

/// Locations a run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_QFX_DIRECTORY, DEFAULT_OUTPUT_DIRECTORY)
    }
}

impl RunConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    pub fn staging_path(&self) -> PathBuf {
        self.output_dir.join(STAGING_FILE_NAME)
    }

    /// Both locations must be existing directories. The input is checked first.
    pub fn validate(&self) -> RunResult<()> {
        require_directory(&self.input_dir, "qfx input location")?;
        require_directory(&self.output_dir, "output location")
    }
}

fn require_directory(path: &Path, role: &str) -> RunResult<()> {
    if path.is_dir() {
        return Ok(());
    }

    let reason = if path.exists() {
        format!("{} is not a directory", role)
    } else {
        format!("{} does not exist", role)
    };

    Err(RunError::Configuration {
        path: path.to_path_buf(),
        reason,
    })
}
