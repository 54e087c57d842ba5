use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while turning one export file into records.
///
/// None of these abort a run. File-scoped variants cause the whole file to be
/// skipped; record-scoped variants reject a single transaction while its
/// siblings are still staged.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The file could not be read from disk
    #[error("{file}: failed to read file content: {source}")]
    ReadFailed {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// The file does not follow the QFX/OFX encoding
    #[error("{file}: malformed file{}: {reason}", location.as_ref().map(|l| format!(" at {}", l)).unwrap_or_default())]
    MalformedFile {
        file: String,
        location: Option<String>,
        reason: String,
    },

    /// Neither the file name nor the content identifies a known format
    #[error("{file}: unsupported file format")]
    UnsupportedFormat { file: String },

    // ── Record-scoped ──────────────────────────────────────────────────────────

    /// Posting date is missing a calendar day or is not a real date
    #[error("{file}: transaction {position}: invalid date '{value}'")]
    InvalidDate {
        file: String,
        position: usize,
        value: String,
    },

    /// Amount is numeric but can only be represented by rounding
    #[error("{file}: transaction {position}: amount '{value}' cannot be represented exactly")]
    PrecisionLoss {
        file: String,
        position: usize,
        value: String,
    },

    /// Amount is not a number
    #[error("{file}: transaction {position}: invalid amount '{value}'")]
    InvalidAmount {
        file: String,
        position: usize,
        value: String,
    },

    #[error("{file}: transaction {position}: missing <{field}>")]
    MissingField {
        file: String,
        position: usize,
        field: &'static str,
    },
}

impl ParseError {
    /// `true` when the error prevents any record of the file from being staged.
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            ParseError::ReadFailed { .. }
                | ParseError::MalformedFile { .. }
                | ParseError::UnsupportedFormat { .. }
        )
    }

    pub fn file(&self) -> &str {
        match self {
            ParseError::ReadFailed { file, .. }
            | ParseError::MalformedFile { file, .. }
            | ParseError::UnsupportedFormat { file }
            | ParseError::InvalidDate { file, .. }
            | ParseError::PrecisionLoss { file, .. }
            | ParseError::InvalidAmount { file, .. }
            | ParseError::MissingField { file, .. } => file,
        }
    }
}

/// Record-level fault detected before the owning file and position are known.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordFault {
    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("amount '{0}' cannot be represented exactly")]
    PrecisionLoss(String),

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("missing <{0}>")]
    MissingField(&'static str),
}

impl RecordFault {
    /// Attach the source file and 1-based transaction position.
    pub fn at(self, file: &str, position: usize) -> ParseError {
        let file = file.to_string();
        match self {
            RecordFault::InvalidDate(value) => ParseError::InvalidDate { file, position, value },
            RecordFault::PrecisionLoss(value) => ParseError::PrecisionLoss { file, position, value },
            RecordFault::InvalidAmount(value) => ParseError::InvalidAmount { file, position, value },
            RecordFault::MissingField(field) => ParseError::MissingField { file, position, field },
        }
    }
}

/// Fatal errors: any of these stops the run and exits non-zero.
#[derive(Error, Debug)]
pub enum RunError {
    /// Input or output location is missing or not a directory
    #[error("configuration error: {}: {reason}", path.display())]
    Configuration { path: PathBuf, reason: String },

    /// The staging store could not be opened, read or written
    #[error("staging store unavailable: {0}")]
    StagingUnavailable(String),

    /// The report could not be written or moved into place
    #[error("failed to write report {}: {source}", path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<rusqlite::Error> for RunError {
    fn from(error: rusqlite::Error) -> Self {
        RunError::StagingUnavailable(error.to_string())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

pub type RunResult<T> = Result<T, RunError>;
