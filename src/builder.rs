use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{errors::ParseError, parsers::prelude::*, types::Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "qfx")]
    Qfx,
}

/// Outcome of parsing one file: the records that normalized cleanly plus the
/// transactions that were rejected. A rejected sibling never drops a record.
#[derive(Debug)]
pub struct ParsedFile {
    pub source_file: String,
    pub records: Vec<Record>,
    pub rejected: Vec<ParseError>,
}

impl FileFormat {
    /// Format implied by a path's extension (`.qfx`/`.ofx`, any case).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        matches!(ext.as_str(), "qfx" | "ofx").then_some(FileFormat::Qfx)
    }

    fn parse(
        &self,
        source_file: &str,
        content: &str,
        staged_at: DateTime<Utc>,
    ) -> Result<ParsedFile, ParseError> {
        let statement_lines = match self {
            FileFormat::Qfx => QfxParser::parse(content).map_err(|e| ParseError::MalformedFile {
                file: source_file.to_string(),
                location: e.line.map(|line| format!("line {}", line)),
                reason: e.reason,
            })?,
        };

        let mut records = Vec::with_capacity(statement_lines.len());
        let mut rejected = Vec::new();

        for (index, line) in statement_lines.into_iter().enumerate() {
            match Record::from_qfx(source_file, index + 1, staged_at, line) {
                Ok(record) => records.push(record),
                Err(e) => rejected.push(e),
            }
        }

        Ok(ParsedFile {
            source_file: source_file.to_string(),
            records,
            rejected,
        })
    }

    fn detect(filename: Option<&str>, content: Option<&str>) -> Option<Self> {
        if let Some(content) = content {
            if QfxParser::is_supported(filename, content) {
                return Some(FileFormat::Qfx);
            }
        }

        filename.and_then(|name| Self::from_path(Path::new(name)))
    }
}

/// Parses a single export file.
///
/// ```rust,ignore
/// let parsed = ParserBuilder::new()
///     .filename("qfx_files/checking.QFX")
///     .parse()?;
/// ```
#[derive(Default)]
pub struct ParserBuilder {
    content: Option<Vec<u8>>,
    filepath: Option<PathBuf>,
    format: Option<FileFormat>,
    staged_at: Option<DateTime<Utc>>,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: &[u8]) -> Self {
        self.content = Some(content.to_vec());
        self
    }

    pub fn filename(mut self, filename: impl AsRef<Path>) -> Self {
        self.filepath = Some(filename.as_ref().to_path_buf());
        self
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Timestamp stamped on every record; defaults to now.
    pub fn staged_at(mut self, staged_at: DateTime<Utc>) -> Self {
        self.staged_at = Some(staged_at);
        self
    }

    fn source_name(&self) -> String {
        self.filepath
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<memory>".to_string())
    }

    pub fn parse(self) -> Result<ParsedFile, ParseError> {
        let source_file = self.source_name();

        let bytes = match self.content {
            Some(bytes) => bytes,
            None => {
                let path = self.filepath.as_ref().ok_or_else(|| ParseError::MalformedFile {
                    file: source_file.clone(),
                    location: None,
                    reason: "content or filepath is required".to_string(),
                })?;
                fs::read(path).map_err(|source| ParseError::ReadFailed {
                    file: source_file.clone(),
                    source,
                })?
            }
        };

        let content = std::str::from_utf8(&bytes).map_err(|e| ParseError::MalformedFile {
            file: source_file.clone(),
            location: Some(format!("byte {}", e.valid_up_to())),
            reason: "content is not valid UTF-8".to_string(),
        })?;

        let filename = self.filepath.as_deref().and_then(Path::to_str);
        let format = self
            .format
            .or_else(|| FileFormat::detect(filename, Some(content)))
            .ok_or_else(|| ParseError::UnsupportedFormat { file: source_file.clone() })?;

        format.parse(&source_file, content, self.staged_at.unwrap_or_else(Utc::now))
    }
}
