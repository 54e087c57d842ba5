use std::fmt;

/// A statement format that can be decoded into raw statement lines.
///
/// `parse` fails only when the file as a whole is unusable; problems inside a
/// single transaction are left for the caller to report per record.
pub trait Parser {
    type Output;

    fn parse(content: &str) -> Result<Vec<Self::Output>, MalformedContent>;

    /// Cheap check on the file name and/or content, used for format detection.
    fn is_supported(filename: Option<&str>, content: &str) -> bool;
}

/// Why a file could not be decoded. `line` is 1-based and refers to the
/// file as read, not to any intermediate form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedContent {
    pub line: Option<usize>,
    pub reason: String,
}

impl MalformedContent {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            line: None,
            reason: reason.into(),
        }
    }

    pub fn at_line(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MalformedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.reason),
            None => f.write_str(&self.reason),
        }
    }
}
