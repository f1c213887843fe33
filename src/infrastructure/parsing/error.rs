//! Error types for timetable parsing
//!
//! Distinguishes conditions the page matcher can recover from (skip the
//! table or page with a warning) from fatal document-level failures.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParsingError {
    #[error("Cannot read schedule document {path}: {message}")]
    DocumentUnreadable { path: String, message: String },

    #[error("Malformed table on page {page}: {rows} row(s), expected at least 3")]
    MalformedTable { page: usize, rows: usize },

    #[error("No tables found on matched page {page}")]
    NoTablesOnPage { page: usize },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ParsingError {
    pub fn document_unreadable(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::DocumentUnreadable {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn malformed_table(page: usize, rows: usize) -> Self {
        Self::MalformedTable { page, rows }
    }

    pub fn no_tables_on_page(page: usize) -> Self {
        Self::NoTablesOnPage { page }
    }

    pub fn invalid_pattern(pattern: &str, err: impl std::fmt::Display) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        }
    }

    /// Whether the caller should warn and keep processing remaining pages.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MalformedTable { .. } => true,
            Self::NoTablesOnPage { .. } => true,
            Self::DocumentUnreadable { .. } => false,
            Self::InvalidPattern { .. } => false,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
