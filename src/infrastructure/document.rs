//! Schedule PDF access.
//!
//! Wraps the pdfplumber reader and eagerly pulls the two things the parsing
//! layer needs from every page: the plain text (whose first line names the
//! study group) and the detected tables as cell grids.

use std::path::Path;

use pdfplumber::{Pdf, TableSettings, TextOptions};
use tracing::info;

use super::parsing::{ParsingError, ParsingResult};

/// Raw material extracted from one PDF page.
#[derive(Debug, Clone)]
pub struct SchedulePage {
    /// 1-based page number for logs and error reports.
    pub number: usize,
    /// Plain text in reading order.
    pub text: String,
    /// Every detected table as rows × columns of optional cell text.
    pub tables: Vec<Vec<Vec<Option<String>>>>,
}

/// A schedule PDF loaded into memory, one [`SchedulePage`] per page.
pub struct ScheduleDocument {
    pages: Vec<SchedulePage>,
}

impl ScheduleDocument {
    /// Open `path` and extract text plus tables from every page.
    ///
    /// Any failure to read or decode the file aborts the whole document:
    /// a half-read schedule must never reach the database.
    pub fn open(path: &Path) -> ParsingResult<Self> {
        let path_str = path.display().to_string();
        let pdf = Pdf::open_file(&path_str, None)
            .map_err(|err| ParsingError::document_unreadable(path, err))?;

        let mut pages = Vec::new();
        for (index, page_result) in pdf.pages_iter().enumerate() {
            let page =
                page_result.map_err(|err| ParsingError::document_unreadable(path, err))?;
            pages.push(SchedulePage {
                number: index + 1,
                text: page.extract_text(&TextOptions::default()),
                tables: page.extract_tables(&TableSettings::default()),
            });
        }

        info!("📑 Loaded {} page(s) from {}", pages.len(), path.display());
        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[SchedulePage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
