//! Group-to-page matching and whole-document entry collection.
//!
//! The source PDF dedicates one page per study group, with the group name on
//! the first text line. Matching is deliberately loose: either string may
//! contain the other, case-insensitively, so "Zarządzanie II gr1" matches a
//! heading like "PLAN ZAJĘĆ - ZARZĄDZANIE II GR1 (NIESTACJONARNE)".

use tracing::{debug, info, warn};

use crate::domain::ScheduleEntry;
use crate::infrastructure::document::SchedulePage;

use super::error::{ParsingError, ParsingResult};
use super::grid_processor::GridProcessor;

/// Matches document pages against the configured groups and harvests their
/// tables through the grid processor.
pub struct PageMatcher {
    grid: GridProcessor,
    target_groups: Vec<String>,
}

impl PageMatcher {
    pub fn new(target_groups: Vec<String>) -> ParsingResult<Self> {
        Ok(Self {
            grid: GridProcessor::new()?,
            target_groups,
        })
    }

    /// Return the first configured group matching `page_heading`, if any.
    ///
    /// The comparison lowercases both sides and accepts containment in either
    /// direction.
    pub fn match_group(&self, page_heading: &str) -> Option<&str> {
        let heading = page_heading.trim().to_lowercase();
        self.target_groups.iter().find_map(|target| {
            let target_lower = target.to_lowercase();
            (heading.contains(&target_lower) || target_lower.contains(&heading))
                .then_some(target.as_str())
        })
    }

    /// Collect schedule entries from every page that names a target group.
    ///
    /// Recoverable per-page problems (a page without tables, a table too
    /// short to hold data rows) are logged and skipped so one bad page never
    /// discards the rest of the document.
    pub fn collect_entries(&self, pages: &[SchedulePage]) -> ParsingResult<Vec<ScheduleEntry>> {
        info!("Target groups: {:?}", self.target_groups);

        let mut entries = Vec::new();
        for page in pages {
            let heading = first_line(&page.text);
            debug!("Page {} - first line: {:?}", page.number, heading);

            let Some(group) = self.match_group(heading) else {
                continue;
            };
            info!("📄 Page {} - processing group '{}'", page.number, group);

            match self.process_page(page, group) {
                Ok(mut page_entries) => entries.append(&mut page_entries),
                Err(err) if err.is_recoverable() => warn!("{err}"),
                Err(err) => return Err(err),
            }
        }

        info!("✅ Extraction complete - {} total entries", entries.len());
        Ok(entries)
    }

    fn process_page(&self, page: &SchedulePage, group: &str) -> ParsingResult<Vec<ScheduleEntry>> {
        if page.tables.is_empty() {
            return Err(ParsingError::no_tables_on_page(page.number));
        }

        let mut entries = Vec::new();
        for table in &page.tables {
            match self.grid.process_table(table, group, page.number) {
                Ok(mut found) => {
                    info!("  → {} entries", found.len());
                    entries.append(&mut found);
                }
                Err(err) if err.is_recoverable() => warn!("{err}"),
                Err(err) => return Err(err),
            }
        }
        Ok(entries)
    }
}

/// First line of the trimmed page text, itself trimmed.
fn first_line(text: &str) -> &str {
    text.trim().lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> PageMatcher {
        PageMatcher::new(vec![
            "Zarządzanie II gr1".to_string(),
            "Zarządzanie II gr2".to_string(),
        ])
        .expect("patterns compile")
    }

    fn page(number: usize, text: &str, tables: Vec<Vec<Vec<Option<String>>>>) -> SchedulePage {
        SchedulePage {
            number,
            text: text.to_string(),
            tables,
        }
    }

    /// Grid with headers and a single Monday physical-education class.
    fn monday_pe_table() -> Vec<Vec<Option<String>>> {
        vec![
            vec![Some("Społeczna Akademia Nauk w Warszawie".to_string())],
            (0..8).map(|_| None).collect(),
            vec![
                Some("pn".to_string()),
                Some("Skibińska, Małgorzata\nWychowanie fizyczne\n511,513".to_string()),
                None,
                None,
                None,
                None,
                None,
                None,
            ],
        ]
    }

    #[test]
    fn heading_containing_the_group_matches() {
        let m = matcher();
        assert_eq!(
            m.match_group("Plan zajęć - ZARZĄDZANIE II GR1 niestacjonarne"),
            Some("Zarządzanie II gr1")
        );
    }

    #[test]
    fn group_containing_the_heading_matches() {
        let m = matcher();
        assert_eq!(m.match_group("zarządzanie ii gr2"), Some("Zarządzanie II gr2"));
    }

    #[test]
    fn unrelated_heading_matches_nothing() {
        let m = matcher();
        assert_eq!(m.match_group("Informatyka I gr3"), None);
    }

    #[test]
    fn blank_heading_matches_the_first_target() {
        // An empty string is contained in every target; first one wins.
        let m = matcher();
        assert_eq!(m.match_group("   "), Some("Zarządzanie II gr1"));
    }

    #[test]
    fn entries_carry_the_configured_group_name() {
        let m = matcher();
        let pages = vec![page(
            1,
            "PLAN ZAJĘĆ ZARZĄDZANIE II GR1\nsemestr letni",
            vec![monday_pe_table()],
        )];
        let entries = m.collect_entries(&pages).unwrap();
        assert_eq!(entries.len(), 1);
        // The stored name is the configured target, not the page heading.
        assert_eq!(entries[0].group_name, "Zarządzanie II gr1");
        assert_eq!(entries[0].subject, "Wychowanie fizyczne");
        assert_eq!(entries[0].instructor, "Skibińska, Małgorzata");
        assert_eq!(entries[0].room, "511,513");
        assert_eq!(entries[0].day, "Poniedziałek");
    }

    #[test]
    fn pages_for_other_groups_are_skipped() {
        let m = matcher();
        let pages = vec![page(1, "Informatyka I gr3", vec![monday_pe_table()])];
        let entries = m.collect_entries(&pages).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn page_without_tables_does_not_abort_the_document() {
        let m = matcher();
        let pages = vec![
            page(1, "Zarządzanie II gr1", vec![]),
            page(2, "Zarządzanie II gr2", vec![monday_pe_table()]),
        ];
        let entries = m.collect_entries(&pages).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].group_name, "Zarządzanie II gr2");
    }

    #[test]
    fn short_table_is_skipped_but_siblings_survive() {
        let m = matcher();
        let short: Vec<Vec<Option<String>>> = vec![vec![Some("stub".to_string())]];
        let pages = vec![page(1, "Zarządzanie II gr1", vec![short, monday_pe_table()])];
        let entries = m.collect_entries(&pages).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn empty_document_yields_no_entries() {
        let m = matcher();
        let entries = m.collect_entries(&[]).unwrap();
        assert!(entries.is_empty());
    }
}
