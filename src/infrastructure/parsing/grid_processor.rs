//! Day × time-slot grid walker.
//!
//! Every schedule page carries one table with a fixed layout: row 0 is the
//! institution banner, row 1 holds the slot-time headers, and each following
//! row pairs a day abbreviation in column 0 with up to seven class cells.
//! A day's classes may continue on extra rows whose day column is blank, and
//! a class occupying several consecutive slots repeats its cell text across
//! those columns. This module flattens all of that into [`ScheduleEntry`]
//! rows with concrete start and end times.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::constants::{capitalize, DAY_NAMES, SLOT_TIMES};
use crate::domain::ScheduleEntry;

use super::cell_parser::CellParser;
use super::error::{ParsingError, ParsingResult};

/// Data columns per grid row, one per teaching slot.
const SLOT_COLUMNS: usize = 7;

/// Turns one extracted table grid into schedule entries for a single group.
pub struct GridProcessor {
    cell_parser: CellParser,
}

impl GridProcessor {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            cell_parser: CellParser::new()?,
        })
    }

    /// Walk `table` and return every class found for `group_name`.
    ///
    /// Tables with fewer than three rows cannot contain data below the two
    /// header rows and are rejected with a recoverable
    /// [`ParsingError::MalformedTable`].
    pub fn process_table(
        &self,
        table: &[Vec<Option<String>>],
        group_name: &str,
        page_number: usize,
    ) -> ParsingResult<Vec<ScheduleEntry>> {
        if table.len() < 3 {
            return Err(ParsingError::malformed_table(page_number, table.len()));
        }

        let mut entries = Vec::new();
        let mut current_day = String::new();
        // Rowspan tracker: slot column → last non-blank cell text seen there.
        let mut last_cell_per_col: HashMap<usize, String> = HashMap::new();

        for row in table.iter().skip(2) {
            let day_abbr = row
                .first()
                .and_then(|cell| cell.as_deref())
                .unwrap_or("")
                .trim()
                .to_lowercase();
            if !day_abbr.is_empty() {
                current_day = DAY_NAMES
                    .get(day_abbr.as_str())
                    .map(|full| (*full).to_string())
                    .unwrap_or_else(|| capitalize(&day_abbr));
                last_cell_per_col.clear();
            }
            if current_day.is_empty() {
                // Stray rows above the first day label carry no slot context.
                continue;
            }

            for col in 1..=SLOT_COLUMNS {
                let raw = match row.get(col) {
                    Some(cell) => cell.as_deref().unwrap_or("").trim().to_string(),
                    None => break,
                };

                if raw.is_empty() {
                    last_cell_per_col.remove(&col);
                    continue;
                }

                // Same text as the row above in this column: the class was
                // already emitted when its first row was walked.
                if last_cell_per_col.get(&col) == Some(&raw) {
                    continue;
                }
                last_cell_per_col.insert(col, raw.clone());

                let Some(cell) = self.cell_parser.parse_cell(&raw) else {
                    continue;
                };

                let (time_start, mut time_end) = SLOT_TIMES[col - 1];

                // Identical text in the following column(s) means one class
                // spanning several slots; stretch the end time and mark those
                // columns as consumed.
                let mut next = col + 1;
                while next <= SLOT_COLUMNS {
                    let continues = row
                        .get(next)
                        .map(|c| c.as_deref().unwrap_or("").trim() == raw)
                        .unwrap_or(false);
                    if !continues {
                        break;
                    }
                    time_end = SLOT_TIMES[next - 1].1;
                    last_cell_per_col.insert(next, raw.clone());
                    next += 1;
                }

                let entry =
                    ScheduleEntry::from_cell(cell, group_name, &current_day, time_start, time_end);
                debug!(
                    "  {} | {} | {} | {}-{} | type={} mode={} room={} dates={}",
                    entry.group_name,
                    entry.subject,
                    entry.day,
                    entry.time_start,
                    entry.time_end,
                    entry.class_type,
                    entry.class_mode,
                    entry.room,
                    entry.dates.len()
                );
                entries.push(entry);
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridProcessor {
        GridProcessor::new().expect("patterns compile")
    }

    /// Build a table with the standard two header rows on top.
    fn with_headers(data_rows: Vec<Vec<&str>>) -> Vec<Vec<Option<String>>> {
        let mut rows: Vec<Vec<Option<String>>> = vec![
            vec![Some("Społeczna Akademia Nauk w Warszawie".to_string())],
            (0..8).map(|_| None).collect(),
        ];
        for row in data_rows {
            rows.push(
                row.into_iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            None
                        } else {
                            Some(cell.to_string())
                        }
                    })
                    .collect(),
            );
        }
        rows
    }

    const PE_CELL: &str = "Wychowanie fizyczne 511";

    #[test]
    fn short_table_is_rejected_as_recoverable() {
        let table = with_headers(vec![]);
        let err = grid()
            .process_table(&table[..2], "Zarządzanie II gr1", 1)
            .unwrap_err();
        assert!(matches!(err, ParsingError::MalformedTable { page: 1, rows: 2 }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn day_abbreviation_resolves_to_full_polish_name() {
        let table = with_headers(vec![vec!["pn", PE_CELL, "", "", "", "", "", ""]]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].day, "Poniedziałek");
        assert_eq!(entries[0].time_start, "08:00");
        assert_eq!(entries[0].time_end, "09:30");
        assert_eq!(entries[0].subject, "Wychowanie fizyczne");
        assert_eq!(entries[0].room, "511");
    }

    #[test]
    fn unknown_day_label_is_capitalized_verbatim() {
        let table = with_headers(vec![vec!["sroda", PE_CELL, "", "", "", "", "", ""]]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        assert_eq!(entries[0].day, "Sroda");
    }

    #[test]
    fn rows_above_the_first_day_label_are_skipped() {
        let table = with_headers(vec![
            vec!["", PE_CELL, "", "", "", "", "", ""],
            vec!["wt", PE_CELL, "", "", "", "", "", ""],
        ]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].day, "Wtorek");
    }

    #[test]
    fn identical_adjacent_columns_collapse_into_one_span() {
        let cell = "Kowalski, Jan\nMatematyka cw_kontakcie (4.03,11.03)\n512";
        let table = with_headers(vec![vec!["pn", "", "", cell, cell, "", "", ""]]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].time_start, "11:30");
        assert_eq!(entries[0].time_end, "14:45");
        assert_eq!(entries[0].subject, "Matematyka");
    }

    #[test]
    fn continuation_row_with_blank_day_does_not_duplicate() {
        let table = with_headers(vec![
            vec!["pn", PE_CELL, "", "", "", "", "", ""],
            vec!["", PE_CELL, "", "", "", "", "", ""],
        ]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn blank_cell_clears_the_column_memory() {
        let table = with_headers(vec![
            vec!["pn", PE_CELL, "", "", "", "", "", ""],
            vec!["", "", "", "", "", "", "", ""],
            vec!["", PE_CELL, "", "", "", "", "", ""],
        ]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        // The gap means the later cell is a genuinely new class occurrence.
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn new_day_label_clears_the_column_memory() {
        let table = with_headers(vec![
            vec!["pn", PE_CELL, "", "", "", "", "", ""],
            vec!["wt", PE_CELL, "", "", "", "", "", ""],
        ]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].day, "Poniedziałek");
        assert_eq!(entries[1].day, "Wtorek");
    }

    #[test]
    fn truncated_row_keeps_entries_from_present_columns() {
        // Only the day column plus two slots; the walk stops at the edge.
        let table = with_headers(vec![vec!["pn", PE_CELL, "Lektorat 513"]]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].time_start, "09:45");
        assert_eq!(entries[1].time_end, "11:15");
    }

    #[test]
    fn unparseable_cell_is_skipped() {
        // Type and dates but no subject text; the cell parser yields nothing.
        let table = with_headers(vec![vec!["pn", "cw_kontakcie (4.03)", PE_CELL, "", "", "", "", ""]]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].time_start, "09:45");
    }

    #[test]
    fn full_week_produces_independent_entries() {
        let table = with_headers(vec![
            vec!["pn", PE_CELL, "", "", "", "", "", ""],
            vec!["śr", "", "Lektorat 513", "", "", "", "", ""],
            vec!["sob", "", "", "", "", "", "", "Seminarium dyplomowe sem_teams"],
        ]);
        let entries = grid()
            .process_table(&table, "Zarządzanie II gr1", 1)
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].day, "Środa");
        assert_eq!(entries[2].day, "Sobota");
        assert_eq!(entries[2].time_start, "18:30");
        assert_eq!(entries[2].time_end, "20:00");
        assert_eq!(entries[2].class_type, "Seminarium");
        assert_eq!(entries[2].class_mode, "Teams");
    }
}
