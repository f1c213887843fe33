//! Schedule entities and the change-detection fingerprint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured fields extracted from a single timetable cell.
///
/// Produced by the cell parser before any day/time context is attached.
/// A cell that yields no subject produces no `ParsedCell` at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCell {
    pub subject: String,
    pub class_type: String,
    pub class_mode: String,
    pub instructor: String,
    /// Comma-joined room identifiers, deduplicated, order of appearance.
    pub room: String,
    /// Date tokens from the first date-bearing parenthetical, e.g. "4.03".
    pub dates: Vec<String>,
}

/// One concrete scheduled class occurrence for one group.
///
/// Ephemeral transfer object between the grid processor and the repository;
/// produced fresh on every parse run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub group_name: String,
    pub subject: String,
    pub class_type: String,
    pub class_mode: String,
    pub instructor: String,
    pub room: String,
    /// Full Polish weekday name, e.g. "Poniedziałek".
    pub day: String,
    /// Wall-clock `HH:MM` start of the first occupied slot.
    pub time_start: String,
    /// Wall-clock `HH:MM` end of the last occupied slot (spans extend this).
    pub time_end: String,
    pub dates: Vec<String>,
}

impl ScheduleEntry {
    /// Attach grid context to a parsed cell.
    pub fn from_cell(
        cell: ParsedCell,
        group_name: &str,
        day: &str,
        time_start: &str,
        time_end: &str,
    ) -> Self {
        Self {
            group_name: group_name.to_string(),
            subject: cell.subject,
            class_type: cell.class_type,
            class_mode: cell.class_mode,
            instructor: cell.instructor,
            room: cell.room,
            day: day.to_string(),
            time_start: time_start.to_string(),
            time_end: time_end.to_string(),
            dates: cell.dates,
        }
    }

    pub fn fingerprint(&self) -> EntryFingerprint {
        EntryFingerprint {
            group_name: self.group_name.clone(),
            subject: self.subject.clone(),
            day: self.day.clone(),
            time_start: self.time_start.clone(),
            time_end: self.time_end.clone(),
            class_mode: self.class_mode.clone(),
            room: self.room.clone(),
        }
    }
}

/// A schedule row as persisted, including change bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub id: i64,
    pub group_name: String,
    pub subject: String,
    pub class_type: String,
    pub class_mode: String,
    pub instructor: String,
    pub room: String,
    pub day: String,
    pub time_start: String,
    pub time_end: String,
    pub dates: Vec<String>,
    /// Set when this row's fingerprint was absent from the previous run.
    pub is_changed: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn fingerprint(&self) -> EntryFingerprint {
        EntryFingerprint {
            group_name: self.group_name.clone(),
            subject: self.subject.clone(),
            day: self.day.clone(),
            time_start: self.time_start.clone(),
            time_end: self.time_end.clone(),
            class_mode: self.class_mode.clone(),
            room: self.room.clone(),
        }
    }
}

/// Identity tuple used to decide whether a logical class changed between runs.
///
/// Deliberately excludes `instructor`, `class_type` and `dates`: the source
/// document shuffles those more often than the class itself moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryFingerprint {
    pub group_name: String,
    pub subject: String,
    pub day: String,
    pub time_start: String,
    pub time_end: String,
    pub class_mode: String,
    pub room: String,
}
