//! Domain module - Core business logic and entities
//!
//! This module contains the schedule entities, the fingerprint value object
//! and the immutable lookup tables that define the timetable grammar.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod constants;
pub mod schedule;

// Re-export commonly used items for convenience
pub use schedule::{EntryFingerprint, ParsedCell, ScheduleEntry, StoredEntry};
