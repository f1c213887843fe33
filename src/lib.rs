//! SAN Plan - university timetable scraper and publisher
//!
//! Fetches the faculty schedule PDF from the SAN Warszawa site, detects
//! content changes, parses the day/slot tables into structured entries,
//! stores them in SQLite and renders a static HTML plan.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;

// Re-export the top-level entry point for the binary
pub use application::update_runner::{UpdateOutcome, UpdateRunner};
pub use infrastructure::config::AppConfig;
