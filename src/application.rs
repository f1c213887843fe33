//! Application layer module
//!
//! Orchestrates one full update cycle: fetch, change detection, parsing,
//! persistence and page generation.

pub mod update_runner;
