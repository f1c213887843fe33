//! Infrastructure layer for HTTP, PDF reading, parsing, persistence and output
//!
//! This module provides the HTTP client, PDF link discovery and download,
//! content-change detection, the PDF document reader, the timetable parsing
//! subsystem, the SQLite repository and the static HTML renderer.

pub mod config; // Configuration structs and JSON loading
pub mod logging; // Logging infrastructure
pub mod http_client;
pub mod pdf_locator; // Source-page scan for the schedule PDF link
pub mod pdf_downloader;
pub mod change_detector; // Content-hash change detection
pub mod document; // PDF text/table extraction
pub mod parsing; // Timetable parsing (cell grammar, grid walk, page matching)
pub mod repository;
pub mod html_renderer;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager};
pub use http_client::{HttpClient, HttpClientConfig};
pub use change_detector::ChangeDetector;
pub use document::{ScheduleDocument, SchedulePage};
pub use parsing::{CellParser, GridProcessor, PageMatcher, ParsingError, ParsingResult};
pub use repository::ScheduleRepository;
pub use logging::init_logging;
