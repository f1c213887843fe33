//! Timetable parsing infrastructure.
//!
//! Three cooperating stages turn a loaded PDF into schedule entries: the
//! page matcher picks pages belonging to configured groups, the grid
//! processor walks each day × time-slot table, and the cell parser breaks a
//! single cell's text into structured fields.

pub mod cell_parser;
pub mod error;
pub mod grid_processor;
pub mod page_matcher;

// Re-export public types
pub use cell_parser::CellParser;
pub use error::{ParsingError, ParsingResult};
pub use grid_processor::GridProcessor;
pub use page_matcher::PageMatcher;
