//! Immutable lookup tables defining the timetable grammar.
//!
//! Every table the parser consults lives here so the grammar stays auditable
//! in one place: slot times, day abbreviations, class-type abbreviations and
//! the ordered delivery-mode keywords.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Fixed (start, end) wall-clock times for the 7 daily slots.
/// Index 0 corresponds to table column 1 (slot 1).
pub const SLOT_TIMES: [(&str, &str); 7] = [
    ("08:00", "09:30"),
    ("09:45", "11:15"),
    ("11:30", "13:00"),
    ("13:15", "14:45"),
    ("15:00", "16:30"),
    ("16:45", "18:15"),
    ("18:30", "20:00"),
];

/// Canonical weekday rendering order for output.
pub const DAY_ORDER: [&str; 7] = [
    "Poniedziałek",
    "Wtorek",
    "Środa",
    "Czwartek",
    "Piątek",
    "Sobota",
    "Niedziela",
];

/// Day abbreviation (as printed in column 0 of the grid) to full Polish name.
pub static DAY_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("pn", "Poniedziałek"),
        ("wt", "Wtorek"),
        ("śr", "Środa"),
        ("czw", "Czwartek"),
        ("pt", "Piątek"),
        ("pi", "Piątek"),
        ("sob", "Sobota"),
        ("sb", "Sobota"),
        ("nd", "Niedziela"),
        ("ndz", "Niedziela"),
    ])
});

/// Class-type abbreviation (the token before `_` in a cell) to canonical label.
pub static TYPE_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("w", "Wykład"),
        ("wyk", "Wykład"),
        ("war", "Warsztaty"),
        ("cw", "Ćwiczenia"),
        ("ćw", "Ćwiczenia"),
        ("lab", "Laboratorium"),
        ("kw", "Konwersatorium"),
        ("sem", "Seminarium"),
        ("proj", "Projekt"),
        ("lek", "Lektorat"),
    ])
});

/// Delivery-mode keywords in match priority order. The "kontakcie" variants
/// come first; order is load-bearing for the prefix scan in the cell parser.
pub const MODE_KEYWORDS: [(&str, &str); 6] = [
    ("kontakcie", "w kontakcie"),
    ("w kontakcie", "w kontakcie"),
    ("teams", "Teams"),
    ("zdalnie", "Zdalnie"),
    ("hybrydowo", "Hybrydowo"),
    ("online", "Online"),
];

/// Inclusive range of integers accepted as room numbers.
pub const ROOM_RANGE: std::ops::RangeInclusive<u32> = 100..=1200;

/// Maximum number of rooms a single cell may contribute.
pub const MAX_ROOMS_PER_CELL: usize = 4;

/// Window (in characters) scanned after a type token for a stray mode keyword.
pub const MODE_LOOKAHEAD_CHARS: usize = 20;

/// Title-case a token the way unmapped abbreviations are normalized:
/// first character uppercased, the rest lowered.
pub fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str()
        }
        None => String::new(),
    }
}
