//! Cell parser for the day/slot timetable grammar
//!
//! Turns the dense multi-line text of one table cell into a structured
//! record. The grammar is consumed sequentially: every step works on an
//! immutable snapshot plus a reduced working buffer, so the extraction
//! order (dates, type+mode, instructor, rooms, initials) stays explicit
//! and each step is testable on its own.

use regex::Regex;
use tracing::trace;

use super::{ParsingError, ParsingResult};
use crate::domain::constants::{
    capitalize, MAX_ROOMS_PER_CELL, MODE_KEYWORDS, MODE_LOOKAHEAD_CHARS, ROOM_RANGE, TYPE_LABELS,
};
use crate::domain::schedule::ParsedCell;

/// Class-type token including the optional campus tag: `ćw_` `war_` `w(Ł+W)_` `w_`
const TYPE_PATTERN: &str = r"(?i)\b(ćw|cw|war|lab|wyk|kw|sem|proj|lek|w)(?:\([^)]*\))?_";

/// Date tokens: "4.03", "11.03", "26.05", "4.03.2026"
const DATE_PATTERN: &str = r"\b\d{1,2}\.\d{2}(?:\.\d{2,4})?\b";

/// Any parenthesized group (date lists, campus tags, misc annotations)
const PAREN_PATTERN: &str = r"\([^)]+\)";

/// Instructor: "Lastname[-Hyphen], Firstname [Initial.]"
/// Handles: Skibińska, Małgorzata | Wierniuk-Osińska, Kamila | Perlińska, M.
const INSTRUCTOR_PATTERN: &str = r"[A-ZŁŚŻŹĆŃÓĄĘ][a-złśżźćńóąę]+(?:-[A-ZŁŚŻŹĆŃÓĄĘ][a-złśżźćńóąę]+)?,\s*[A-ZŁŚŻŹĆŃÓĄĘ][a-złśżźćńóąę]*\.?";

/// Slash-separated uppercase initials block: "ME / ŚJ / DK / KS"
const INITIALS_PATTERN: &str = r"(?:[A-ZŁŚŻŹĆŃÓĄĘ]{1,3}\s*/\s*){1,}[A-ZŁŚŻŹĆŃÓĄĘ]{1,3}";

/// Bare 3-4 digit tokens, candidates for room numbers
const ROOM_PATTERN: &str = r"\b\d{3,4}\b";

/// Characters trimmed off the final subject text
const EDGE_TRIM: &[char] = &[' ', ',', '/', '-', '.', '·', '•'];

/// Parser for one timetable cell's text
pub struct CellParser {
    type_pattern: Regex,
    date_pattern: Regex,
    paren_pattern: Regex,
    instructor_pattern: Regex,
    initials_pattern: Regex,
    room_pattern: Regex,
    whitespace_pattern: Regex,
    /// (keyword, canonical label, case-insensitive matcher) in priority order
    mode_patterns: Vec<(&'static str, &'static str, Regex)>,
}

impl CellParser {
    /// Compile the cell grammar
    pub fn new() -> ParsingResult<Self> {
        let mut mode_patterns = Vec::with_capacity(MODE_KEYWORDS.len());
        for (keyword, label) in MODE_KEYWORDS {
            let pattern = format!("(?i){}", regex::escape(keyword));
            mode_patterns.push((keyword, label, Self::compile(&pattern)?));
        }

        Ok(Self {
            type_pattern: Self::compile(TYPE_PATTERN)?,
            date_pattern: Self::compile(DATE_PATTERN)?,
            paren_pattern: Self::compile(PAREN_PATTERN)?,
            instructor_pattern: Self::compile(INSTRUCTOR_PATTERN)?,
            initials_pattern: Self::compile(INITIALS_PATTERN)?,
            room_pattern: Self::compile(ROOM_PATTERN)?,
            whitespace_pattern: Self::compile(r"\s+")?,
            mode_patterns,
        })
    }

    fn compile(pattern: &str) -> ParsingResult<Regex> {
        Regex::new(pattern).map_err(|e| ParsingError::invalid_pattern(pattern, e))
    }

    /// Parse one cell's raw text.
    ///
    /// Returns `None` for blank cells and for cells that leave no subject
    /// text once dates, type, mode, instructor and rooms are consumed.
    pub fn parse_cell(&self, cell_text: &str) -> Option<ParsedCell> {
        let raw = cell_text.trim();
        if raw.is_empty() {
            return None;
        }

        let flat = Self::flatten(raw);

        let (dates, work) = self.extract_dates(&flat);
        let (class_type, class_mode, work) = self.extract_type_and_mode(&work);
        let work = self.squash(&work);
        let (instructor, work) = self.extract_instructor(&flat, &work);
        let (room, work) = self.extract_rooms(&work);
        let subject = self.finish_subject(&work);

        if subject.is_empty() {
            trace!("cell reduced to nothing, dropping: {:?}", flat);
            return None;
        }

        Some(ParsedCell {
            subject,
            class_type,
            class_mode,
            instructor,
            room,
            dates,
        })
    }

    /// Join non-blank trimmed lines with single spaces.
    fn flatten(raw: &str) -> String {
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Pick the date list from the FIRST parenthesized group that carries
    /// date tokens, then strip every parenthesized group from the buffer.
    ///
    /// First-match-wins is deliberate: campus tags like "(Ł+W)" precede the
    /// real date group and contain no dates.
    fn extract_dates(&self, flat: &str) -> (Vec<String>, String) {
        let mut dates = Vec::new();
        for group in self.paren_pattern.find_iter(flat) {
            let found: Vec<String> = self
                .date_pattern
                .find_iter(group.as_str())
                .map(|m| m.as_str().to_string())
                .collect();
            if !found.is_empty() {
                dates = found;
                break;
            }
        }

        let work = self.paren_pattern.replace_all(flat, "").trim().to_string();
        (dates, work)
    }

    /// Resolve the type token and the delivery-mode keyword following it.
    ///
    /// The buffer comes back with the consumed span removed: text before the
    /// type token re-joined with whatever followed the mode keyword.
    fn extract_type_and_mode(&self, work: &str) -> (String, String, String) {
        let Some(caps) = self.type_pattern.captures(work) else {
            return (String::new(), String::new(), work.to_string());
        };
        let (Some(token), Some(abbrev)) = (caps.get(0), caps.get(1)) else {
            return (String::new(), String::new(), work.to_string());
        };

        let abbrev = abbrev.as_str().to_lowercase();
        let class_type = TYPE_LABELS
            .get(abbrev.as_str())
            .map(|label| (*label).to_string())
            .unwrap_or_else(|| capitalize(&abbrev));

        let mut class_mode = String::new();
        let mut after_token = work[token.end()..].trim_start().to_string();

        if let Some((label, consumed)) = Self::mode_prefix(&after_token) {
            class_mode = label.to_string();
            after_token = after_token[consumed..]
                .trim_start_matches([',', '.', ' '])
                .to_string();
        } else {
            // The keyword sometimes sits a word further in ("w_ teams"); scan a
            // short lowercased window and excise the first occurrence.
            let window: String = after_token
                .to_lowercase()
                .chars()
                .take(MODE_LOOKAHEAD_CHARS)
                .collect();
            for (keyword, label, matcher) in &self.mode_patterns {
                if window.contains(keyword) {
                    class_mode = (*label).to_string();
                    after_token = matcher.replacen(&after_token, 1, "").trim().to_string();
                    break;
                }
            }
        }

        let rebuilt = format!("{} {}", &work[..token.start()], after_token)
            .trim()
            .to_string();
        (class_type, class_mode, rebuilt)
    }

    /// Case-insensitive prefix match against the ordered mode keywords.
    /// Returns the canonical label and the byte length of the matched prefix.
    fn mode_prefix(after_token: &str) -> Option<(&'static str, usize)> {
        for (keyword, label) in MODE_KEYWORDS {
            if let Some(consumed) = ci_prefix_len(after_token, keyword) {
                return Some((label, consumed));
            }
        }
        None
    }

    /// Search the original flattened text for an instructor name and remove
    /// its first literal occurrence from the working buffer.
    fn extract_instructor(&self, flat: &str, work: &str) -> (String, String) {
        let instructor = self
            .instructor_pattern
            .find(flat)
            .map(|m| m.as_str().trim_matches([' ', ',', '.'].as_slice()).to_string())
            .unwrap_or_default();

        if instructor.is_empty() {
            return (instructor, work.to_string());
        }

        let reduced = work
            .replacen(instructor.as_str(), "", 1)
            .trim_matches([' ', ','].as_slice())
            .to_string();
        (instructor, reduced)
    }

    /// Collect up to the first four in-range 3-4 digit tokens as rooms and
    /// excise every occurrence of the consumed values, word-boundary-safe.
    fn extract_rooms(&self, work: &str) -> (String, String) {
        let matches: Vec<(std::ops::Range<usize>, &str)> = self
            .room_pattern
            .find_iter(work)
            .filter(|m| {
                m.as_str()
                    .parse::<u32>()
                    .map(|v| ROOM_RANGE.contains(&v))
                    .unwrap_or(false)
            })
            .map(|m| (m.range(), m.as_str()))
            .collect();

        if matches.is_empty() {
            return (String::new(), work.to_string());
        }

        let consumed: Vec<&str> = matches
            .iter()
            .take(MAX_ROOMS_PER_CELL)
            .map(|(_, token)| *token)
            .collect();

        // Deduplicate preserving order of appearance
        let mut rooms: Vec<&str> = Vec::new();
        for token in &consumed {
            if !rooms.contains(token) {
                rooms.push(token);
            }
        }

        let mut reduced = String::with_capacity(work.len());
        let mut cursor = 0;
        for (range, token) in &matches {
            if consumed.contains(token) {
                reduced.push_str(&work[cursor..range.start]);
                cursor = range.end;
            }
        }
        reduced.push_str(&work[cursor..]);

        (rooms.join(","), reduced)
    }

    /// Strip initials shorthand, squash whitespace, trim stray separators.
    fn finish_subject(&self, work: &str) -> String {
        let cleaned = self.initials_pattern.replace_all(work, "");
        self.whitespace_pattern
            .replace_all(&cleaned, " ")
            .trim_matches(EDGE_TRIM)
            .to_string()
    }

    fn squash(&self, text: &str) -> String {
        self.whitespace_pattern
            .replace_all(text, " ")
            .trim()
            .to_string()
    }
}

/// Byte length of `needle` matched case-insensitively at the start of
/// `haystack`, or `None` when it is not a prefix.
fn ci_prefix_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut consumed = 0usize;
    let mut chars = haystack.char_indices();
    for expected in needle.chars() {
        let (index, actual) = chars.next()?;
        if !actual.to_lowercase().eq(std::iter::once(expected)) {
            return None;
        }
        consumed = index + actual.len_utf8();
    }
    Some(consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parser() -> CellParser {
        CellParser::new().expect("cell grammar compiles")
    }

    #[test]
    fn format_a_classroom_cell() {
        let cell = "Kowalski, Jan\nMatematyka\ncw_kontakcie (4.03,11.03)\n512";
        let parsed = parser().parse_cell(cell).expect("parseable");

        assert_eq!(parsed.subject, "Matematyka");
        assert_eq!(parsed.class_type, "Ćwiczenia");
        assert_eq!(parsed.class_mode, "w kontakcie");
        assert_eq!(parsed.instructor, "Kowalski, Jan");
        assert_eq!(parsed.room, "512");
        assert_eq!(parsed.dates, vec!["4.03", "11.03"]);
    }

    #[test]
    fn format_b_remote_cell_skips_campus_tag() {
        let cell = "Nowak, Anna\nZarządzanie strategiczne\nw(Ł+W)_teams (5.03,12.03,19.03)";
        let parsed = parser().parse_cell(cell).expect("parseable");

        assert_eq!(parsed.subject, "Zarządzanie strategiczne");
        assert_eq!(parsed.class_type, "Wykład");
        assert_eq!(parsed.class_mode, "Teams");
        assert_eq!(parsed.room, "");
        assert_eq!(parsed.dates, vec!["5.03", "12.03", "19.03"]);
        assert!(!parsed.subject.contains("Ł+W"));
    }

    #[test]
    fn format_c_rooms_only_cell() {
        let cell = "Skibińska, Małgorzata\nWychowanie fizyczne\n511,513";
        let parsed = parser().parse_cell(cell).expect("parseable");

        assert_eq!(parsed.subject, "Wychowanie fizyczne");
        assert_eq!(parsed.class_type, "");
        assert_eq!(parsed.class_mode, "");
        assert_eq!(parsed.room, "511,513");
        assert!(parsed.dates.is_empty());
    }

    #[test]
    fn parse_is_idempotent() {
        let cell = "Wierniuk-Osińska, Kamila\nRachunkowość ćw_w\nkontakcie (7.03,14.03)\n610";
        let p = parser();
        let first = p.parse_cell(cell).expect("parseable");
        let second = p.parse_cell(cell).expect("parseable");
        assert_eq!(first, second);
    }

    #[test]
    fn split_mode_keyword_across_lines() {
        // "ćw_w" ends one line, "kontakcie" starts the next
        let cell = "Wierniuk-Osińska, Kamila\nRachunkowość ćw_w\nkontakcie (7.03)\n610";
        let parsed = parser().parse_cell(cell).expect("parseable");

        assert_eq!(parsed.subject, "Rachunkowość");
        assert_eq!(parsed.class_type, "Ćwiczenia");
        assert_eq!(parsed.class_mode, "w kontakcie");
        assert_eq!(parsed.instructor, "Wierniuk-Osińska, Kamila");
        assert_eq!(parsed.room, "610");
    }

    #[test]
    fn first_date_bearing_parenthetical_wins() {
        let cell = "Przedmiot w(Ł+W)_teams (1.03,8.03)";
        let parsed = parser().parse_cell(cell).expect("parseable");
        assert_eq!(parsed.dates, vec!["1.03", "8.03"]);

        // Annotation after the date group must not override it
        let cell = "Przedmiot w_teams (1.03) (sala zapasowa)";
        let parsed = parser().parse_cell(cell).expect("parseable");
        assert_eq!(parsed.dates, vec!["1.03"]);
    }

    #[test]
    fn date_tokens_may_carry_years() {
        let cell = "Prawo handlowe wyk_zdalnie (4.03.2026,11.03.26)";
        let parsed = parser().parse_cell(cell).expect("parseable");
        assert_eq!(parsed.dates, vec!["4.03.2026", "11.03.26"]);
        assert_eq!(parsed.class_type, "Wykład");
        assert_eq!(parsed.class_mode, "Zdalnie");
    }

    #[rstest]
    #[case("teams", "Teams")]
    #[case("TEAMS", "Teams")]
    #[case("zdalnie", "Zdalnie")]
    #[case("hybrydowo", "Hybrydowo")]
    #[case("online", "Online")]
    #[case("kontakcie", "w kontakcie")]
    #[case("w kontakcie", "w kontakcie")]
    fn mode_keyword_resolves(#[case] keyword: &str, #[case] label: &str) {
        let cell = format!("Ekonomia w_{keyword} (2.04)");
        let parsed = parser().parse_cell(&cell).expect("parseable");
        assert_eq!(parsed.class_mode, label);
        assert_eq!(parsed.subject, "Ekonomia");
    }

    #[test]
    fn mode_keyword_after_stray_space() {
        // The leading trim consumes the space, leaving a clean prefix match
        let cell = "Ekonomia w_ teams (2.04)";
        let parsed = parser().parse_cell(cell).expect("parseable");
        assert_eq!(parsed.class_mode, "Teams");
        assert_eq!(parsed.subject, "Ekonomia");
    }

    #[test]
    fn mode_keyword_found_through_lookahead_window() {
        // Junk between the underscore and the keyword defeats the prefix
        // match; the window scan still finds and excises it
        let cell = "Ekonomia w_- teams (2.04)";
        let parsed = parser().parse_cell(cell).expect("parseable");
        assert_eq!(parsed.class_mode, "Teams");
        assert_eq!(parsed.subject, "Ekonomia");
    }

    #[test]
    fn unrecognized_token_is_not_a_type() {
        let cell = "Przedmiot specjalny xyz_kontakcie 512";
        let parsed = parser().parse_cell(cell).expect("parseable");
        // "xyz" is outside the type alphabet, so neither type nor mode fire
        assert_eq!(parsed.class_type, "");
        assert_eq!(parsed.class_mode, "");
        assert_eq!(parsed.room, "512");
        assert_eq!(parsed.subject, "Przedmiot specjalny xyz_kontakcie");
    }

    #[test]
    fn instructor_with_initial() {
        let cell = "Perlińska, M.\nStatystyka w_kontakcie (3.03)\n815";
        let parsed = parser().parse_cell(cell).expect("parseable");
        assert_eq!(parsed.instructor, "Perlińska, M");
        assert_eq!(parsed.subject, "Statystyka");
    }

    #[test]
    fn initials_block_is_removed() {
        let cell = "Lektorat języka angielskiego\nME / ŚJ / DK / KS\n511,513,515,520";
        let parsed = parser().parse_cell(cell).expect("parseable");
        assert_eq!(parsed.subject, "Lektorat języka angielskiego");
        assert_eq!(parsed.room, "511,513,515,520");
    }

    #[test]
    fn rooms_cap_at_first_four_tokens() {
        let cell = "Lektorat 511 511 513 515 520";
        let parsed = parser().parse_cell(cell).expect("parseable");
        // First four tokens are 511,511,513,515; 520 is past the cap and so
        // survives into the subject
        assert_eq!(parsed.room, "511,513,515");
        assert_eq!(parsed.subject, "Lektorat 520");
    }

    #[test]
    fn out_of_range_numbers_are_not_rooms() {
        let cell = "Historia gospodarcza 1500\nSala 99";
        let parsed = parser().parse_cell(cell).expect("parseable");
        assert_eq!(parsed.room, "");
        assert_eq!(parsed.subject, "Historia gospodarcza 1500 Sala 99");
    }

    #[test]
    fn blank_cell_yields_nothing() {
        assert!(parser().parse_cell("").is_none());
        assert!(parser().parse_cell("   \n  \n ").is_none());
    }

    #[test]
    fn cell_without_subject_yields_nothing() {
        assert!(parser().parse_cell("cw_kontakcie (4.03)").is_none());
    }

    #[test]
    fn step_extract_dates_strips_all_parentheticals() {
        let p = parser();
        let (dates, work) = p.extract_dates("Temat (Ł+W) środkowy (4.03) koniec");
        assert_eq!(dates, vec!["4.03"]);
        assert_eq!(work, "Temat  środkowy  koniec");
    }

    #[test]
    fn step_extract_rooms_is_word_boundary_safe() {
        let p = parser();
        let (room, work) = p.extract_rooms("Przedmiot A512B 512");
        assert_eq!(room, "512");
        // The digits embedded in "A512B" are untouched
        assert_eq!(work, "Przedmiot A512B ");
    }
}
