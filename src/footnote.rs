//! Footnote marker scanning and duplicate detection.
//!
//! Three notations are recognized independently: bracketed `[12]`,
//! parenthesized `(12)` / `（12）`, and superscript digit runs `¹²`.
//! A number is a duplicate only when it recurs within the same notation.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{QaError, Result};
use crate::finding::{Category, Finding, Locator};
use crate::normalize::NormalizedText;

lazy_static! {
    static ref BRACKETED: Regex = Regex::new(r"\[([0-9０-９]{1,3})\]").unwrap();
    static ref PARENTHESIZED: Regex =
        Regex::new(r"\(([0-9０-９]{1,3})\)|（([0-9０-９]{1,3})）").unwrap();
    static ref SUPERSCRIPT: Regex = Regex::new(r"[⁰¹²³⁴⁵⁶⁷⁸⁹]+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Notation {
    Bracketed,
    Parenthesized,
    Superscript,
}

impl Notation {
    pub const ALL: [Notation; 3] = [
        Notation::Bracketed,
        Notation::Parenthesized,
        Notation::Superscript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Notation::Bracketed => "bracketed",
            Notation::Parenthesized => "parenthesized",
            Notation::Superscript => "superscript",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Notation::Bracketed => &*BRACKETED,
            Notation::Parenthesized => &*PARENTHESIZED,
            Notation::Superscript => &*SUPERSCRIPT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteMarker {
    pub value: u32,
    pub notation: Notation,
    /// Character span of the whole marker, brackets included.
    pub start: usize,
    pub end: usize,
}

/// Decode half-width, full-width or superscript digits to a number.
fn decode_digits(digits: &str) -> Option<u32> {
    digits.nfkc().collect::<String>().parse().ok()
}

/// All markers of one notation, in document order.
pub fn markers(text: &NormalizedText, notation: Notation) -> Result<Vec<FootnoteMarker>> {
    let mut out = Vec::new();
    for caps in notation.pattern().captures_iter(text.raw()) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let digits = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or(whole.as_str(), |m| m.as_str());
        let Some(value) = decode_digits(digits) else {
            continue;
        };

        let span = text
            .offset_of_byte(whole.start())
            .zip(text.offset_of_byte(whole.end()));
        let Some((start, end)) = span else {
            return Err(QaError::InvalidSpan {
                category: Category::DuplicateFootnote,
                start: whole.start(),
                end: whole.end(),
                len: text.len(),
            });
        };
        out.push(FootnoteMarker {
            value,
            notation,
            start,
            end,
        });
    }
    Ok(out)
}

/// One finding per marker whose number already appeared earlier in the same
/// notation, pointing back at the first occurrence.
pub fn scan(loc: &Locator<'_>) -> Result<Vec<Finding>> {
    let text = loc.text();
    let mut out = Vec::new();

    for notation in Notation::ALL {
        let mut first_seen: HashMap<u32, usize> = HashMap::new();
        for marker in markers(text, notation)? {
            let Some(&first) = first_seen.get(&marker.value) else {
                first_seen.insert(marker.value, marker.start);
                continue;
            };
            let invalid = || QaError::InvalidSpan {
                category: Category::DuplicateFootnote,
                start: marker.start,
                end: marker.end,
                len: text.len(),
            };
            let (line, column) = text.position(first).ok_or_else(invalid)?;
            let shown = text.slice(marker.start, marker.end).ok_or_else(invalid)?;
            out.push(loc.finding(
                Category::DuplicateFootnote,
                notation.as_str(),
                marker.start,
                marker.end,
                format!(
                    "footnote {shown} duplicates the marker first used at line {line}, column {column} (offset {first})"
                ),
            )?);
        }
    }

    Ok(out)
}
