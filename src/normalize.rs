//! Text normalization: line segmentation, offset tracking and per-character
//! width classification.
//!
//! Nothing is rewritten here. Every character of the raw text keeps its
//! identity and gets a character offset, a byte offset, a 1-based
//! (line, column) position and a [`CharClass`]. Checks read these instead of
//! rescanning the text to locate what they find.

use crate::error::{QaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    CjkIdeograph,
    AsciiPunct,
    /// Full-width punctuation, including the ideographic space U+3000.
    FullwidthPunct,
    LatinAlnum,
    FullwidthDigit,
    Whitespace,
    Other,
}

pub fn classify(c: char) -> CharClass {
    let cp = c as u32;
    match cp {
        0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF
        | 0x30000..=0x3134F
        | 0x3007 => CharClass::CjkIdeograph,
        0xFF10..=0xFF19 => CharClass::FullwidthDigit,
        _ if c.is_ascii_punctuation() => CharClass::AsciiPunct,
        _ if c.is_ascii_alphanumeric() => CharClass::LatinAlnum,
        0x3000..=0x303F
        | 0xFE10..=0xFE19
        | 0xFE30..=0xFE4F
        | 0xFF01..=0xFF0F
        | 0xFF1A..=0xFF20
        | 0xFF3B..=0xFF40
        | 0xFF5B..=0xFF65
        | 0x00B7
        | 0x2014
        | 0x2015
        | 0x2018..=0x201F
        | 0x2025
        | 0x2026
        | 0x2027
        | 0x22EF => CharClass::FullwidthPunct,
        _ if c.is_whitespace() => CharClass::Whitespace,
        0x00C0..=0x024F if c.is_alphabetic() => CharClass::LatinAlnum,
        _ => CharClass::Other,
    }
}

/// Line terminators other than `\r\n`, which is handled as a pair.
pub fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharInfo {
    pub ch: char,
    /// Character offset into the raw text.
    pub offset: usize,
    /// Byte offset into the raw text.
    pub byte: usize,
    pub line: usize,
    pub column: usize,
    pub paragraph: usize,
    pub class: CharClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    /// Character offset of the first character on the line.
    pub start: usize,
    /// Character offset one past the last character before the terminator.
    pub end: usize,
    pub paragraph: usize,
}

#[derive(Debug, Clone)]
pub struct NormalizedText {
    raw: String,
    chars: Vec<CharInfo>,
    lines: Vec<Line>,
}

pub fn normalize(raw: &str) -> Result<NormalizedText> {
    if raw.trim().is_empty() {
        return Err(QaError::EmptyInput);
    }

    let mut chars = Vec::with_capacity(raw.len());
    let mut lines = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut line_start = 0;

    let mut iter = raw.char_indices().enumerate().peekable();
    while let Some((offset, (byte, ch))) = iter.next() {
        if ch == '\u{FFFD}' {
            return Err(QaError::UnsupportedCharacter {
                offset,
                found: "U+FFFD".to_string(),
            });
        }

        chars.push(CharInfo {
            ch,
            offset,
            byte,
            line,
            column,
            paragraph: 0,
            class: classify(ch),
        });
        column += 1;

        if is_line_break(ch) {
            if ch == '\r' {
                if let Some(&(next_offset, (next_byte, '\n'))) = iter.peek() {
                    iter.next();
                    chars.push(CharInfo {
                        ch: '\n',
                        offset: next_offset,
                        byte: next_byte,
                        line,
                        column,
                        paragraph: 0,
                        class: CharClass::Whitespace,
                    });
                }
            }
            lines.push(Line {
                number: line,
                start: line_start,
                end: offset,
                paragraph: 0,
            });
            line += 1;
            column = 1;
            line_start = chars.len();
        }
    }
    lines.push(Line {
        number: line,
        start: line_start,
        end: chars.len(),
        paragraph: 0,
    });

    assign_paragraphs(&mut lines, &mut chars);

    Ok(NormalizedText {
        raw: raw.to_string(),
        chars,
        lines,
    })
}

/// Paragraphs are runs of non-blank lines separated by one or more blank
/// lines. Blank lines stay in the paragraph before them.
fn assign_paragraphs(lines: &mut [Line], chars: &mut [CharInfo]) {
    let mut paragraph = 0;
    let mut seen_content = false;
    let mut pending_break = false;

    for line in lines.iter_mut() {
        let blank = chars[line.start..line.end]
            .iter()
            .all(|c| c.ch.is_whitespace());
        if blank {
            if seen_content {
                pending_break = true;
            }
        } else {
            if pending_break {
                paragraph += 1;
                pending_break = false;
            }
            seen_content = true;
        }
        line.paragraph = paragraph;
    }

    for c in chars.iter_mut() {
        c.paragraph = lines[c.line - 1].paragraph;
    }
}

impl NormalizedText {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn chars(&self) -> &[CharInfo] {
        &self.chars
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<&CharInfo> {
        self.chars.get(offset)
    }

    pub fn class_at(&self, offset: usize) -> Option<CharClass> {
        self.chars.get(offset).map(|c| c.class)
    }

    /// Character offset of the character starting at `byte`, or the text
    /// length for the end of the text.
    pub fn offset_of_byte(&self, byte: usize) -> Option<usize> {
        if byte == self.raw.len() {
            return Some(self.chars.len());
        }
        self.chars.binary_search_by_key(&byte, |c| c.byte).ok()
    }

    /// Byte offset of character offset `offset`; the text length maps to the
    /// raw byte length.
    pub fn byte_of_offset(&self, offset: usize) -> Option<usize> {
        if offset == self.chars.len() {
            return Some(self.raw.len());
        }
        self.chars.get(offset).map(|c| c.byte)
    }

    /// 1-based (line, column) of a character offset. The end of the text is
    /// reported one column past the last character.
    pub fn position(&self, offset: usize) -> Option<(usize, usize)> {
        if let Some(c) = self.chars.get(offset) {
            return Some((c.line, c.column));
        }
        if offset != self.chars.len() {
            return None;
        }
        match self.chars.last() {
            Some(last) if is_line_break(last.ch) => Some((last.line + 1, 1)),
            Some(last) => Some((last.line, last.column + 1)),
            None => Some((1, 1)),
        }
    }

    /// The line containing a character offset.
    pub fn line_of(&self, offset: usize) -> Option<&Line> {
        let (line, _) = self.position(offset)?;
        self.lines.get(line - 1)
    }

    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        let (b0, b1) = (self.byte_of_offset(start)?, self.byte_of_offset(end)?);
        self.raw.get(b0..b1)
    }
}
