//! Typographical and spacing rules.
//!
//! Each rule is a plain function over the normalized text, registered in
//! [`PATTERN_RULES`] under its category so it can be toggled and tested on its
//! own. Rules only report; nothing is corrected.

use std::collections::HashMap;

use lazy_static::lazy_static;
use unicode_normalization::UnicodeNormalization;

use crate::config::RuleToggles;
use crate::error::Result;
use crate::finding::{Category, Finding, Locator};
use crate::normalize::{CharClass, CharInfo, is_line_break};

pub type RuleFn = fn(&Locator<'_>) -> Result<Vec<Finding>>;

pub struct PatternRule {
    pub category: Category,
    pub description: &'static str,
    check: RuleFn,
}

impl PatternRule {
    pub fn check(&self, loc: &Locator<'_>) -> Result<Vec<Finding>> {
        (self.check)(loc)
    }
}

pub static PATTERN_RULES: [PatternRule; 6] = [
    PatternRule {
        category: Category::AsciiPunctuation,
        description: "half-width punctuation touching Chinese text",
        check: ascii_punctuation,
    },
    PatternRule {
        category: Category::MismatchedBracket,
        description: "unbalanced or mismatched brackets and quotes",
        check: mismatched_brackets,
    },
    PatternRule {
        category: Category::RepeatedPunctuation,
        description: "doubled or piled-up punctuation",
        check: repeated_punctuation,
    },
    PatternRule {
        category: Category::InvalidCharacter,
        description: "zero-width, byte-order-mark and control characters",
        check: invalid_characters,
    },
    PatternRule {
        category: Category::MixedWidthDigits,
        description: "numbers mixing half-width and full-width digits",
        check: mixed_width_digits,
    },
    PatternRule {
        category: Category::ExtraSpace,
        description: "spaces inside Chinese text",
        check: extra_spaces,
    },
];

pub fn enabled_rules(toggles: &RuleToggles) -> impl Iterator<Item = &'static PatternRule> + '_ {
    PATTERN_RULES
        .iter()
        .filter(move |r| toggles.is_enabled(r.category))
}

// ---------------------------------------------------------------------------
// ASCII punctuation inside CJK text
// ---------------------------------------------------------------------------

fn fullwidth_for(c: char) -> Option<&'static str> {
    match c {
        ',' => Some("，"),
        '.' => Some("。"),
        '!' => Some("！"),
        '?' => Some("？"),
        ':' => Some("："),
        ';' => Some("；"),
        '(' => Some("（"),
        ')' => Some("）"),
        '[' => Some("［"),
        ']' => Some("］"),
        '{' => Some("｛"),
        '}' => Some("｝"),
        '"' => Some("「」"),
        '\'' => Some("『』"),
        _ => None,
    }
}

/// Sentence punctuation forms runs; brackets and quotes stand alone.
fn joins_run(c: char) -> bool {
    matches!(c, ',' | '.' | '!' | '?' | ':' | ';')
}

fn is_cjk(c: Option<&CharInfo>) -> bool {
    c.is_some_and(|c| c.class == CharClass::CjkIdeograph)
}

fn ascii_punctuation(loc: &Locator<'_>) -> Result<Vec<Finding>> {
    let chars = loc.text().chars();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i].ch;
        if fullwidth_for(c).is_none() || is_apostrophe(chars, i) {
            i += 1;
            continue;
        }
        let start = i;
        i += 1;
        if joins_run(c) {
            while i < chars.len() && joins_run(chars[i].ch) {
                i += 1;
            }
        }

        let before = start.checked_sub(1).and_then(|p| chars.get(p));
        let after = chars.get(i);
        let rule_id = match (is_cjk(before), is_cjk(after)) {
            (true, true) => "between-cjk",
            // brackets next to digits or Latin text, e.g. footnote markers
            _ if !joins_run(c) => continue,
            (true, false) | (false, true) => "adjacent-cjk",
            (false, false) => continue,
        };

        let run: String = chars[start..i].iter().map(|c| c.ch).collect();
        let suggestion: String = if run.len() >= 3 && run.chars().all(|c| c == '.') {
            "……".to_string()
        } else {
            run.chars().filter_map(fullwidth_for).collect()
        };
        out.push(loc.finding(
            Category::AsciiPunctuation,
            rule_id,
            start,
            i,
            format!("half-width {run:?} in Chinese text; full-width {suggestion:?} exists"),
        )?);
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Brackets and quotes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    Half,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Paren,
    Square,
    Curly,
    Corner,
    WhiteCorner,
    Angle,
    DoubleAngle,
    DoubleQuote,
    SingleQuote,
}

#[derive(Debug)]
struct Bracket {
    open: char,
    close: char,
    width: Width,
    shape: Shape,
}

impl Bracket {
    fn symmetric(&self) -> bool {
        self.open == self.close
    }
}

static BRACKETS: [Bracket; 15] = [
    Bracket { open: '(', close: ')', width: Width::Half, shape: Shape::Paren },
    Bracket { open: '[', close: ']', width: Width::Half, shape: Shape::Square },
    Bracket { open: '{', close: '}', width: Width::Half, shape: Shape::Curly },
    Bracket { open: '"', close: '"', width: Width::Half, shape: Shape::DoubleQuote },
    Bracket { open: '\'', close: '\'', width: Width::Half, shape: Shape::SingleQuote },
    Bracket { open: '（', close: '）', width: Width::Full, shape: Shape::Paren },
    Bracket { open: '［', close: '］', width: Width::Full, shape: Shape::Square },
    Bracket { open: '【', close: '】', width: Width::Full, shape: Shape::Square },
    Bracket { open: '｛', close: '｝', width: Width::Full, shape: Shape::Curly },
    Bracket { open: '「', close: '」', width: Width::Full, shape: Shape::Corner },
    Bracket { open: '『', close: '』', width: Width::Full, shape: Shape::WhiteCorner },
    Bracket { open: '〈', close: '〉', width: Width::Full, shape: Shape::Angle },
    Bracket { open: '《', close: '》', width: Width::Full, shape: Shape::DoubleAngle },
    Bracket { open: '“', close: '”', width: Width::Full, shape: Shape::DoubleQuote },
    Bracket { open: '‘', close: '’', width: Width::Full, shape: Shape::SingleQuote },
];

lazy_static! {
    static ref OPENERS: HashMap<char, &'static Bracket> =
        BRACKETS.iter().map(|b| (b.open, b)).collect();
    static ref CLOSERS: HashMap<char, &'static Bracket> =
        BRACKETS.iter().map(|b| (b.close, b)).collect();
}

struct Open {
    bracket: &'static Bracket,
    offset: usize,
}

/// An apostrophe inside a word ("don't", "it’s") is not a quote.
fn is_apostrophe(chars: &[CharInfo], i: usize) -> bool {
    if !matches!(chars[i].ch, '\'' | '’') {
        return false;
    }
    let alnum = |c: Option<&CharInfo>| c.is_some_and(|c| c.class == CharClass::LatinAlnum);
    alnum(i.checked_sub(1).and_then(|p| chars.get(p))) && alnum(chars.get(i + 1))
}

fn flush_unclosed(loc: &Locator<'_>, stack: &mut Vec<Open>, out: &mut Vec<Finding>) -> Result<()> {
    for open in stack.drain(..) {
        out.push(loc.finding(
            Category::MismatchedBracket,
            "unclosed-opener",
            open.offset,
            open.offset + 1,
            format!(
                "{:?} is never closed; expected {:?} before the paragraph ends",
                open.bracket.open, open.bracket.close
            ),
        )?);
    }
    Ok(())
}

fn mismatched_brackets(loc: &Locator<'_>) -> Result<Vec<Finding>> {
    let chars = loc.text().chars();
    let mut out = Vec::new();
    let mut stack: Vec<Open> = Vec::new();
    let mut paragraph = 0;

    for (i, c) in chars.iter().enumerate() {
        if c.paragraph != paragraph {
            flush_unclosed(loc, &mut stack, &mut out)?;
            paragraph = c.paragraph;
        }
        if is_apostrophe(chars, i) {
            continue;
        }

        if let Some(&b) = CLOSERS.get(&c.ch) {
            let top = stack.last().map(|o| o.bracket);
            if b.symmetric() && top.is_none_or(|t| t.open != b.open) {
                stack.push(Open { bracket: b, offset: i });
                continue;
            }

            match top {
                Some(t) if std::ptr::eq(t, b) => {
                    stack.pop();
                }
                Some(t) if t.shape == b.shape && t.width != b.width => {
                    let open = stack.pop();
                    let (line, column) = open
                        .and_then(|o| loc.text().position(o.offset))
                        .unwrap_or((c.line, c.column));
                    out.push(loc.finding(
                        Category::MismatchedBracket,
                        "crossed-pair",
                        i,
                        i + 1,
                        format!(
                            "{:?} opened at line {line}, column {column} is closed by {:?}; use {:?}",
                            t.open, c.ch, t.close
                        ),
                    )?);
                }
                _ => {
                    if let Some(pos) = stack.iter().rposition(|o| std::ptr::eq(o.bracket, b)) {
                        let mut inner = stack.split_off(pos + 1);
                        flush_unclosed(loc, &mut inner, &mut out)?;
                        stack.pop();
                    } else {
                        out.push(loc.finding(
                            Category::MismatchedBracket,
                            "unopened-closer",
                            i,
                            i + 1,
                            format!("{:?} has no matching {:?}", c.ch, b.open),
                        )?);
                    }
                }
            }
        } else if let Some(&b) = OPENERS.get(&c.ch) {
            stack.push(Open { bracket: b, offset: i });
        }
    }

    flush_unclosed(loc, &mut stack, &mut out)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Repeated punctuation
// ---------------------------------------------------------------------------

fn is_repeatable_punct(c: char) -> bool {
    matches!(
        c,
        '!' | '?'
            | ','
            | '.'
            | ';'
            | ':'
            | '，'
            | '。'
            | '！'
            | '？'
            | '；'
            | '：'
            | '、'
            | '．'
            | '～'
            | '…'
            | '⋯'
            | '‥'
            | '—'
    )
}

/// Runs that are conventional on their own: ASCII "..." or "......",
/// "……", "⋯⋯" and the Chinese dash "——".
fn is_allowed_run(c: char, len: usize) -> bool {
    match c {
        '.' => len == 3 || len == 6,
        '…' | '⋯' => len <= 2,
        '‥' => len == 1,
        '—' => len <= 2,
        _ => false,
    }
}

fn repeated_punctuation(loc: &Locator<'_>) -> Result<Vec<Finding>> {
    let chars = loc.text().chars();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if !is_repeatable_punct(chars[i].ch) {
            i += 1;
            continue;
        }

        // Segment the run at allowed groups, then judge each segment.
        let mut seg_start = i;
        let mut groups = 0;
        while i <= chars.len() {
            let at_end = i == chars.len() || !is_repeatable_punct(chars[i].ch);
            if at_end {
                report_segment(loc, seg_start, i, groups, &mut out)?;
                break;
            }
            let ch = chars[i].ch;
            let group_start = i;
            while i < chars.len() && chars[i].ch == ch {
                i += 1;
            }
            if is_allowed_run(ch, i - group_start) {
                report_segment(loc, seg_start, group_start, groups, &mut out)?;
                seg_start = i;
                groups = 0;
            } else {
                groups += 1;
            }
        }
    }

    Ok(out)
}

fn report_segment(
    loc: &Locator<'_>,
    start: usize,
    end: usize,
    groups: usize,
    out: &mut Vec<Finding>,
) -> Result<()> {
    let len = end - start;
    let run: String = loc.text().chars()[start..end].iter().map(|c| c.ch).collect();
    let finding = match groups {
        1 if len >= 2 => loc.finding(
            Category::RepeatedPunctuation,
            "identical-run",
            start,
            end,
            format!("{run:?} repeats one mark {len} times; likely a typo"),
        )?,
        g if g >= 2 && len >= 3 => loc.finding(
            Category::RepeatedPunctuation,
            "mixed-run",
            start,
            end,
            format!("{len} punctuation marks in a row {run:?}; likely a typo"),
        )?,
        _ => return Ok(()),
    };
    out.push(finding);
    Ok(())
}

// ---------------------------------------------------------------------------
// Zero-width and control characters
// ---------------------------------------------------------------------------

fn invalid_kind(c: char) -> Option<&'static str> {
    match c {
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' => Some("zero-width"),
        '\u{FEFF}' => Some("byte-order-mark"),
        '\u{00AD}' | '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' => {
            Some("invisible-format")
        }
        '\t' | '\n' | '\r' | '\u{0085}' => None,
        _ if c.is_control() => Some("control-character"),
        _ => None,
    }
}

fn invalid_characters(loc: &Locator<'_>) -> Result<Vec<Finding>> {
    let mut out = Vec::new();
    for c in loc.text().chars() {
        if let Some(kind) = invalid_kind(c.ch) {
            out.push(loc.finding(
                Category::InvalidCharacter,
                kind,
                c.offset,
                c.offset + 1,
                format!("invisible character U+{:04X} ({kind})", c.ch as u32),
            )?);
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Mixed-width digits
// ---------------------------------------------------------------------------

fn is_digit(c: &CharInfo) -> bool {
    c.ch.is_ascii_digit() || c.class == CharClass::FullwidthDigit
}

fn is_number_separator(c: char) -> bool {
    matches!(c, '.' | ',' | '．')
}

fn mixed_width_digits(loc: &Locator<'_>) -> Result<Vec<Finding>> {
    let chars = loc.text().chars();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if !is_digit(&chars[i]) {
            i += 1;
            continue;
        }
        let start = i;
        let (mut half, mut full) = (false, false);
        loop {
            if chars[i].ch.is_ascii_digit() {
                half = true;
            } else {
                full = true;
            }
            i += 1;
            if i < chars.len() && is_digit(&chars[i]) {
                continue;
            }
            if i + 1 < chars.len() && is_number_separator(chars[i].ch) && is_digit(&chars[i + 1]) {
                i += 1;
                continue;
            }
            break;
        }

        if half && full {
            let token: String = chars[start..i].iter().map(|c| c.ch).collect();
            let normalized: String = token.nfkc().collect();
            out.push(loc.finding(
                Category::MixedWidthDigits,
                "mixed-width-number",
                start,
                i,
                format!("{token:?} mixes half-width and full-width digits; write {normalized:?}"),
            )?);
        }
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Spaces inside Chinese text
// ---------------------------------------------------------------------------

fn is_inline_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{00A0}')
}

fn is_fullwidth_mark(c: Option<&CharInfo>) -> bool {
    c.is_some_and(|c| c.class == CharClass::FullwidthPunct && c.ch != '\u{3000}')
}

fn extra_spaces(loc: &Locator<'_>) -> Result<Vec<Finding>> {
    let chars = loc.text().chars();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if !is_inline_space(chars[i].ch) {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && is_inline_space(chars[i].ch) {
            i += 1;
        }
        let before = start.checked_sub(1).and_then(|p| chars.get(p));
        let after = chars.get(i);
        if before.is_some_and(|c| is_line_break(c.ch)) {
            continue;
        }

        let rule_id = if is_cjk(before) && is_cjk(after) {
            "space-between-cjk"
        } else if (is_cjk(before) || is_fullwidth_mark(before))
            && (is_cjk(after) || is_fullwidth_mark(after))
        {
            "space-around-fullwidth-punctuation"
        } else {
            continue;
        };

        out.push(loc.finding(
            Category::ExtraSpace,
            rule_id,
            start,
            i,
            format!("{} stray space character(s) inside Chinese text", i - start),
        )?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::normalize::normalize;

    fn run(check: RuleFn, text: &str) -> Vec<Finding> {
        let t = normalize(text).unwrap();
        check(&Locator::new(&t, 8)).unwrap()
    }

    fn spans(findings: &[Finding]) -> Vec<(usize, usize, &str)> {
        findings
            .iter()
            .map(|f| (f.offset_start, f.offset_end, f.rule_id.as_str()))
            .collect()
    }

    #[test]
    fn registry_covers_each_pattern_category_once() {
        let cats: HashSet<Category> = PATTERN_RULES.iter().map(|r| r.category).collect();
        assert_eq!(cats.len(), PATTERN_RULES.len());
        assert!(!cats.contains(&Category::GlossaryVariant));
        let mut toggles = RuleToggles::default();
        toggles.extra_space = false;
        assert_eq!(enabled_rules(&toggles).count(), 5);
    }

    #[test]
    fn ascii_punctuation_next_to_cjk() {
        let f = run(ascii_punctuation, "本契約,雙方同意.Section 1.5 applies");
        assert_eq!(spans(&f), vec![(3, 4, "between-cjk"), (8, 9, "adjacent-cjk")]);
        assert!(f[0].message.contains('，'));
    }

    #[test]
    fn ascii_punctuation_ignores_latin_and_decimals() {
        assert!(run(ascii_punctuation, "Hello, world. 第1.5條").is_empty());
        // separated by whitespace is not adjacent
        assert!(run(ascii_punctuation, "中文 , 中文").is_empty());
    }

    #[test]
    fn ascii_brackets_and_quotes_between_cjk() {
        let f = run(ascii_punctuation, "甲方(委任人)同意");
        assert_eq!(spans(&f), vec![(2, 3, "between-cjk"), (6, 7, "between-cjk")]);
        assert!(f[0].message.contains('（'));
        assert!(f[1].message.contains('）'));

        let q = run(ascii_punctuation, "稱為\"本約\"者");
        assert_eq!(spans(&q), vec![(2, 3, "between-cjk"), (5, 6, "between-cjk")]);
        assert!(q[0].message.contains("「」"));
    }

    #[test]
    fn ascii_brackets_beside_digits_or_latin_are_left_alone() {
        assert!(run(ascii_punctuation, "見[1]及[2]").is_empty());
        assert!(run(ascii_punctuation, "甲方(A)同意").is_empty());
        assert!(run(ascii_punctuation, "他說don't不行").is_empty());
    }

    #[test]
    fn ascii_dots_suggest_chinese_ellipsis() {
        let f = run(ascii_punctuation, "等等...");
        assert_eq!(spans(&f), vec![(2, 5, "adjacent-cjk")]);
        assert!(f[0].message.contains("……"));
    }

    #[test]
    fn unclosed_opener_is_one_finding() {
        let f = run(mismatched_brackets, "「測試");
        assert_eq!(spans(&f), vec![(0, 1, "unclosed-opener")]);
        assert_eq!(f[0].category, Category::MismatchedBracket);
    }

    #[test]
    fn balanced_brackets_are_clean() {
        assert!(run(mismatched_brackets, "「測試」").is_empty());
        assert!(run(mismatched_brackets, "『引（註）文』與 (a [b] {c}) \"q\"").is_empty());
        assert!(run(mismatched_brackets, "don't stop, it's fine").is_empty());
    }

    #[test]
    fn stray_closer_is_flagged() {
        let f = run(mismatched_brackets, "測試」完成");
        assert_eq!(spans(&f), vec![(2, 3, "unopened-closer")]);
    }

    #[test]
    fn half_width_closer_does_not_close_full_width_opener() {
        let f = run(mismatched_brackets, "見（附件)說明");
        assert_eq!(spans(&f), vec![(4, 5, "crossed-pair")]);
        assert!(f[0].message.contains('）'));
    }

    #[test]
    fn closing_outer_bracket_reports_inner_unclosed() {
        let f = run(mismatched_brackets, "「他說『好」");
        assert_eq!(spans(&f), vec![(3, 4, "unclosed-opener")]);
    }

    #[test]
    fn brackets_are_scoped_per_paragraph() {
        let f = run(mismatched_brackets, "「第一段\n\n第二段」");
        assert_eq!(
            spans(&f),
            vec![(0, 1, "unclosed-opener"), (9, 10, "unopened-closer")]
        );
        // a single line break does not end the paragraph
        assert!(run(mismatched_brackets, "「第一行\n第二行」").is_empty());
    }

    #[test]
    fn repeated_identical_punctuation() {
        let f = run(repeated_punctuation, "真的嗎？？？");
        assert_eq!(spans(&f), vec![(3, 6, "identical-run")]);
        assert_eq!(spans(&run(repeated_punctuation, "好，，")), vec![(1, 3, "identical-run")]);
    }

    #[test]
    fn ellipsis_and_dash_are_allowed() {
        assert!(run(repeated_punctuation, "等等……").is_empty());
        assert!(run(repeated_punctuation, "等等...").is_empty());
        assert!(run(repeated_punctuation, "他說——不行").is_empty());
        assert!(run(repeated_punctuation, "真的？！").is_empty());
        assert!(run(repeated_punctuation, "好……。").is_empty());
    }

    #[test]
    fn mixed_punctuation_pile_up() {
        let f = run(repeated_punctuation, "what!?!");
        assert_eq!(spans(&f), vec![(4, 7, "mixed-run")]);
        let f = run(repeated_punctuation, "完了。。，下一句");
        assert_eq!(spans(&f), vec![(2, 5, "mixed-run")]);
    }

    #[test]
    fn too_many_dots_are_flagged() {
        let f = run(repeated_punctuation, "等等....");
        assert_eq!(spans(&f), vec![(2, 6, "identical-run")]);
    }

    #[test]
    fn invisible_characters_are_flagged_per_occurrence() {
        let f = run(invalid_characters, "\u{FEFF}委\u{200B}託\u{0007}\t人\u{200D}");
        assert_eq!(
            spans(&f),
            vec![
                (0, 1, "byte-order-mark"),
                (2, 3, "zero-width"),
                (4, 5, "control-character"),
                (7, 8, "zero-width"),
            ]
        );
        assert!(f[1].message.contains("U+200B"));
    }

    #[test]
    fn mixed_width_digit_tokens() {
        let f = run(mixed_width_digits, "共1２3元，另計１２元與45元");
        assert_eq!(spans(&f), vec![(1, 4, "mixed-width-number")]);
        assert!(f[0].message.contains("\"123\""));

        let f = run(mixed_width_digits, "比例為3.５%");
        assert_eq!(spans(&f), vec![(3, 6, "mixed-width-number")]);
    }

    #[test]
    fn spaces_between_chinese_characters() {
        let f = run(extra_spaces, "本 契約  條款。 下一句\n  縮排 English text");
        assert_eq!(
            spans(&f),
            vec![
                (1, 2, "space-between-cjk"),
                (4, 6, "space-between-cjk"),
                (9, 10, "space-around-fullwidth-punctuation"),
            ]
        );
    }
}
