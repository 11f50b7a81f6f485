use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};
use crate::normalize::NormalizedText;

/// What a finding is about. Each pattern rule, the glossary matcher and the
/// footnote scanner report under their own category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    AsciiPunctuation,
    MismatchedBracket,
    RepeatedPunctuation,
    InvalidCharacter,
    MixedWidthDigits,
    ExtraSpace,
    GlossaryVariant,
    DuplicateFootnote,
}

/// The four check families shown to reviewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Typography,
    Spacing,
    Terminology,
    Footnote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::AsciiPunctuation,
        Category::MismatchedBracket,
        Category::RepeatedPunctuation,
        Category::InvalidCharacter,
        Category::MixedWidthDigits,
        Category::ExtraSpace,
        Category::GlossaryVariant,
        Category::DuplicateFootnote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AsciiPunctuation => "ascii-punctuation",
            Category::MismatchedBracket => "mismatched-bracket",
            Category::RepeatedPunctuation => "repeated-punctuation",
            Category::InvalidCharacter => "invalid-character",
            Category::MixedWidthDigits => "mixed-width-digits",
            Category::ExtraSpace => "extra-space",
            Category::GlossaryVariant => "glossary-variant",
            Category::DuplicateFootnote => "duplicate-footnote",
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Category::AsciiPunctuation
            | Category::MismatchedBracket
            | Category::RepeatedPunctuation
            | Category::InvalidCharacter
            | Category::MixedWidthDigits => Family::Typography,
            Category::ExtraSpace => Family::Spacing,
            Category::GlossaryVariant => Family::Terminology,
            Category::DuplicateFootnote => Family::Footnote,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Category::InvalidCharacter => Severity::Error,
            Category::ExtraSpace => Severity::Info,
            _ => Severity::Warn,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Typography => "typography",
            Family::Spacing => "spacing",
            Family::Terminology => "terminology",
            Family::Footnote => "footnote",
        }
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// One located issue. Offsets are character offsets into the raw text,
/// `offset_end` exclusive; line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub category: Category,
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub offset_start: usize,
    pub offset_end: usize,
    pub context: String,
}

impl Finding {
    pub fn family(&self) -> Family {
        self.category.family()
    }
}

/// Builds findings against one normalized text, filling in position and a
/// context window of up to `context_chars` characters on each side of the
/// span, clipped to the span's line.
#[derive(Debug, Clone, Copy)]
pub struct Locator<'a> {
    text: &'a NormalizedText,
    context_chars: usize,
}

impl<'a> Locator<'a> {
    pub fn new(text: &'a NormalizedText, context_chars: usize) -> Self {
        Self {
            text,
            context_chars,
        }
    }

    pub fn text(&self) -> &'a NormalizedText {
        self.text
    }

    pub fn finding(
        &self,
        category: Category,
        rule_id: &str,
        start: usize,
        end: usize,
        message: String,
    ) -> Result<Finding> {
        let len = self.text.len();
        let invalid = || QaError::InvalidSpan {
            category,
            start,
            end,
            len,
        };
        if start > end || end > len {
            return Err(invalid());
        }

        let (line, column) = self.text.position(start).ok_or_else(invalid)?;
        let line_range = self.text.line_of(start).ok_or_else(invalid)?;

        let ctx_start = start
            .saturating_sub(self.context_chars)
            .max(line_range.start)
            .min(start);
        let ctx_end = (end + self.context_chars).min(line_range.end).max(end);
        let context = self.text.slice(ctx_start, ctx_end).ok_or_else(invalid)?;

        Ok(Finding {
            category,
            rule_id: rule_id.to_string(),
            severity: category.default_severity(),
            message,
            line,
            column,
            offset_start: start,
            offset_end: end,
            context: context.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn context_is_clipped_to_the_line() {
        let text = normalize("第一行\n本契約之委託人\n第三行").unwrap();
        let loc = Locator::new(&text, 2);
        // "委託" at offsets 8..10
        let f = loc
            .finding(Category::GlossaryVariant, "variant-term", 8, 10, "m".into())
            .unwrap();
        assert_eq!((f.line, f.column), (2, 5));
        assert_eq!(f.context, "約之委託人");

        let wide = Locator::new(&text, 50)
            .finding(Category::GlossaryVariant, "variant-term", 8, 10, "m".into())
            .unwrap();
        assert_eq!(wide.context, "本契約之委託人");
    }

    #[test]
    fn out_of_range_span_is_an_error() {
        let text = normalize("測試").unwrap();
        let err = Locator::new(&text, 4)
            .finding(Category::ExtraSpace, "x", 1, 5, String::new())
            .unwrap_err();
        assert!(matches!(err, QaError::InvalidSpan { end: 5, len: 2, .. }));
    }

    #[test]
    fn categories_map_to_families() {
        assert_eq!(Category::MismatchedBracket.family(), Family::Typography);
        assert_eq!(Category::ExtraSpace.family(), Family::Spacing);
        assert_eq!(Category::GlossaryVariant.family(), Family::Terminology);
        assert_eq!(Category::DuplicateFootnote.family(), Family::Footnote);
        assert_eq!(Category::InvalidCharacter.default_severity(), Severity::Error);
    }

    #[test]
    fn serializes_with_export_field_names() {
        let text = normalize("「測試").unwrap();
        let f = Locator::new(&text, 3)
            .finding(
                Category::MismatchedBracket,
                "unclosed-opener",
                0,
                1,
                "m".into(),
            )
            .unwrap();
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["category"], "mismatched-bracket");
        assert_eq!(json["ruleId"], "unclosed-opener");
        assert_eq!(json["offsetStart"], 0);
        assert_eq!(json["offsetEnd"], 1);
        assert_eq!(json["severity"], "warn");
        assert_eq!(json["context"], "「測試");
    }
}
