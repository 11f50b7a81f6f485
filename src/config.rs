//! Run configuration.
//!
//! Every check can be switched off. Missing keys fall back to defaults, so an
//! empty TOML document is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::finding::Category;

pub const DEFAULT_CONTEXT_CHARS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleToggles {
    pub ascii_punctuation: bool,
    pub mismatched_bracket: bool,
    pub repeated_punctuation: bool,
    pub invalid_character: bool,
    pub mixed_width_digits: bool,
    pub extra_space: bool,
}

impl Default for RuleToggles {
    fn default() -> Self {
        Self {
            ascii_punctuation: true,
            mismatched_bracket: true,
            repeated_punctuation: true,
            invalid_character: true,
            mixed_width_digits: true,
            extra_space: true,
        }
    }
}

impl RuleToggles {
    /// Whether a pattern rule is on. Categories that are not pattern rules
    /// are never reported by the rule set.
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::AsciiPunctuation => self.ascii_punctuation,
            Category::MismatchedBracket => self.mismatched_bracket,
            Category::RepeatedPunctuation => self.repeated_punctuation,
            Category::InvalidCharacter => self.invalid_character,
            Category::MixedWidthDigits => self.mixed_width_digits,
            Category::ExtraSpace => self.extra_space,
            Category::GlossaryVariant | Category::DuplicateFootnote => false,
        }
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        match category {
            Category::AsciiPunctuation => self.ascii_punctuation = enabled,
            Category::MismatchedBracket => self.mismatched_bracket = enabled,
            Category::RepeatedPunctuation => self.repeated_punctuation = enabled,
            Category::InvalidCharacter => self.invalid_character = enabled,
            Category::MixedWidthDigits => self.mixed_width_digits = enabled,
            Category::ExtraSpace => self.extra_space = enabled,
            Category::GlossaryVariant | Category::DuplicateFootnote => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub rules: RuleToggles,
    pub glossary: bool,
    pub footnotes: bool,
    /// Characters of context kept on each side of a finding's span.
    pub context_chars: usize,
    /// Run the independent checks on the rayon pool.
    pub parallel: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            rules: RuleToggles::default(),
            glossary: true,
            footnotes: true,
            context_chars: DEFAULT_CONTEXT_CHARS,
            parallel: true,
        }
    }
}

impl CheckConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
