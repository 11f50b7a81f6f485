use std::path::PathBuf;

use crate::finding::Category;

pub type Result<T> = std::result::Result<T, QaError>;

#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("input text is empty after stripping whitespace")]
    EmptyInput,

    /// `row` is the 1-based data row, absent for problems with the header.
    #[error("invalid glossary: {reason}")]
    GlossaryFormat { row: Option<usize>, reason: String },

    #[error("unsupported character {found:?} at offset {offset}")]
    UnsupportedCharacter { offset: usize, found: String },

    #[error("{category} produced span {start}..{end} outside a text of {len} characters")]
    InvalidSpan {
        category: Category,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("glossary csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}

impl QaError {
    pub(crate) fn glossary(row: Option<usize>, reason: impl Into<String>) -> Self {
        QaError::GlossaryFormat {
            row,
            reason: reason.into(),
        }
    }
}
