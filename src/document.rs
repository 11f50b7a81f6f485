//! Input documents and where they came from.
//!
//! The engine never parses binary formats. A `Document` holds text that an
//! external extractor already pulled out of a `.txt`, `.docx` or `.pdf` file,
//! tagged with the format it came from so reports can say so.

use std::path::Path;

use crate::error::{QaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    PlainText,
    WordProcessor,
    Pdf,
    Unknown,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("txt") => SourceFormat::PlainText,
            Some("docx") => SourceFormat::WordProcessor,
            Some("pdf") => SourceFormat::Pdf,
            _ => SourceFormat::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::PlainText => "txt",
            SourceFormat::WordProcessor => "docx",
            SourceFormat::Pdf => "pdf",
            SourceFormat::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    format: SourceFormat,
}

impl Document {
    pub fn new(text: impl Into<String>, format: SourceFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    /// Decode raw bytes as strict UTF-8.
    ///
    /// Invalid sequences are fatal: offsets computed over a lossy decode would
    /// point at the wrong characters.
    pub fn from_bytes(bytes: &[u8], format: SourceFormat) -> Result<Self> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(Self::new(text, format)),
            Err(e) => {
                let offset = e.valid_up_to();
                let bad_len = e.error_len().unwrap_or(bytes.len() - offset);
                let found = bytes[offset..offset + bad_len]
                    .iter()
                    .map(|b| format!("\\x{:02x}", b))
                    .collect::<String>();
                Err(QaError::UnsupportedCharacter { offset, found })
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| QaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes, SourceFormat::from_path(path))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn byte_len(&self) -> usize {
        self.text.len()
    }
}
