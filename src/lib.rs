//! Heuristic QA checks for Traditional Chinese translations.
//!
//! Text extracted from a translated document is normalized once, scanned by
//! independent checks (typography and spacing rules, glossary terminology,
//! duplicate footnote markers), and the findings are merged into one ordered
//! list for a human reviewer. Nothing is corrected.
//!
//! ```no_run
//! use rust_zh_qa::{CheckConfig, Glossary, GlossaryRow, check_text};
//!
//! let glossary = Glossary::load([GlossaryRow {
//!     en: None,
//!     zh_pref: "委任".into(),
//!     zh_variants: "委託|受託".into(),
//! }])?;
//! let findings = check_text("本案委託人……", Some(&glossary), &CheckConfig::default())?;
//! for f in &findings {
//!     println!("{}:{} [{}] {}", f.line, f.column, f.category, f.message);
//! }
//! # Ok::<(), rust_zh_qa::QaError>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod document;
pub mod error;
pub mod finding;
pub mod footnote;
pub mod glossary;
pub mod normalize;
pub mod pipeline;
pub mod rules;

#[cfg(feature = "python")]
mod python;

pub use aggregate::{CheckOutcome, QaReport, aggregate, aggregate_outcomes};
pub use config::{CheckConfig, RuleToggles};
pub use document::{Document, SourceFormat};
pub use error::{QaError, Result};
pub use finding::{Category, Family, Finding, Locator, Severity};
pub use footnote::{FootnoteMarker, Notation};
pub use glossary::{Glossary, GlossaryEntry, GlossaryRow};
pub use normalize::{CharClass, CharInfo, Line, NormalizedText, classify, normalize};
pub use pipeline::{check_document, check_text};
pub use rules::{PATTERN_RULES, PatternRule};
