//! Terminology glossary: preferred Traditional Chinese terms and the variant
//! forms that should be replaced by them.
//!
//! Rows come from a caller-supplied CSV with columns `en` (optional),
//! `zh_pref` (required) and `zh_variants` (`|`-separated). The glossary is
//! validated once at load time and then passed explicitly to [`scan`].

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QaError, Result};
use crate::finding::{Category, Finding, Locator};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryRow {
    #[serde(default)]
    pub en: Option<String>,
    pub zh_pref: String,
    #[serde(default)]
    pub zh_variants: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub en: Option<String>,
    pub preferred: String,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
}

/// Split a `zh_variants` cell on `|`, trimming pieces and dropping empty or
/// repeated ones.
pub fn split_variants(cell: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for piece in cell.split('|').map(str::trim) {
        if !piece.is_empty() && !out.iter().any(|v| v == piece) {
            out.push(piece.to_string());
        }
    }
    out
}

impl Glossary {
    pub fn load(rows: impl IntoIterator<Item = GlossaryRow>) -> Result<Self> {
        let mut entries: Vec<GlossaryEntry> = Vec::new();
        let mut by_preferred: HashMap<String, usize> = HashMap::new();
        let mut claims: HashMap<String, String> = HashMap::new();

        for (i, row) in rows.into_iter().enumerate() {
            let row_no = i + 1;
            let preferred = row.zh_pref.trim();
            if preferred.is_empty() {
                return Err(QaError::glossary(
                    Some(row_no),
                    format!("row {row_no} has an empty zh_pref"),
                ));
            }

            let mut variants = split_variants(&row.zh_variants);
            if variants.iter().any(|v| v == preferred) {
                warn!(preferred, "glossary row {row_no} lists its preferred term as a variant; dropped");
                variants.retain(|v| v != preferred);
            }

            for v in &variants {
                let owner = claims
                    .entry(v.clone())
                    .or_insert_with(|| preferred.to_string());
                if owner.as_str() != preferred {
                    return Err(QaError::glossary(
                        Some(row_no),
                        format!(
                            "row {row_no}: variant {v:?} is already a variant of {owner:?}, not {preferred:?}"
                        ),
                    ));
                }
            }

            let en = row
                .en
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            match by_preferred.get(preferred) {
                Some(&idx) => {
                    let entry = &mut entries[idx];
                    for v in variants {
                        if !entry.variants.contains(&v) {
                            entry.variants.push(v);
                        }
                    }
                    if entry.en.is_none() {
                        entry.en = en;
                    }
                }
                None => {
                    by_preferred.insert(preferred.to_string(), entries.len());
                    entries.push(GlossaryEntry {
                        en,
                        preferred: preferred.to_string(),
                        variants,
                    });
                }
            }
        }

        for (variant, owner) in &claims {
            if by_preferred.contains_key(variant) {
                return Err(QaError::glossary(
                    None,
                    format!("{variant:?} is both a preferred term and a variant of {owner:?}"),
                ));
            }
        }

        debug!(entries = entries.len(), variants = claims.len(), "glossary loaded");
        Ok(Self { entries })
    }

    /// Load from CSV text with a header row. Header names are matched after
    /// trimming whitespace and a leading byte-order mark.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: csv::StringRecord = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{FEFF}').trim().to_ascii_lowercase())
            .collect();
        if !headers.iter().any(|h| h == "zh_pref") {
            return Err(QaError::glossary(None, "missing required column zh_pref"));
        }
        rdr.set_headers(headers);

        let mut rows = Vec::new();
        for (i, record) in rdr.deserialize::<GlossaryRow>().enumerate() {
            let row_no = i + 1;
            let row = record.map_err(|e| {
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    QaError::Csv(e)
                } else {
                    QaError::glossary(Some(row_no), format!("row {row_no}: {e}"))
                }
            })?;
            rows.push(row);
        }
        Self::load(rows)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| QaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(io::BufReader::new(file))
    }

    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Term {
    chars: Vec<char>,
    /// Index of the entry this is a variant of; `None` for preferred terms.
    variant_of: Option<usize>,
}

/// Report every variant occurrence in the text.
///
/// Every position is tried and the longest matching term there is taken,
/// preferred terms included. A hit that lies wholly inside an earlier match
/// is dropped, so a variant nested in a longer variant or in a preferred term
/// is not reported on its own. Hits that merely overlap an earlier match are.
pub fn scan(loc: &Locator<'_>, glossary: &Glossary) -> Result<Vec<Finding>> {
    if glossary.is_empty() {
        return Ok(Vec::new());
    }

    let mut terms: Vec<Term> = Vec::new();
    for (idx, entry) in glossary.entries.iter().enumerate() {
        terms.push(Term {
            chars: entry.preferred.chars().collect(),
            variant_of: None,
        });
        for v in &entry.variants {
            terms.push(Term {
                chars: v.chars().collect(),
                variant_of: Some(idx),
            });
        }
    }

    let mut by_first: HashMap<char, Vec<usize>> = HashMap::new();
    for (i, term) in terms.iter().enumerate() {
        if let Some(&first) = term.chars.first() {
            by_first.entry(first).or_default().push(i);
        }
    }
    for candidates in by_first.values_mut() {
        candidates.sort_by(|a, b| terms[*b].chars.len().cmp(&terms[*a].chars.len()));
    }

    let chars = loc.text().chars();
    let mut out = Vec::new();
    let mut covered_until = 0;
    for i in 0..chars.len() {
        let hit = by_first.get(&chars[i].ch).and_then(|candidates| {
            candidates.iter().map(|&t| &terms[t]).find(|term| {
                let end = i + term.chars.len();
                end <= chars.len()
                    && chars[i..end].iter().zip(&term.chars).all(|(c, t)| c.ch == *t)
            })
        });

        let Some(term) = hit else {
            continue;
        };

        let end = i + term.chars.len();
        if end <= covered_until {
            continue;
        }
        covered_until = end;
        if let Some(idx) = term.variant_of {
            let entry = &glossary.entries[idx];
            let variant: String = term.chars.iter().collect();
            let mut message = format!(
                "variant {variant:?} used; preferred term is {:?}",
                entry.preferred
            );
            if let Some(en) = &entry.en {
                message.push_str(&format!(" (en: {en})"));
            }
            out.push(loc.finding(Category::GlossaryVariant, "variant-term", i, end, message)?);
        }
    }

    Ok(out)
}
