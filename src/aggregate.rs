use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::finding::{Category, Family, Finding};

/// The result of one check over the whole document.
#[derive(Debug)]
pub struct CheckOutcome {
    pub check: &'static str,
    pub result: Result<Vec<Finding>>,
}

impl CheckOutcome {
    pub fn new(check: &'static str, result: Result<Vec<Finding>>) -> Self {
        Self { check, result }
    }
}

/// Merge finding lists into one reviewable sequence: sorted by
/// (line, column, category) and with exact repeats (same category and span)
/// removed. Findings of different categories on one span are all kept.
pub fn aggregate(lists: Vec<Vec<Finding>>) -> Vec<Finding> {
    let mut all: Vec<Finding> = lists.into_iter().flatten().collect();
    all.sort_by(|a, b| {
        (a.line, a.column, a.category.as_str(), a.offset_end, &a.rule_id).cmp(&(
            b.line,
            b.column,
            b.category.as_str(),
            b.offset_end,
            &b.rule_id,
        ))
    });
    all.dedup_by(|b, a| {
        a.category == b.category && a.offset_start == b.offset_start && a.offset_end == b.offset_end
    });
    all
}

/// Like [`aggregate`], but over per-check outcomes. Any failed check fails
/// the whole run; its error is returned rather than dropped.
pub fn aggregate_outcomes(outcomes: Vec<CheckOutcome>) -> Result<Vec<Finding>> {
    let mut lists = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.result {
            Ok(findings) => lists.push(findings),
            Err(e) => {
                warn!(check = outcome.check, error = %e, "check failed");
                return Err(e);
            }
        }
    }
    Ok(aggregate(lists))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QaReport {
    pub findings: Vec<Finding>,
}

impl QaReport {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn counts_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for f in &self.findings {
            *counts.entry(f.category).or_insert(0) += 1;
        }
        counts
    }

    /// Counts for all four families, zero included.
    pub fn counts_by_family(&self) -> BTreeMap<Family, usize> {
        let mut counts: BTreeMap<Family, usize> = [
            Family::Typography,
            Family::Spacing,
            Family::Terminology,
            Family::Footnote,
        ]
        .into_iter()
        .map(|f| (f, 0))
        .collect();
        for f in &self.findings {
            *counts.entry(f.family()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QaError;
    use crate::finding::Severity;

    fn finding(category: Category, line: usize, column: usize, start: usize, end: usize) -> Finding {
        Finding {
            category,
            rule_id: "r".to_string(),
            severity: Severity::Warn,
            message: String::new(),
            line,
            column,
            offset_start: start,
            offset_end: end,
            context: String::new(),
        }
    }

    #[test]
    fn sorts_by_position_then_category() {
        let out = aggregate(vec![
            vec![finding(Category::RepeatedPunctuation, 2, 1, 10, 12)],
            vec![
                finding(Category::MismatchedBracket, 1, 5, 4, 5),
                finding(Category::InvalidCharacter, 1, 5, 4, 5),
            ],
            vec![finding(Category::ExtraSpace, 1, 2, 1, 2)],
        ]);
        let order: Vec<_> = out.iter().map(|f| f.category).collect();
        assert_eq!(
            order,
            vec![
                Category::ExtraSpace,
                Category::InvalidCharacter,
                Category::MismatchedBracket,
                Category::RepeatedPunctuation,
            ]
        );
    }

    #[test]
    fn removes_exact_duplicates_only() {
        let out = aggregate(vec![
            vec![finding(Category::GlossaryVariant, 1, 1, 0, 2)],
            vec![
                finding(Category::GlossaryVariant, 1, 1, 0, 2),
                finding(Category::GlossaryVariant, 1, 1, 0, 3),
                finding(Category::InvalidCharacter, 1, 1, 0, 2),
            ],
        ]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn failed_check_is_not_swallowed() {
        let outcomes = vec![
            CheckOutcome::new("ok", Ok(vec![finding(Category::ExtraSpace, 1, 1, 0, 1)])),
            CheckOutcome::new(
                "broken",
                Err(QaError::InvalidSpan {
                    category: Category::DuplicateFootnote,
                    start: 3,
                    end: 9,
                    len: 4,
                }),
            ),
        ];
        assert!(matches!(
            aggregate_outcomes(outcomes),
            Err(QaError::InvalidSpan { .. })
        ));
    }

    #[test]
    fn report_counts_every_family() {
        let report = QaReport::new(vec![
            finding(Category::AsciiPunctuation, 1, 1, 0, 1),
            finding(Category::MismatchedBracket, 1, 2, 1, 2),
        ]);
        let families = report.counts_by_family();
        assert_eq!(families[&Family::Typography], 2);
        assert_eq!(families[&Family::Footnote], 0);
        assert_eq!(report.counts_by_category()[&Category::AsciiPunctuation], 1);
        assert!(!report.is_clean());
    }
}
