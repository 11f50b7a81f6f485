//! One QA run: normalize, run every enabled check, aggregate.
//!
//! The checks share nothing mutable, so with `parallel` set they run on the
//! rayon pool. Output order never depends on that; the aggregator sorts.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregate::{CheckOutcome, QaReport, aggregate_outcomes};
use crate::config::CheckConfig;
use crate::document::Document;
use crate::error::Result;
use crate::finding::{Finding, Locator};
use crate::footnote;
use crate::glossary::{self, Glossary};
use crate::normalize::normalize;
use crate::rules::{PatternRule, enabled_rules};

/// Run all enabled checks over `raw` and return the ordered findings.
///
/// `glossary` is optional; without one the terminology check reports
/// nothing.
pub fn check_text(
    raw: &str,
    glossary: Option<&Glossary>,
    config: &CheckConfig,
) -> Result<Vec<Finding>> {
    let text = normalize(raw)?;
    let loc = Locator::new(&text, config.context_chars);
    let rules: Vec<&'static PatternRule> = enabled_rules(&config.rules).collect();

    let (mut outcomes, extra) = if config.parallel {
        rayon::join(
            || {
                rules
                    .par_iter()
                    .map(|r| CheckOutcome::new(r.category.as_str(), r.check(&loc)))
                    .collect::<Vec<_>>()
            },
            || {
                let (g, f) = rayon::join(
                    || glossary_outcome(&loc, glossary, config),
                    || footnote_outcome(&loc, config),
                );
                [g, f]
            },
        )
    } else {
        let outcomes = rules
            .iter()
            .map(|r| CheckOutcome::new(r.category.as_str(), r.check(&loc)))
            .collect::<Vec<_>>();
        let extra = [
            glossary_outcome(&loc, glossary, config),
            footnote_outcome(&loc, config),
        ];
        (outcomes, extra)
    };
    outcomes.extend(extra.into_iter().flatten());

    for outcome in &outcomes {
        if let Ok(findings) = &outcome.result {
            debug!(check = outcome.check, findings = findings.len(), "check finished");
        }
    }

    let findings = aggregate_outcomes(outcomes)?;
    info!(
        chars = text.len(),
        lines = text.lines().len(),
        findings = findings.len(),
        "qa run complete"
    );
    Ok(findings)
}

pub fn check_document(
    doc: &Document,
    glossary: Option<&Glossary>,
    config: &CheckConfig,
) -> Result<QaReport> {
    debug!(format = doc.format().as_str(), bytes = doc.byte_len(), "checking document");
    check_text(doc.text(), glossary, config).map(QaReport::new)
}

fn glossary_outcome(
    loc: &Locator<'_>,
    glossary: Option<&Glossary>,
    config: &CheckConfig,
) -> Option<CheckOutcome> {
    if !config.glossary {
        return None;
    }
    let glossary = glossary?;
    Some(CheckOutcome::new("glossary", glossary::scan(loc, glossary)))
}

fn footnote_outcome(loc: &Locator<'_>, config: &CheckConfig) -> Option<CheckOutcome> {
    config
        .footnotes
        .then(|| CheckOutcome::new("footnotes", footnote::scan(loc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QaError;
    use crate::finding::Category;
    use crate::glossary::GlossaryRow;

    const SAMPLE: &str = "本契約之委託人,應於期限內提出「申請書。\n相關事項[12]與另見[12]說明 真的嗎？？？";

    fn glossary() -> Glossary {
        Glossary::load([GlossaryRow {
            en: Some("principal".to_string()),
            zh_pref: "委任".to_string(),
            zh_variants: "委託|受託".to_string(),
        }])
        .unwrap()
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let g = glossary();
        let parallel = check_text(SAMPLE, Some(&g), &CheckConfig::default()).unwrap();
        let sequential = check_text(
            SAMPLE,
            Some(&g),
            &CheckConfig {
                parallel: false,
                ..CheckConfig::default()
            },
        )
        .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn every_family_reports_on_the_sample() {
        let g = glossary();
        let findings = check_text(SAMPLE, Some(&g), &CheckConfig::default()).unwrap();
        let cats: Vec<Category> = findings.iter().map(|f| f.category).collect();
        for expected in [
            Category::AsciiPunctuation,
            Category::MismatchedBracket,
            Category::GlossaryVariant,
            Category::DuplicateFootnote,
            Category::RepeatedPunctuation,
            Category::ExtraSpace,
        ] {
            assert!(cats.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn disabled_checks_report_nothing() {
        let g = glossary();
        let mut config = CheckConfig {
            glossary: false,
            footnotes: false,
            ..CheckConfig::default()
        };
        config.rules.ascii_punctuation = false;
        let findings = check_text(SAMPLE, Some(&g), &config).unwrap();
        assert!(findings.iter().all(|f| !matches!(
            f.category,
            Category::GlossaryVariant | Category::DuplicateFootnote | Category::AsciiPunctuation
        )));
    }

    #[test]
    fn missing_glossary_is_not_an_error() {
        let findings = check_text("委託人", None, &CheckConfig::default()).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn empty_input_aborts_the_run() {
        assert!(matches!(
            check_text("  \n ", None, &CheckConfig::default()),
            Err(QaError::EmptyInput)
        ));
    }
}
