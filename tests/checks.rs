//! End-to-end behavior of the QA run on small documents.

use rust_zh_qa::{
    Category, CheckConfig, Document, Family, Glossary, GlossaryRow, QaError, SourceFormat,
    check_document, check_text,
};

fn run(text: &str) -> Vec<rust_zh_qa::Finding> {
    check_text(text, None, &CheckConfig::default()).unwrap()
}

fn of(findings: &[rust_zh_qa::Finding], category: Category) -> usize {
    findings.iter().filter(|f| f.category == category).count()
}

#[test]
fn glossary_variant_is_reported_once_with_preferred_term() {
    let g = Glossary::load([GlossaryRow {
        en: None,
        zh_pref: "委任".to_string(),
        zh_variants: "委託|受託|委任".to_string(),
    }])
    .unwrap();
    let text = "雙方同意由委託人負責。";
    let findings = check_text(text, Some(&g), &CheckConfig::default()).unwrap();
    assert_eq!(findings.len(), 1);
    let f = &findings[0];
    assert_eq!(f.category, Category::GlossaryVariant);
    assert_eq!((f.offset_start, f.offset_end), (5, 7));
    assert!(f.message.contains("委託") && f.message.contains("委任"));
    assert!(f.context.contains("委託"));
}

#[test]
fn unmatched_corner_bracket() {
    let findings = run("「測試");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, Category::MismatchedBracket);
    assert_eq!(of(&run("「測試」"), Category::MismatchedBracket), 0);
}

#[test]
fn repeated_question_marks_versus_ellipsis() {
    let findings = run("真的嗎？？？");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, Category::RepeatedPunctuation);
    assert_eq!((findings[0].offset_start, findings[0].offset_end), (3, 6));
    assert!(run("等等……").is_empty());
}

#[test]
fn duplicate_footnotes_within_one_notation() {
    let findings = run("上述事項[12]已列明，另見[12]。");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, Category::DuplicateFootnote);
    assert_eq!(findings[0].offset_start, 14);
    assert!(findings[0].message.contains("column 5"));

    assert_eq!(of(&run("條文[12]及註（12）"), Category::DuplicateFootnote), 0);
}

#[test]
fn empty_input_produces_no_findings() {
    assert!(matches!(
        check_text("", None, &CheckConfig::default()),
        Err(QaError::EmptyInput)
    ));
    assert!(matches!(
        check_text(" \r\n\t", None, &CheckConfig::default()),
        Err(QaError::EmptyInput)
    ));
}

#[test]
fn clean_document_is_a_valid_empty_result() {
    let doc = Document::new("本契約自雙方簽署之日起生效。", SourceFormat::WordProcessor);
    let report = check_document(&doc, None, &CheckConfig::default()).unwrap();
    assert!(report.is_clean());
    assert!(report.counts_by_family().values().all(|&n| n == 0));
}

#[test]
fn one_span_may_trigger_two_categories() {
    let findings = run("好,,嗎");
    assert_eq!(findings.len(), 2);
    assert!(findings.iter().all(|f| (f.offset_start, f.offset_end) == (1, 3)));
    assert_eq!(of(&findings, Category::AsciiPunctuation), 1);
    assert_eq!(of(&findings, Category::RepeatedPunctuation), 1);
}

#[test]
fn invisible_character_and_bracket_on_one_line() {
    let findings = run("「契\u{200B}約");
    assert_eq!(of(&findings, Category::InvalidCharacter), 1);
    assert_eq!(of(&findings, Category::MismatchedBracket), 1);
}

#[test]
fn report_groups_findings_by_family() {
    let g = Glossary::from_csv_reader("zh_pref,zh_variants\n契約,合約\n".as_bytes()).unwrap();
    let doc = Document::new("本合約 第一條,\n見[1]及[1]", SourceFormat::PlainText);
    let report = check_document(&doc, Some(&g), &CheckConfig::default()).unwrap();
    let families = report.counts_by_family();
    assert_eq!(families[&Family::Terminology], 1);
    assert_eq!(families[&Family::Spacing], 1);
    assert_eq!(families[&Family::Footnote], 1);
    assert_eq!(families[&Family::Typography], 1);
}

#[test]
fn config_file_switches_checks_off() {
    let config = CheckConfig::from_toml_str(
        r#"
footnotes = false
[rules]
repeated_punctuation = false
"#,
    )
    .unwrap();
    let findings = check_text("見[1]及[1]？？", None, &config).unwrap();
    assert!(findings.is_empty());
}

#[test]
fn ascii_parentheses_inside_chinese_text() {
    let findings = run("甲方(委任人)同意");
    assert_eq!(of(&findings, Category::AsciiPunctuation), 2);
    assert_eq!(of(&findings, Category::MismatchedBracket), 0);
}
