//! Python bindings for the Streamlit front end.
//!
//! Text extraction from .docx/.pdf stays on the Python side; these functions
//! take extracted text (or plain-text files) and return findings.

use std::collections::HashMap;
use std::path::Path;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use rayon::prelude::*;

use crate::config::CheckConfig;
use crate::document::Document;
use crate::error::QaError;
use crate::finding::Finding;
use crate::glossary::Glossary;
use crate::pipeline;

fn to_py_err(e: QaError) -> PyErr {
    match e {
        QaError::Io { .. } => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

/// A finding as seen from Python
#[pyclass(name = "Finding")]
#[derive(Clone)]
struct PyFinding {
    #[pyo3(get)]
    category: String,
    #[pyo3(get)]
    family: String,
    #[pyo3(get)]
    rule_id: String,
    #[pyo3(get)]
    severity: String,
    #[pyo3(get)]
    message: String,
    #[pyo3(get)]
    line: usize,
    #[pyo3(get)]
    column: usize,
    #[pyo3(get)]
    offset_start: usize,
    #[pyo3(get)]
    offset_end: usize,
    #[pyo3(get)]
    context: String,
}

impl From<Finding> for PyFinding {
    fn from(f: Finding) -> Self {
        Self {
            category: f.category.as_str().to_string(),
            family: f.family().as_str().to_string(),
            rule_id: f.rule_id,
            severity: f.severity.as_str().to_string(),
            message: f.message,
            line: f.line,
            column: f.column,
            offset_start: f.offset_start,
            offset_end: f.offset_end,
            context: f.context,
        }
    }
}

#[pymethods]
impl PyFinding {
    fn __repr__(&self) -> String {
        format!(
            "Finding({} {}:{} {:?})",
            self.category, self.line, self.column, self.context
        )
    }
}

fn load_glossary_csv(csv_text: Option<&str>) -> PyResult<Option<Glossary>> {
    csv_text
        .map(|s| Glossary::from_csv_reader(s.as_bytes()))
        .transpose()
        .map_err(to_py_err)
}

fn load_glossary_path(path: Option<&str>) -> PyResult<Option<Glossary>> {
    path.map(|p| Glossary::from_csv_path(Path::new(p)))
        .transpose()
        .map_err(to_py_err)
}

fn category_counts(findings: &[Finding]) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for f in findings {
        *counts.entry(f.category.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Check extracted target text, optionally against a glossary given as CSV text
#[pyfunction]
#[pyo3(signature = (text, glossary_csv=None))]
fn check_text(text: String, glossary_csv: Option<String>) -> PyResult<Vec<PyFinding>> {
    let glossary = load_glossary_csv(glossary_csv.as_deref())?;
    let findings = pipeline::check_text(&text, glossary.as_ref(), &CheckConfig::default())
        .map_err(to_py_err)?;
    Ok(findings.into_iter().map(PyFinding::from).collect())
}

/// Check a UTF-8 text file, reading it entirely in Rust
#[pyfunction]
#[pyo3(signature = (path, glossary_path=None))]
fn check_file(path: String, glossary_path: Option<String>) -> PyResult<Vec<PyFinding>> {
    let glossary = load_glossary_path(glossary_path.as_deref())?;
    let doc = Document::read(Path::new(&path)).map_err(to_py_err)?;
    let report = pipeline::check_document(&doc, glossary.as_ref(), &CheckConfig::default())
        .map_err(to_py_err)?;
    Ok(report.findings.into_iter().map(PyFinding::from).collect())
}

/// Count findings per category
/// Returns: HashMap<category, count>
#[pyfunction]
fn count_findings(text: String) -> PyResult<HashMap<String, u64>> {
    let findings =
        pipeline::check_text(&text, None, &CheckConfig::default()).map_err(to_py_err)?;
    Ok(category_counts(&findings))
}

/// Batch count findings across multiple text files
/// Files that cannot be read or are empty are skipped.
/// Returns: HashMap<category, total_count>
#[pyfunction]
#[pyo3(signature = (file_paths, glossary_path=None))]
fn check_files_batch(
    file_paths: Vec<String>,
    glossary_path: Option<String>,
) -> PyResult<HashMap<String, u64>> {
    let glossary = load_glossary_path(glossary_path.as_deref())?;
    let config = CheckConfig::default();

    let totals = file_paths
        .par_iter()
        .filter_map(|p| {
            let doc = Document::read(Path::new(p)).ok()?;
            pipeline::check_document(&doc, glossary.as_ref(), &config).ok()
        })
        .map(|report| category_counts(&report.findings))
        .reduce(HashMap::new, |mut acc, counts| {
            for (k, v) in counts {
                *acc.entry(k).or_insert(0) += v;
            }
            acc
        });

    Ok(totals)
}

#[pymodule]
fn rust_zh_qa(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(check_text, m)?)?;
    m.add_function(wrap_pyfunction!(check_file, m)?)?;
    m.add_function(wrap_pyfunction!(count_findings, m)?)?;
    m.add_function(wrap_pyfunction!(check_files_batch, m)?)?;
    m.add_class::<PyFinding>()?;
    Ok(())
}
