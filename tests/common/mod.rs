#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use survey_prep::manifest::Manifest;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds a raw survey export with every column the built-in manifest expects,
/// plus the administrative columns the normalizer drops.
pub struct SurveyExport {
    headers: Vec<String>,
    rows: Vec<HashMap<String, String>>,
}

impl SurveyExport {
    pub fn new() -> Self {
        let manifest = Manifest::builtin();
        let mut headers = manifest.drop.clone();
        headers.extend(manifest.required_raw_columns());
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Adds a respondent with the given raw `(column, value)` answers; all
    /// other cells are left blank.
    pub fn respondent(mut self, id: &str, answers: &[(&str, &str)]) -> Self {
        let mut row = HashMap::new();
        row.insert("ResponseId".to_string(), id.to_string());
        row.insert("Status".to_string(), "IP Address".to_string());
        for (column, value) in answers {
            assert!(
                self.headers.iter().any(|h| h == column),
                "unknown raw column {column}"
            );
            row.insert(column.to_string(), value.to_string());
        }
        self.rows.push(row);
        self
    }

    pub fn without_column(mut self, column: &str) -> Self {
        self.headers.retain(|h| h != column);
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .map(|h| row.get(h).cloned().unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    pub fn to_csv(&self) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers).expect("write headers");
        for record in self.records() {
            writer.write_record(&record).expect("write record");
        }
        String::from_utf8(writer.into_inner().expect("flush csv")).expect("utf-8 csv")
    }
}

/// Reads a written output table into its header and rows.
pub fn read_output(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("open output");
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(String::from)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("record").iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

pub fn cell<'a>(headers: &[String], row: &'a [String], column: &str) -> &'a str {
    let idx = headers
        .iter()
        .position(|h| h == column)
        .unwrap_or_else(|| panic!("missing column {column}"));
    &row[idx]
}
