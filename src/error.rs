use thiserror::Error;

/// Failures that stop a run before any output is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurveyError {
    #[error("Input is missing {} expected column(s): {}", .columns.len(), .columns.join(", "))]
    MissingColumns { columns: Vec<String> },
    #[error("Column '{0}' appears more than once after renaming")]
    DuplicateColumn(String),
    #[error("Output column '{0}' is not present in the working table")]
    UnknownColumn(String),
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}
