//! Stage 2: table-driven recoding of textual answers to ordinal codes.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::{
    data::Value,
    error::SurveyError,
    frame::SurveyFrame,
    manifest::{Manifest, RecodeRule},
    scale::{NO_RESPONSE, Scale},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecodeReport {
    pub columns: usize,
    pub recoded_cells: usize,
    pub no_response_cells: usize,
    /// Cells whose text was outside the column's scale, keyed by column.
    pub unrecognized: BTreeMap<String, usize>,
}

impl RecodeReport {
    pub fn unrecognized_total(&self) -> usize {
        self.unrecognized.values().sum()
    }
}

/// Recodes one text cell in place; cells without a code become missing.
fn recode_cell(cell: &mut Option<Value>, scale: Scale) -> CellOutcome {
    let Some(Value::Text(text)) = cell.as_ref() else {
        return CellOutcome::Untouched;
    };
    match scale.code(text) {
        Some(code) => {
            *cell = Some(Value::Ordinal(code));
            CellOutcome::Recoded
        }
        None => {
            let outcome = if text.trim() == NO_RESPONSE {
                CellOutcome::NoResponse
            } else {
                CellOutcome::Unrecognized
            };
            *cell = None;
            outcome
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellOutcome {
    Untouched,
    Recoded,
    NoResponse,
    Unrecognized,
}

pub fn recode_column(
    frame: &mut SurveyFrame,
    rule: &RecodeRule,
    report: &mut RecodeReport,
) -> Result<(), SurveyError> {
    let idx = frame.require_column(&rule.column)?;
    let mut unrecognized = 0usize;
    for cell in frame.column_cells_mut(idx) {
        match recode_cell(cell, rule.scale) {
            CellOutcome::Recoded => report.recoded_cells += 1,
            CellOutcome::NoResponse => report.no_response_cells += 1,
            CellOutcome::Unrecognized => unrecognized += 1,
            CellOutcome::Untouched => {}
        }
    }
    if unrecognized > 0 {
        debug!(
            "Column '{}' had {} value(s) outside scale {}",
            rule.column, unrecognized, rule.scale
        );
        report.unrecognized.insert(rule.column.clone(), unrecognized);
    }
    report.columns += 1;
    Ok(())
}

pub fn recode(frame: &mut SurveyFrame, manifest: &Manifest) -> Result<RecodeReport, SurveyError> {
    let mut report = RecodeReport::default();
    for rule in manifest.all_recodes() {
        recode_column(frame, &rule, &mut report)?;
    }
    info!(
        "Recoded {} cell(s) across {} column(s)",
        report.recoded_cells, report.columns
    );
    let unrecognized = report.unrecognized_total();
    if unrecognized > 0 {
        warn!(
            "{} cell(s) in {} column(s) held unrecognized answers and were treated as missing",
            unrecognized,
            report.unrecognized.len()
        );
    }
    Ok(report)
}
