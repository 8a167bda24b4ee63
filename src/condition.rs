//! Stage 3: assign each respondent to the treatment block they answered.
//!
//! A block is *occupied* when any of its item columns holds a value after
//! recoding. Blocks are scanned in declared order and the first occupied one
//! decides the condition code; respondents without any occupied block get
//! code 0. The study design allows only one occupied block per respondent, so
//! respondents with several are counted in [`ConditionReport::conflicts`].

use std::collections::BTreeMap;

use log::{info, warn};

use crate::{
    data::Value,
    error::SurveyError,
    frame::{Cell, SurveyFrame},
    manifest::Manifest,
};

pub const NON_TEST_CODE: u8 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionReport {
    /// Respondents per condition code, including code 0.
    pub counts: BTreeMap<u8, usize>,
    /// Respondents with more than one occupied block.
    pub conflicts: usize,
    /// First few response ids involved in a conflict.
    pub conflict_ids: Vec<String>,
}

const CONFLICT_SAMPLE: usize = 10;

/// Column indices of every block, in declared order.
pub(crate) fn block_indices(
    frame: &SurveyFrame,
    manifest: &Manifest,
) -> Result<Vec<(u8, Vec<usize>)>, SurveyError> {
    manifest
        .blocks
        .iter()
        .map(|block| {
            let columns = manifest
                .block_columns(block)
                .iter()
                .map(|column| frame.require_column(column))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((block.code, columns))
        })
        .collect()
}

/// Codes of the occupied blocks for one row, in declared order.
pub fn occupied_blocks(frame: &SurveyFrame, row: usize, blocks: &[(u8, Vec<usize>)]) -> Vec<u8> {
    blocks
        .iter()
        .filter(|(_, columns)| columns.iter().any(|idx| frame.get(row, *idx).is_some()))
        .map(|(code, _)| *code)
        .collect()
}

/// Adds the condition code and label columns to `frame`.
pub fn classify(
    frame: &mut SurveyFrame,
    manifest: &Manifest,
) -> Result<ConditionReport, SurveyError> {
    let blocks = block_indices(frame, manifest)?;
    let id_idx = frame.column_index(&manifest.id_column);

    let mut report = ConditionReport::default();
    let mut codes: Vec<Cell> = Vec::with_capacity(frame.row_count());
    let mut labels: Vec<Cell> = Vec::with_capacity(frame.row_count());
    for row in 0..frame.row_count() {
        let occupied = occupied_blocks(frame, row, &blocks);
        let code = occupied.first().copied().unwrap_or(NON_TEST_CODE);
        if occupied.len() > 1 {
            report.conflicts += 1;
            if report.conflict_ids.len() < CONFLICT_SAMPLE {
                let id = id_idx
                    .and_then(|idx| frame.get(row, idx))
                    .map(Value::as_display)
                    .unwrap_or_else(|| format!("row {}", row + 1));
                report.conflict_ids.push(id);
            }
        }
        *report.counts.entry(code).or_insert(0) += 1;
        codes.push(Some(Value::Ordinal(i64::from(code))));
        labels.push(Some(Value::Text(manifest.label_for(code).to_string())));
    }

    frame.push_column(&manifest.condition.code, codes)?;
    frame.push_column(&manifest.condition.label, labels)?;

    info!(
        "Assigned conditions for {} respondent(s): {}",
        frame.row_count(),
        report
            .counts
            .iter()
            .map(|(code, count)| format!("{code}={count}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    if report.conflicts > 0 {
        warn!(
            "{} respondent(s) answered more than one treatment block; kept the first block (e.g. {})",
            report.conflicts,
            report.conflict_ids.join(", ")
        );
    }
    Ok(report)
}
