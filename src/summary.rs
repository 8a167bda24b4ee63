use std::collections::HashMap;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::SummaryArgs,
    condition::ConditionReport,
    data::render_cell,
    frame::SurveyFrame,
    io_utils,
    manifest::Manifest,
    pipeline::{self, PipelineReport},
    table,
};

const MISSING_LABEL: &str = "<missing>";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnCounts {
    pub column: String,
    pub values: Vec<ValueCount>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryReport {
    pub respondents: usize,
    pub multi_block_respondents: usize,
    pub multi_block_examples: Vec<String>,
    pub unrecognized_cells: usize,
    pub columns: Vec<ColumnCounts>,
}

/// Counts distinct rendered values of one column, most frequent first.
pub fn value_counts(frame: &SurveyFrame, column: usize, top: usize) -> Vec<ValueCount> {
    let total = frame.row_count();
    if total == 0 {
        return Vec::new();
    }
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in 0..total {
        let rendered = render_cell(frame.get(row, column));
        let key = if rendered.is_empty() {
            MISSING_LABEL.to_string()
        } else {
            rendered
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut items = counts.into_iter().collect::<Vec<_>>();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if top > 0 && items.len() > top {
        items.truncate(top);
    }
    items
        .into_iter()
        .map(|(value, count)| ValueCount {
            value,
            count,
            percent: (count as f64 / total as f64) * 100.0,
        })
        .collect()
}

pub fn build_summary(
    frame: &SurveyFrame,
    manifest: &Manifest,
    report: &PipelineReport,
    top: usize,
) -> Result<SummaryReport> {
    let mut names = vec![
        manifest.condition.code.clone(),
        manifest.condition.label.clone(),
    ];
    names.extend(manifest.items.iter().map(|item| item.name.clone()));
    let columns = names
        .into_iter()
        .map(|name| -> Result<ColumnCounts> {
            let idx = frame.require_column(&name)?;
            Ok(ColumnCounts {
                values: value_counts(frame, idx, top),
                column: name,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SummaryReport {
        respondents: report.respondents,
        multi_block_respondents: report.conditions.conflicts,
        multi_block_examples: report.conditions.conflict_ids.clone(),
        unrecognized_cells: report.recode.unrecognized_total(),
        columns,
    })
}

pub fn print_condition_table(conditions: &ConditionReport, manifest: &Manifest) {
    let total = conditions.counts.values().sum::<usize>();
    let rows = conditions
        .counts
        .iter()
        .map(|(code, count)| {
            let percent = if total == 0 {
                0.0
            } else {
                (*count as f64 / total as f64) * 100.0
            };
            vec![
                code.to_string(),
                manifest.label_for(*code).to_string(),
                count.to_string(),
                format!("{percent:.2}%"),
            ]
        })
        .collect::<Vec<_>>();
    let headers = ["code", "condition", "count", "percent"].map(String::from);
    table::print_table(&headers, &rows);
    if conditions.conflicts > 0 {
        println!(
            "{} respondent(s) answered more than one treatment block",
            conditions.conflicts
        );
    }
}

pub fn execute(args: &SummaryArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let manifest = Manifest::resolve(args.manifest.as_deref())?;

    let mut frame = pipeline::load_frame(&args.input, delimiter, encoding)?;
    let report = pipeline::transform(&mut frame, &manifest)
        .with_context(|| format!("Transforming {:?}", args.input))?;
    let summary = build_summary(&frame, &manifest, &report, args.top)?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&summary).context("Serializing summary to JSON")?;
        println!("{rendered}");
    } else {
        let headers = ["column", "value", "count", "percent"].map(String::from);
        let rows = summary
            .columns
            .iter()
            .flat_map(|column| {
                column.values.iter().map(|value| {
                    vec![
                        column.column.clone(),
                        value.value.clone(),
                        value.count.to_string(),
                        format!("{:.2}%", value.percent),
                    ]
                })
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }
    info!(
        "Summarized {} respondent(s) across {} column(s)",
        summary.respondents,
        summary.columns.len()
    );
    Ok(())
}
