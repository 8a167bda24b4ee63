//! Runs the five stages in order over one working table.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::RunArgs,
    condition::{self, ConditionReport},
    frame::SurveyFrame,
    io_utils,
    manifest::Manifest,
    merge, normalize,
    project::{self, Projection},
    recode::{self, RecodeReport},
    summary,
};

pub const DEFAULT_FULL_OUTPUT: &str = "A1-SDO_Campaigns_All.csv";
pub const DEFAULT_FILTERED_OUTPUT: &str = "A2-SDO_Campaigns_filter.csv";

/// Diagnostics gathered while transforming the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub respondents: usize,
    pub recode: RecodeReport,
    pub conditions: ConditionReport,
    pub merged_cells: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub full: Projection,
    pub filtered: Projection,
    pub report: PipelineReport,
}

/// Stages 1 through 4: the frame ends up holding every output column.
pub fn transform(frame: &mut SurveyFrame, manifest: &Manifest) -> Result<PipelineReport> {
    let respondents = frame.row_count();
    normalize::normalize(frame, manifest)?;
    let recode = recode::recode(frame, manifest)?;
    let conditions = condition::classify(frame, manifest)?;
    let merged_cells = merge::merge_blocks(frame, manifest)?;
    debug_assert_eq!(frame.row_count(), respondents);
    Ok(PipelineReport {
        respondents,
        recode,
        conditions,
        merged_cells,
    })
}

pub fn run_pipeline(mut frame: SurveyFrame, manifest: &Manifest) -> Result<PipelineOutput> {
    let report = transform(&mut frame, manifest)?;
    let full = project::project(&frame, &manifest.outputs.full)?;
    let filtered = project::project(&frame, &manifest.outputs.filtered)?;
    Ok(PipelineOutput {
        full,
        filtered,
        report,
    })
}

pub fn load_frame(
    path: &Path,
    delimiter: u8,
    encoding: &'static encoding_rs::Encoding,
) -> Result<SurveyFrame> {
    let (headers, records) = io_utils::read_table(path, delimiter, encoding)?;
    let frame = SurveyFrame::from_records(headers, records)
        .with_context(|| format!("Building working table from {path:?}"))?;
    info!(
        "Loaded {} respondent(s) with {} column(s) from {:?}",
        frame.row_count(),
        frame.headers().len(),
        path
    );
    Ok(frame)
}

pub fn execute(args: &RunArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let manifest = Manifest::resolve(args.manifest.as_deref())?;
    info!(
        "Preparing '{}' (delimiter '{}')",
        args.input.display(),
        crate::printable_delimiter(delimiter)
    );

    let frame = load_frame(&args.input, delimiter, encoding)?;
    let output = run_pipeline(frame, &manifest)
        .with_context(|| format!("Transforming {:?}", args.input))?;

    for (projection, path) in [
        (&output.full, args.full_output.as_path()),
        (&output.filtered, args.filtered_output.as_path()),
    ] {
        let out_delimiter =
            io_utils::resolve_output_delimiter(path, args.output_delimiter, delimiter);
        projection.write(path, out_delimiter)?;
    }

    if args.summary {
        summary::print_condition_table(&output.report.conditions, &manifest);
    }
    Ok(())
}
