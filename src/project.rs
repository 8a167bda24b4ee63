//! Stage 5: select the output column sets in manifest order and write them.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::{data::render_cell, error::SurveyError, frame::SurveyFrame, io_utils};

/// A fixed-order slice of the working table, rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Projection {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn write(&self, path: &Path, delimiter: u8) -> Result<()> {
        let mut writer = io_utils::open_csv_writer(Some(path), delimiter)?;
        writer
            .write_record(&self.headers)
            .with_context(|| format!("Writing header to {path:?}"))?;
        for (idx, row) in self.rows.iter().enumerate() {
            writer
                .write_record(row)
                .with_context(|| format!("Writing row {} to {path:?}", idx + 1))?;
        }
        writer
            .flush()
            .with_context(|| format!("Flushing output {path:?}"))?;
        info!(
            "Wrote {} row(s) x {} column(s) to {:?}",
            self.rows.len(),
            self.headers.len(),
            path
        );
        Ok(())
    }
}

pub fn project(frame: &SurveyFrame, columns: &[String]) -> Result<Projection, SurveyError> {
    let indices = columns
        .iter()
        .map(|column| frame.require_column(column))
        .collect::<Result<Vec<_>, _>>()?;
    let rows = frame
        .rows()
        .iter()
        .map(|row| {
            indices
                .iter()
                .map(|idx| render_cell(row.get(*idx).and_then(|cell| cell.as_ref())))
                .collect()
        })
        .collect();
    Ok(Projection {
        headers: columns.to_vec(),
        rows,
    })
}
