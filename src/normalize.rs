//! Stage 1: rename raw export codes and remove administrative columns.

use itertools::Itertools;
use log::{debug, info};

use crate::{error::SurveyError, frame::SurveyFrame, manifest::Manifest};

/// Fails with every absent raw column listed; the frame is untouched on error.
pub fn check_required_columns(frame: &SurveyFrame, manifest: &Manifest) -> Result<(), SurveyError> {
    let missing = manifest
        .required_raw_columns()
        .into_iter()
        .filter(|column| !frame.has_column(column))
        .collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SurveyError::MissingColumns { columns: missing })
    }
}

pub fn normalize(frame: &mut SurveyFrame, manifest: &Manifest) -> Result<(), SurveyError> {
    check_required_columns(frame, manifest)?;

    let absent = manifest
        .drop
        .iter()
        .filter(|column| !frame.has_column(column))
        .join(", ");
    if !absent.is_empty() {
        debug!("Administrative column(s) not present, nothing to drop: {absent}");
    }
    let dropped = frame.drop_columns(&manifest.drop);

    let renames = manifest.all_renames();
    for rename in &renames {
        frame.rename(&rename.raw, &rename.name)?;
    }
    info!(
        "Normalized schema: renamed {} column(s), dropped {} administrative column(s)",
        renames.len(),
        dropped
    );
    Ok(())
}
