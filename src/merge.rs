//! Stage 4: collapse the per-block copies of each item into one column.
//!
//! Runs after the condition classifier and reads its code column.

use log::info;

use crate::{
    condition::block_indices,
    data::Value,
    error::SurveyError,
    frame::{Cell, SurveyFrame},
    manifest::Manifest,
};

/// Per-row position in `blocks` of the block chosen by the classifier, if any.
fn chosen_blocks(
    frame: &SurveyFrame,
    manifest: &Manifest,
    blocks: &[(u8, Vec<usize>)],
) -> Result<Vec<Option<usize>>, SurveyError> {
    let code_idx = frame.require_column(&manifest.condition.code)?;
    Ok((0..frame.row_count())
        .map(|row| {
            let code = frame.get(row, code_idx).and_then(Value::as_ordinal)?;
            blocks
                .iter()
                .position(|(block_code, _)| i64::from(*block_code) == code)
        })
        .collect())
}

/// Appends one merged column per block item and returns how many cells were filled.
///
/// Each merged value is read from the block that decided `EXP_Cond` for the
/// row; answers left in other blocks by multi-block respondents are ignored,
/// so an item the chosen block lacks stays missing.
pub fn merge_blocks(frame: &mut SurveyFrame, manifest: &Manifest) -> Result<usize, SurveyError> {
    let blocks = block_indices(frame, manifest)?;
    let chosen = chosen_blocks(frame, manifest, &blocks)?;
    let mut filled = 0usize;
    for (item_pos, item) in manifest.items.iter().enumerate() {
        let merged = chosen
            .iter()
            .enumerate()
            .map(|(row, block)| -> Cell {
                let (_, columns) = &blocks[(*block)?];
                frame.get(row, columns[item_pos]).cloned()
            })
            .collect::<Vec<_>>();
        filled += merged.iter().filter(|cell| cell.is_some()).count();
        frame.push_column(&item.name, merged)?;
    }
    info!(
        "Merged {} item(s) across {} block(s); {} cell(s) populated",
        manifest.items.len(),
        blocks.len(),
        filled
    );
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::classify;

    fn frame_with_blocks(manifest: &Manifest, cells: &[(&str, i64)]) -> SurveyFrame {
        let mut headers = vec![manifest.id_column.clone()];
        for block in &manifest.blocks {
            headers.extend(manifest.block_columns(block));
        }
        let width = headers.len();
        let mut frame =
            SurveyFrame::from_records(headers, vec![vec![String::new(); width]]).unwrap();
        for (column, value) in cells {
            let idx = frame.column_index(column).unwrap();
            for cell in frame.column_cells_mut(idx) {
                *cell = Some(Value::Ordinal(*value));
            }
        }
        classify(&mut frame, manifest).unwrap();
        frame
    }

    #[test]
    fn merged_value_comes_from_the_answered_block() {
        let manifest = Manifest::builtin();
        let mut frame = frame_with_blocks(
            &manifest,
            &[("Q51_cand2_dishonest", 6), ("Q50_mess15_inform", 2)],
        );
        merge_blocks(&mut frame, &manifest).unwrap();
        assert_eq!(frame.value(0, "cand2_dishonest"), Some(&Value::Ordinal(6)));
        assert_eq!(frame.value(0, "mess15_inform"), Some(&Value::Ordinal(2)));
        assert_eq!(frame.value(0, "cand1_strong"), None);
    }

    #[test]
    fn no_block_means_every_merged_item_is_missing() {
        let manifest = Manifest::builtin();
        let mut frame = frame_with_blocks(&manifest, &[]);
        let filled = merge_blocks(&mut frame, &manifest).unwrap();
        assert_eq!(filled, 0);
        for item in &manifest.items {
            assert_eq!(frame.value(0, &item.name), None, "{}", item.name);
        }
    }

    #[test]
    fn conflicting_blocks_merge_only_from_the_classified_block() {
        let manifest = Manifest::builtin();
        let mut frame = frame_with_blocks(
            &manifest,
            &[
                ("Q20_mess14_imprtnt", 3),
                ("Q41_cand1_strong", 7),
                ("Q31_cand7_friends", 2),
                ("Q61_cand7_friends", 5),
            ],
        );
        assert_eq!(frame.value(0, "EXP_Cond"), Some(&Value::Ordinal(1)));
        let filled = merge_blocks(&mut frame, &manifest).unwrap();
        assert_eq!(filled, 1);
        assert_eq!(frame.value(0, "mess14_imprtnt"), Some(&Value::Ordinal(3)));
        assert_eq!(frame.value(0, "cand1_strong"), None);
        assert_eq!(frame.value(0, "cand7_friends"), None);
    }

    #[test]
    fn merge_requires_the_condition_column() {
        let manifest = Manifest::builtin();
        let mut headers = vec![manifest.id_column.clone()];
        for block in &manifest.blocks {
            headers.extend(manifest.block_columns(block));
        }
        let mut frame = SurveyFrame::new(headers).unwrap();
        assert_eq!(
            merge_blocks(&mut frame, &manifest),
            Err(SurveyError::UnknownColumn("EXP_Cond".to_string()))
        );
    }
}
