//! Output column listing from a manifest.

use std::collections::HashSet;

use anyhow::Result;
use log::info;

use crate::{cli::ColumnsArgs, manifest::Manifest, table};

/// Where an output column comes from, as shown in the listing.
pub fn column_origin(manifest: &Manifest, column: &str) -> String {
    if column == manifest.id_column {
        return "id".to_string();
    }
    if column == manifest.condition.code || column == manifest.condition.label {
        return "condition".to_string();
    }
    if let Some(item) = manifest.items.iter().find(|item| item.name == column) {
        return format!("merged ({})", item.scale);
    }
    for block in &manifest.blocks {
        if let Some(item) = manifest.items.iter().find(|item| block.column(item) == column) {
            return format!("block {} {}", block.code, block.raw_column(item));
        }
    }
    if let Some(rename) = manifest.renames.iter().find(|r| r.name == column) {
        return match manifest.recodes.iter().find(|r| r.column == column) {
            Some(rule) => format!("{} ({})", rename.raw, rule.scale),
            None => rename.raw.clone(),
        };
    }
    String::new()
}

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let manifest = Manifest::resolve(args.manifest.as_deref())?;
    let columns = if args.filtered {
        &manifest.outputs.filtered
    } else {
        &manifest.outputs.full
    };
    let filtered = manifest
        .outputs
        .filtered
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>();

    let rows = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.clone(),
                column_origin(&manifest, column),
                if filtered.contains(column.as_str()) {
                    "yes".to_string()
                } else {
                    String::new()
                },
            ]
        })
        .collect::<Vec<_>>();
    let headers = ["#", "name", "source", "filtered"].map(String::from);
    table::print_table(&headers, &rows);
    info!("Listed {} output column(s)", columns.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_describe_each_column_kind() {
        let manifest = Manifest::builtin();
        assert_eq!(column_origin(&manifest, "ResponseId"), "id");
        assert_eq!(column_origin(&manifest, "EXP_Cond_HR"), "condition");
        assert_eq!(
            column_origin(&manifest, "cand6_weak"),
            "merged (candidate-7-reverse)"
        );
        assert_eq!(
            column_origin(&manifest, "Q41_cand4_moral"),
            "block 3 Q41_4"
        );
        assert_eq!(
            column_origin(&manifest, "sdo2_Con_Trait_Dom1"),
            "SDO_Q5_2 (reverse-7)"
        );
        assert_eq!(column_origin(&manifest, "Age"), "Q11");
    }
}
