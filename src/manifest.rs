//! Static configuration describing the survey export.
//!
//! A [`Manifest`] names every raw column the pipeline expects, what it is
//! renamed to, which [`Scale`] recodes it, how the treatment blocks are laid
//! out, and the exact column order of both output tables. The compiled-in
//! layout is [`Manifest::builtin()`]; an edited copy can be loaded from YAML.

use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::SurveyError, scale::Scale};

const ADMIN_COLUMNS: &[&str] = &[
    "StartDate",
    "EndDate",
    "Status",
    "Progress",
    "Duration__in_seconds_",
    "Finished",
    "DistributionChannel",
    "RecordedDate",
    "Q3_Consent",
];

const DEMOGRAPHICS: &[(&str, &str)] = &[("Q11", "Age"), ("Q12", "Ethnicity"), ("Q13", "Sex")];

const SDO_ITEMS: &[(&str, &str, Scale)] = &[
    ("SDO_Q5_1", "sdo1_Pro_Trait_Dom1", Scale::Forward7),
    ("SDO_Q5_13", "sdo13_Pro_Trait_Dom2", Scale::Forward7),
    ("SDO_Q5_6", "sdo6_Con_Trait_Dom2", Scale::Reverse7),
    ("SDO_Q5_2", "sdo2_Con_Trait_Dom1", Scale::Reverse7),
    ("SDO_Q5_7", "sdo7_Pro_Trait_AntiEgal1", Scale::Forward7),
    ("SDO_Q5_3", "sdo3_Pro_Trait_AntiEgal2", Scale::Forward7),
    ("SDO_Q5_4", "sdo4_Con_Trait_AntiEgal2", Scale::Reverse7),
    ("SDO_Q5_14", "sdo14_Con_Trait_AntiEgal1", Scale::Reverse7),
];

const POLITICAL_ITEMS: &[(&str, &str, Scale)] = &[
    ("Political_Views_Q6_2", "ideol2_social", Scale::Ideology7),
    ("Political_Views_Q6_4", "ideol4_econ", Scale::Ideology7),
    ("Political_Views_Q6_3", "ideol3_self", Scale::Ideology7),
    ("Public_Trust_Q7_13", "trust13_officials", Scale::Trust7),
    ("Public_Trust_Q7_6", "trust6_nocare", Scale::Trust7),
    ("Public_Trust_Q7_2", "trust2_nosay", Scale::Trust7),
    ("Q8_13", "pol_interest", Scale::Interest),
    ("Q9_13", "pol_vote", Scale::Vote),
];

const BLOCK_ITEMS: &[(&str, u32, ItemGroup, Scale)] = &[
    ("mess14_imprtnt", 14, ItemGroup::Message, Scale::Message4),
    ("mess15_inform", 15, ItemGroup::Message, Scale::Message4),
    ("mess13_fair", 13, ItemGroup::Message, Scale::Message4),
    ("cand1_strong", 1, ItemGroup::Candidate, Scale::Candidate7),
    ("cand13_relate", 13, ItemGroup::Candidate, Scale::Candidate7),
    ("cand6_weak", 6, ItemGroup::Candidate, Scale::Candidate7Reverse),
    ("cand2_dishonest", 2, ItemGroup::Candidate, Scale::Candidate7Reverse),
    ("cand7_friends", 7, ItemGroup::Candidate, Scale::Candidate7),
    ("cand3_aggressive", 3, ItemGroup::Candidate, Scale::Candidate7Reverse),
    ("cand4_moral", 4, ItemGroup::Candidate, Scale::Candidate7),
    ("cand14_competent", 14, ItemGroup::Candidate, Scale::Candidate7),
    ("cand15_votefor", 15, ItemGroup::Candidate, Scale::Candidate7),
    ("cand16_volunteer", 16, ItemGroup::Candidate, Scale::Candidate7),
    ("cand17_persuade", 17, ItemGroup::Candidate, Scale::Candidate7),
];

// Merged items appear in the outputs in this order.
const MERGED_OUTPUT_ORDER: &[&str] = &[
    "cand17_persuade",
    "cand16_volunteer",
    "cand15_votefor",
    "cand14_competent",
    "cand13_relate",
    "cand7_friends",
    "cand6_weak",
    "cand4_moral",
    "cand3_aggressive",
    "cand2_dishonest",
    "cand1_strong",
    "mess15_inform",
    "mess14_imprtnt",
    "mess13_fair",
];

const BLOCKS: &[(&str, &str, &str)] = &[
    ("Q20", "Q21", "HE-CivilPositive"),
    ("Q30", "Q31", "HA-CivilPositive"),
    ("Q40", "Q41", "HE-CivilNegative"),
    ("Q50", "Q51", "HA-CivilNegative"),
    ("Q60", "Q61", "HE-Uncivil"),
    ("Q70", "Q71", "HA-Uncivil"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemGroup {
    Message,
    Candidate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub raw: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecodeRule {
    pub column: String,
    pub scale: Scale,
}

/// One item asked in every treatment block and merged into a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockItem {
    pub name: String,
    /// Numeric suffix of the raw export column, e.g. `14` in `Q20_14`.
    pub raw_code: u32,
    pub group: ItemGroup,
    pub scale: Scale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentBlock {
    pub code: u8,
    pub label: String,
    pub message_prefix: String,
    pub candidate_prefix: String,
}

impl TreatmentBlock {
    fn prefix(&self, group: ItemGroup) -> &str {
        match group {
            ItemGroup::Message => &self.message_prefix,
            ItemGroup::Candidate => &self.candidate_prefix,
        }
    }

    /// Semantic name of this block's copy of `item`, e.g. `Q21_cand1_strong`.
    pub fn column(&self, item: &BlockItem) -> String {
        format!("{}_{}", self.prefix(item.group), item.name)
    }

    /// Raw export name of this block's copy of `item`, e.g. `Q21_1`.
    pub fn raw_column(&self, item: &BlockItem) -> String {
        format!("{}_{}", self.prefix(item.group), item.raw_code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionColumns {
    pub code: String,
    pub label: String,
    pub non_test_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumns {
    pub full: Vec<String>,
    pub filtered: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub id_column: String,
    #[serde(default)]
    pub drop: Vec<String>,
    pub renames: Vec<ColumnRename>,
    pub recodes: Vec<RecodeRule>,
    pub condition: ConditionColumns,
    pub blocks: Vec<TreatmentBlock>,
    pub items: Vec<BlockItem>,
    pub outputs: OutputColumns,
}

impl Manifest {
    pub fn builtin() -> Self {
        let renames = DEMOGRAPHICS
            .iter()
            .map(|(raw, name)| (*raw, *name))
            .chain(SDO_ITEMS.iter().map(|(raw, name, _)| (*raw, *name)))
            .chain(POLITICAL_ITEMS.iter().map(|(raw, name, _)| (*raw, *name)))
            .map(|(raw, name)| ColumnRename {
                raw: raw.to_string(),
                name: name.to_string(),
            })
            .collect();
        let recodes = SDO_ITEMS
            .iter()
            .chain(POLITICAL_ITEMS)
            .map(|(_, name, scale)| RecodeRule {
                column: name.to_string(),
                scale: *scale,
            })
            .collect();
        let blocks: Vec<TreatmentBlock> = BLOCKS
            .iter()
            .enumerate()
            .map(|(idx, (message, candidate, label))| TreatmentBlock {
                code: idx as u8 + 1,
                label: label.to_string(),
                message_prefix: message.to_string(),
                candidate_prefix: candidate.to_string(),
            })
            .collect();
        let items: Vec<BlockItem> = BLOCK_ITEMS
            .iter()
            .map(|(name, raw_code, group, scale)| BlockItem {
                name: name.to_string(),
                raw_code: *raw_code,
                group: *group,
                scale: *scale,
            })
            .collect();
        let condition = ConditionColumns {
            code: "EXP_Cond".to_string(),
            label: "EXP_Cond_HR".to_string(),
            non_test_label: "NonTest".to_string(),
        };

        let mut filtered = vec!["ResponseId".to_string()];
        filtered.extend(DEMOGRAPHICS.iter().map(|(_, name)| name.to_string()));
        filtered.push(condition.code.clone());
        filtered.push(condition.label.clone());
        filtered.extend(SDO_ITEMS.iter().map(|(_, name, _)| name.to_string()));
        filtered.extend(POLITICAL_ITEMS.iter().map(|(_, name, _)| name.to_string()));
        filtered.extend(MERGED_OUTPUT_ORDER.iter().map(|name| name.to_string()));
        let mut full = filtered.clone();
        for block in &blocks {
            full.extend(items.iter().map(|item| block.column(item)));
        }

        Manifest {
            id_column: "ResponseId".to_string(),
            drop: ADMIN_COLUMNS.iter().map(|c| c.to_string()).collect(),
            renames,
            recodes,
            condition,
            blocks,
            items,
            outputs: OutputColumns { full, filtered },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening manifest {path:?}"))?;
        let manifest: Manifest = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing manifest {path:?}"))?;
        manifest
            .validate()
            .with_context(|| format!("Validating manifest {path:?}"))?;
        Ok(manifest)
    }

    /// Loads `path` when given, otherwise the compiled-in layout.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing manifest to YAML")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml()?;
        let mut file =
            File::create(path).with_context(|| format!("Creating manifest file {path:?}"))?;
        file.write_all(yaml.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SurveyError> {
        let invalid =
            |msg: String| -> Result<(), SurveyError> { Err(SurveyError::InvalidManifest(msg)) };
        if self.id_column.trim().is_empty() {
            return invalid("id_column must not be empty".into());
        }
        if self.blocks.is_empty() {
            return invalid("at least one treatment block is required".into());
        }
        if self.items.is_empty() {
            return invalid("at least one block item is required".into());
        }
        for (idx, block) in self.blocks.iter().enumerate() {
            if usize::from(block.code) != idx + 1 {
                return invalid(format!(
                    "block '{}' has code {} but is declared at position {}",
                    block.label,
                    block.code,
                    idx + 1
                ));
            }
        }
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.name.as_str()) {
                return invalid(format!("item '{}' is declared twice", item.name));
            }
        }
        let mut seen = HashSet::new();
        for rename in self.all_renames() {
            if !seen.insert(rename.raw.clone()) {
                return invalid(format!("raw column '{}' is renamed twice", rename.raw));
            }
        }
        let mut seen = HashSet::new();
        for column in &self.outputs.full {
            if !seen.insert(column.as_str()) {
                return invalid(format!("output column '{column}' is listed twice"));
            }
        }
        if let Some(extra) = self
            .outputs
            .filtered
            .iter()
            .find(|column| !seen.contains(column.as_str()))
        {
            return invalid(format!(
                "filtered output column '{extra}' is not part of the full output"
            ));
        }
        Ok(())
    }

    /// Static renames followed by the renames of every block column.
    pub fn all_renames(&self) -> Vec<ColumnRename> {
        let mut renames = self.renames.clone();
        for block in &self.blocks {
            renames.extend(self.items.iter().map(|item| ColumnRename {
                raw: block.raw_column(item),
                name: block.column(item),
            }));
        }
        renames
    }

    /// Static recode rules followed by one rule per block column.
    pub fn all_recodes(&self) -> Vec<RecodeRule> {
        let mut recodes = self.recodes.clone();
        for block in &self.blocks {
            recodes.extend(self.items.iter().map(|item| RecodeRule {
                column: block.column(item),
                scale: item.scale,
            }));
        }
        recodes
    }

    /// Columns the input must carry before anything else runs.
    pub fn required_raw_columns(&self) -> Vec<String> {
        let mut required = vec![self.id_column.clone()];
        required.extend(self.all_renames().into_iter().map(|r| r.raw));
        required
    }

    pub fn block_columns(&self, block: &TreatmentBlock) -> Vec<String> {
        self.items.iter().map(|item| block.column(item)).collect()
    }

    pub fn label_for(&self, code: u8) -> &str {
        self.blocks
            .iter()
            .find(|block| block.code == code)
            .map(|block| block.label.as_str())
            .unwrap_or(self.condition.non_test_label.as_str())
    }
}
