mod common;

use common::SurveyExport;
use survey_prep::{
    data::Value,
    error::SurveyError,
    frame::SurveyFrame,
    manifest::Manifest,
    pipeline::{run_pipeline, transform},
};

fn frame_from(export: &SurveyExport) -> SurveyFrame {
    SurveyFrame::from_records(export.headers().to_vec(), export.records()).expect("frame")
}

fn projected<'a>(headers: &[String], row: &'a [String], column: &str) -> &'a str {
    common::cell(headers, row, column)
}

#[test]
fn candidate_answer_in_first_block_sets_condition_one() {
    let export = SurveyExport::new().respondent("R_1", &[("Q21_1", "Strongly Agree")]);
    let mut frame = frame_from(&export);
    let manifest = Manifest::builtin();
    transform(&mut frame, &manifest).expect("transform");

    assert_eq!(frame.value(0, "EXP_Cond"), Some(&Value::Ordinal(1)));
    assert_eq!(
        frame.value(0, "EXP_Cond_HR"),
        Some(&Value::Text("HE-CivilPositive".to_string()))
    );
    assert_eq!(frame.value(0, "cand1_strong"), Some(&Value::Ordinal(7)));
}

#[test]
fn respondent_without_block_answers_is_non_test() {
    let export = SurveyExport::new().respondent(
        "R_2",
        &[("Q11", "34"), ("SDO_Q5_1", "Agree")],
    );
    let mut frame = frame_from(&export);
    let manifest = Manifest::builtin();
    transform(&mut frame, &manifest).expect("transform");

    assert_eq!(frame.value(0, "EXP_Cond"), Some(&Value::Ordinal(0)));
    assert_eq!(
        frame.value(0, "EXP_Cond_HR"),
        Some(&Value::Text("NonTest".to_string()))
    );
    for item in &manifest.items {
        assert_eq!(frame.value(0, &item.name), None, "{}", item.name);
    }
}

#[test]
fn sdo_polarity_follows_item_direction() {
    let export = SurveyExport::new().respondent(
        "R_3",
        &[("SDO_Q5_2", "Strongly Agree"), ("SDO_Q5_1", "Strongly Agree")],
    );
    let mut frame = frame_from(&export);
    transform(&mut frame, &Manifest::builtin()).expect("transform");

    assert_eq!(frame.value(0, "sdo2_Con_Trait_Dom1"), Some(&Value::Ordinal(1)));
    assert_eq!(frame.value(0, "sdo1_Pro_Trait_Dom1"), Some(&Value::Ordinal(7)));
}

#[test]
fn all_no_response_block_counts_as_unoccupied() {
    let export = SurveyExport::new().respondent(
        "R_4",
        &[("Q40_13", "NO RESPONSE"), ("Q41_4", "NO RESPONSE")],
    );
    let mut frame = frame_from(&export);
    let report = transform(&mut frame, &Manifest::builtin()).expect("transform");

    assert_eq!(frame.value(0, "EXP_Cond"), Some(&Value::Ordinal(0)));
    assert_eq!(report.recode.no_response_cells, 2);
    assert_eq!(report.recode.unrecognized_total(), 0);
}

#[test]
fn political_items_use_their_own_tables() {
    let export = SurveyExport::new().respondent(
        "R_5",
        &[
            ("Political_Views_Q6_3", "Very Conservative"),
            ("Public_Trust_Q7_6", "Slightly Agree"),
            ("Q8_13", "Highest Interest (4)"),
            ("Q9_13", "Will definitely NOT vote (1)"),
        ],
    );
    let mut frame = frame_from(&export);
    transform(&mut frame, &Manifest::builtin()).expect("transform");

    assert_eq!(frame.value(0, "ideol3_self"), Some(&Value::Ordinal(7)));
    assert_eq!(frame.value(0, "trust6_nocare"), Some(&Value::Ordinal(5)));
    assert_eq!(frame.value(0, "pol_interest"), Some(&Value::Ordinal(4)));
    assert_eq!(frame.value(0, "pol_vote"), Some(&Value::Ordinal(1)));
}

#[test]
fn multi_block_respondent_keeps_first_block_and_is_reported() {
    let export = SurveyExport::new()
        .respondent("R_6", &[("Q31_15", "Agree"), ("Q61_15", "Disagree")])
        .respondent("R_7", &[("Q51_6", "Strongly Agree")]);
    let mut frame = frame_from(&export);
    let report = transform(&mut frame, &Manifest::builtin()).expect("transform");

    assert_eq!(frame.value(0, "EXP_Cond"), Some(&Value::Ordinal(2)));
    assert_eq!(frame.value(0, "cand15_votefor"), Some(&Value::Ordinal(6)));
    assert_eq!(report.conditions.conflicts, 1);
    assert_eq!(report.conditions.conflict_ids, vec!["R_6".to_string()]);

    assert_eq!(frame.value(1, "EXP_Cond"), Some(&Value::Ordinal(4)));
    // cand6_weak is reverse-coded.
    assert_eq!(frame.value(1, "cand6_weak"), Some(&Value::Ordinal(1)));
}

#[test]
fn conflicting_respondent_merges_only_the_classified_block() {
    let export = SurveyExport::new().respondent(
        "R_8",
        &[("Q20_14", "Agree"), ("Q41_1", "Strongly Agree")],
    );
    let mut frame = frame_from(&export);
    let report = transform(&mut frame, &Manifest::builtin()).expect("transform");

    assert_eq!(frame.value(0, "EXP_Cond"), Some(&Value::Ordinal(1)));
    assert_eq!(frame.value(0, "mess14_imprtnt"), Some(&Value::Ordinal(3)));
    assert_eq!(frame.value(0, "Q21_cand1_strong"), None);
    assert_eq!(frame.value(0, "Q41_cand1_strong"), Some(&Value::Ordinal(7)));
    assert_eq!(frame.value(0, "cand1_strong"), None);
    assert_eq!(report.conditions.conflicts, 1);
}

#[test]
fn projections_keep_row_order_and_manifest_columns() {
    let export = SurveyExport::new()
        .respondent("R_a", &[("Q70_15", "Agree"), ("Q12", "Asian")])
        .respondent("R_b", &[])
        .respondent("R_c", &[("Q20_14", "Strongly Disagree")]);
    let manifest = Manifest::builtin();
    let output = run_pipeline(frame_from(&export), &manifest).expect("pipeline");

    assert_eq!(output.full.headers, manifest.outputs.full);
    assert_eq!(output.filtered.headers, manifest.outputs.filtered);
    assert_eq!(output.full.row_count(), 3);
    assert_eq!(output.filtered.row_count(), 3);

    let headers = &output.filtered.headers;
    let ids = output
        .filtered
        .rows
        .iter()
        .map(|row| projected(headers, row, "ResponseId").to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["R_a", "R_b", "R_c"]);

    let first = &output.filtered.rows[0];
    assert_eq!(projected(headers, first, "EXP_Cond"), "6");
    assert_eq!(projected(headers, first, "EXP_Cond_HR"), "HA-Uncivil");
    assert_eq!(projected(headers, first, "mess15_inform"), "3");
    assert_eq!(projected(headers, first, "Ethnicity"), "Asian");

    let full_headers = &output.full.headers;
    let full_first = &output.full.rows[0];
    assert_eq!(projected(full_headers, full_first, "Q70_mess15_inform"), "3");
    assert_eq!(projected(full_headers, full_first, "Q20_mess15_inform"), "");

    let last = &output.filtered.rows[2];
    assert_eq!(projected(headers, last, "EXP_Cond"), "1");
    assert_eq!(projected(headers, last, "mess14_imprtnt"), "1");
}

#[test]
fn missing_raw_columns_are_named_in_the_error() {
    let export = SurveyExport::new()
        .without_column("Q9_13")
        .without_column("Q61_3")
        .respondent("R_1", &[]);
    let err = run_pipeline(frame_from(&export), &Manifest::builtin()).unwrap_err();
    let survey_err = err.downcast_ref::<SurveyError>().expect("survey error");
    assert_eq!(
        survey_err,
        &SurveyError::MissingColumns {
            columns: vec!["Q9_13".to_string(), "Q61_3".to_string()]
        }
    );
}
