use crate::{
    actual::ActualDoc,
    ground_truth::{ExpectedDoc, ExpectedResultSet},
    report::{DocDetails, DocValidationResult, OverallValidationResult, ScoreComponents, ValidationSummary},
};
use tracing::{debug, info};

// Weights in tenths so every reachable score is an exact decimal.
const TYPE_WEIGHT: u32 = 4;
const PAGE_COUNT_WEIGHT: u32 = 3;
const PAGE_NUMBERS_WEIGHT: u32 = 3;

/// Applied once to the mean whenever document counts differ.
pub const COUNT_MISMATCH_PENALTY: f64 = 0.8;

/// Compares one expected document with the actual document at the same position.
pub fn validate_doc(expected: &ExpectedDoc, actual: &ActualDoc, doc_index: usize) -> DocValidationResult {
    let doc_type_match = expected.matches_type(&actual.doc_type);

    let expected_page_count = expected.page_count();
    let page_count_match = expected_page_count == actual.page_count;

    let expected_page_numbers = expected.sorted_page_numbers();
    let mut actual_page_numbers = actual.page_numbers.clone();
    actual_page_numbers.sort_unstable();
    let page_numbers_match = expected_page_numbers == actual_page_numbers;

    let tenths = weight(doc_type_match, TYPE_WEIGHT)
        + weight(page_count_match, PAGE_COUNT_WEIGHT)
        + weight(page_numbers_match, PAGE_NUMBERS_WEIGHT);
    let score = f64::from(tenths) / 10.0;

    DocValidationResult {
        doc_index,
        doc_type_match,
        page_count_match,
        page_numbers_match,
        score,
        details: DocDetails {
            expected_doc_type: expected.doc_type.clone(),
            expected_filing_doc_type_code: expected.filing_doc_type_code.clone(),
            actual_doc_type: actual.doc_type.clone(),
            expected_page_count,
            actual_page_count: actual.page_count,
            expected_page_numbers,
            actual_page_numbers,
            score_components: ScoreComponents {
                doc_type: indicator(doc_type_match),
                page_count: indicator(page_count_match),
                page_numbers: indicator(page_numbers_match),
            },
        },
    }
}

/// Scores an actual split against the ground truth, aligning documents by position.
///
/// Only the common prefix is compared; extra or missing documents show up
/// through `count_match` and the flat count-mismatch penalty.
pub fn validate_split(expected: &ExpectedResultSet, actual: &[ActualDoc]) -> OverallValidationResult {
    let expected_count = expected.split_docs.len();
    let actual_count = actual.len();
    let count_match = expected_count == actual_count;

    let doc_results: Vec<DocValidationResult> = expected
        .split_docs
        .iter()
        .zip(actual)
        .enumerate()
        .map(|(i, (exp, act))| validate_doc(exp, act, i))
        .collect();

    for r in &doc_results {
        debug!(
            doc = r.doc_index,
            score = r.score,
            type_match = r.doc_type_match,
            count_match = r.page_count_match,
            numbers_match = r.page_numbers_match,
            "document scored"
        );
    }

    let overall_score = if doc_results.is_empty() {
        0.0
    } else {
        let mean = doc_results.iter().map(|r| r.score).sum::<f64>() / doc_results.len() as f64;
        if count_match {
            mean
        } else {
            mean * COUNT_MISMATCH_PENALTY
        }
    };

    let summary = ValidationSummary {
        expected_doc_count: expected_count,
        actual_doc_count: actual_count,
        count_match,
        all_docs_valid: count_match && doc_results.iter().all(|r| r.score == 1.0),
        avg_doc_type_match: rate(&doc_results, |r| r.doc_type_match),
        avg_page_count_match: rate(&doc_results, |r| r.page_count_match),
        avg_page_numbers_match: rate(&doc_results, |r| r.page_numbers_match),
    };

    info!(
        expected = expected_count,
        actual = actual_count,
        validated = doc_results.len(),
        overall_score,
        all_docs_valid = summary.all_docs_valid,
        "split validated"
    );

    OverallValidationResult {
        total_docs: expected_count,
        validated_docs: doc_results.len(),
        overall_score,
        doc_results,
        summary,
    }
}

fn weight(hit: bool, w: u32) -> u32 {
    if hit { w } else { 0 }
}

fn indicator(hit: bool) -> f64 {
    if hit { 1.0 } else { 0.0 }
}

fn rate(results: &[DocValidationResult], pred: impl Fn(&DocValidationResult) -> bool) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().filter(|&r| pred(r)).count() as f64 / results.len() as f64
}
