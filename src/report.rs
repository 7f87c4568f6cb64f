use serde::{Deserialize, Serialize};

/// Result of comparing one expected document to one actual document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocValidationResult {
    pub doc_index: usize,
    pub doc_type_match: bool,
    pub page_count_match: bool,
    pub page_numbers_match: bool,
    pub score: f64,
    pub details: DocDetails,
}

/// Raw values behind a comparison. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocDetails {
    pub expected_doc_type: String,
    pub expected_filing_doc_type_code: Option<String>,
    pub actual_doc_type: String,
    pub expected_page_count: u64,
    pub actual_page_count: u64,
    pub expected_page_numbers: Vec<i64>,
    pub actual_page_numbers: Vec<i64>,
    pub score_components: ScoreComponents,
}

/// Per-dimension contributions, each 0.0 or 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub doc_type: f64,
    pub page_count: f64,
    pub page_numbers: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub expected_doc_count: usize,
    pub actual_doc_count: usize,
    pub count_match: bool,
    pub all_docs_valid: bool,
    pub avg_doc_type_match: f64,
    pub avg_page_count_match: f64,
    pub avg_page_numbers_match: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallValidationResult {
    pub total_docs: usize,
    pub validated_docs: usize,
    pub overall_score: f64,
    pub doc_results: Vec<DocValidationResult>,
    pub summary: ValidationSummary,
}
