//! Actual split results as reported by the upstream splitter.

use crate::error::{Result, SplitCheckError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One produced sub-document. Untrusted: `page_count` and `page_numbers`
/// are never cross-checked against each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualDoc {
    #[serde(default)]
    pub doc_type: String,
    #[serde(default)]
    pub page_count: u64,
    #[serde(default)]
    pub page_numbers: Vec<i64>,
}

impl ActualDoc {
    pub fn new(doc_type: impl Into<String>, page_count: u64, page_numbers: Vec<i64>) -> Self {
        Self {
            doc_type: doc_type.into(),
            page_count,
            page_numbers,
        }
    }
}

/// Validation request body: the target ground truth plus the actual split.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitRequest {
    #[serde(default)]
    pub xml_file_id: Option<String>,
    #[serde(default)]
    pub split_docs: Vec<ActualDoc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActualInput {
    List(Vec<ActualDoc>),
    Request(SplitRequest),
}

/// Accepts either a bare JSON array of documents or a `SplitRequest` object.
pub fn parse_actual_json(raw: &str) -> Result<SplitRequest> {
    let input: ActualInput = serde_json::from_str(raw)
        .map_err(|e| SplitCheckError::MalformedInput(format!("actual results: {e}")))?;
    Ok(match input {
        ActualInput::List(split_docs) => SplitRequest {
            xml_file_id: None,
            split_docs,
        },
        ActualInput::Request(req) => req,
    })
}

pub fn load_actual(path: &Path) -> Result<SplitRequest> {
    if !path.exists() {
        return Err(SplitCheckError::NotFound(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    parse_actual_json(&raw)
}
