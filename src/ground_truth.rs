//! Ground-truth XML parser.
//!
//! Expected layout:
//!
//! ```text
//! <SplittedResult>
//!   <ParentComId/> <Owner/> <User/> <FilePath/>
//!   <SplittedDocs>
//!     <SplitDoc>
//!       <DocType/> <PrimaryNum/> <FilingDocTypeCode/> <FilingDocTypeName/> <ProcessedFile/>
//!       <Pages>
//!         <Page><PageNum/><Rotate/></Page>
//!       </Pages>
//!     </SplitDoc>
//!   </SplittedDocs>
//! </SplittedResult>
//! ```
//!
//! Every field is optional. Missing numbers default to `0`.

use crate::error::{Result, SplitCheckError};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub page_num: i64,
    /// Degrees. Parsed but never scored.
    #[serde(default)]
    pub rotate: i32,
}

/// One expected sub-document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedDoc {
    pub doc_type: String,
    #[serde(default)]
    pub primary_num: Option<String>,
    pub pages: Vec<PageEntry>,
    #[serde(default)]
    pub filing_doc_type_code: Option<String>,
    #[serde(default)]
    pub filing_doc_type_name: Option<String>,
    #[serde(default)]
    pub processed_file: Option<String>,
}

impl ExpectedDoc {
    /// Number of page entries, duplicates included.
    pub fn page_count(&self) -> u64 {
        self.pages.len() as u64
    }

    /// Page numbers in ascending order, duplicates kept.
    pub fn sorted_page_numbers(&self) -> Vec<i64> {
        let mut nums: Vec<i64> = self.pages.iter().map(|p| p.page_num).collect();
        nums.sort_unstable();
        nums
    }

    /// Accepts either the primary type label or the filing type code.
    pub fn matches_type(&self, actual: &str) -> bool {
        actual == self.doc_type || self.filing_doc_type_code.as_deref() == Some(actual)
    }
}

/// A fully parsed ground-truth artifact. Document order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedResultSet {
    #[serde(default)]
    pub parent_com_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    pub split_docs: Vec<ExpectedDoc>,
}

/// Reads and parses a ground-truth file.
///
/// # Errors
///
/// - `SplitCheckError::NotFound` if `path` does not exist
/// - `SplitCheckError::MalformedInput` if the content is not well-formed
pub fn parse_ground_truth_file(path: &Path) -> Result<ExpectedResultSet> {
    if !path.exists() {
        return Err(SplitCheckError::NotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    parse_ground_truth_bytes(&bytes)
}

/// Decodes by BOM, then by the `encoding` pseudo-attribute of the XML
/// declaration, falling back to UTF-8.
pub fn parse_ground_truth_bytes(bytes: &[u8]) -> Result<ExpectedResultSet> {
    let xml = decode_xml(bytes)?;
    parse_ground_truth_str(&xml)
}

fn decode_xml(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((enc, bom_len)) => (enc, &bytes[bom_len..]),
        None => match declared_encoding(bytes) {
            Some(label) => {
                let enc = Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                    SplitCheckError::MalformedInput(format!("unsupported encoding: {label}"))
                })?;
                // A readable ASCII declaration rules out UTF-16 without a BOM.
                if enc == UTF_16LE || enc == UTF_16BE {
                    (UTF_8, bytes)
                } else {
                    (enc, bytes)
                }
            }
            None => (UTF_8, bytes),
        },
    };

    debug!(encoding = encoding.name(), "decoding ground truth");
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            SplitCheckError::MalformedInput(format!("invalid {} byte sequence", encoding.name()))
        })
}

/// Reads `encoding="..."` from a leading `<?xml ... ?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let rest = bytes.strip_prefix(b"<?xml")?;
    let end = rest.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&rest[..end]).ok()?;
    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    Some(value[..value.find(quote)?].to_string())
}

pub fn parse_ground_truth_str(xml: &str) -> Result<ExpectedResultSet> {
    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(xml, opts)
        .map_err(|e| SplitCheckError::MalformedInput(format!("XML parse error: {e}")))?;
    let root = doc.root_element();

    let mut split_docs = Vec::new();
    if let Some(container) = child(&root, "SplittedDocs") {
        for elem in children(&container, "SplitDoc") {
            split_docs.push(parse_split_doc(&elem)?);
        }
    }

    debug!(docs = split_docs.len(), "parsed ground truth");

    Ok(ExpectedResultSet {
        parent_com_id: child_text(&root, "ParentComId"),
        owner: child_text(&root, "Owner"),
        user: child_text(&root, "User"),
        file_path: child_text(&root, "FilePath"),
        split_docs,
    })
}

fn parse_split_doc(elem: &roxmltree::Node) -> Result<ExpectedDoc> {
    let mut pages = Vec::new();
    if let Some(container) = child(elem, "Pages") {
        for page in children(&container, "Page") {
            pages.push(PageEntry {
                page_num: child_int(&page, "PageNum")?,
                rotate: child_int(&page, "Rotate")?,
            });
        }
    }

    Ok(ExpectedDoc {
        doc_type: child_text(elem, "DocType").unwrap_or_default(),
        primary_num: child_text(elem, "PrimaryNum"),
        pages,
        filing_doc_type_code: child_text(elem, "FilingDocTypeCode"),
        filing_doc_type_name: child_text(elem, "FilingDocTypeName"),
        processed_file: child_text(elem, "ProcessedFile"),
    })
}

fn child<'a, 'input>(
    parent: &roxmltree::Node<'a, 'input>,
    tag: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

fn children<'a, 'input: 'a>(
    parent: &roxmltree::Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    parent
        .children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

/// Text before the first child element, comments skipped.
/// Present-but-empty elements yield `Some("")`.
fn child_text(parent: &roxmltree::Node, tag: &str) -> Option<String> {
    child(parent, tag).map(|n| {
        n.children()
            .take_while(|c| !c.is_element())
            .filter(|c| c.is_text())
            .filter_map(|c| c.text())
            .collect::<String>()
    })
}

fn child_int<T>(parent: &roxmltree::Node, tag: &str) -> Result<T>
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    let Some(raw) = child_text(parent, tag) else {
        return Ok(T::default());
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse::<T>()
        .map_err(|e| SplitCheckError::MalformedInput(format!("{tag}: {raw:?}: {e}")))
}
