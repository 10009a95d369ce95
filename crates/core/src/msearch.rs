//! Structural parsing of `_msearch` request bodies.
//!
//! An msearch body is newline-delimited JSON: header lines name the target
//! index (a single string or an array of strings), query lines carry no
//! top-level `index` field and are skipped. Parsing is a tolerant structured
//! decode rather than pattern sniffing; a line that declares an index but does
//! not decode is a fatal, fail-closed error for the whole request.

use serde::Deserialize;

/// The decoded `index` field of an msearch header line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IndexReference {
    /// `"index": "tenant-logs"`
    Single(String),
    /// `"index": ["a-1", "b-2"]`
    Multiple(Vec<String>),
}

/// One NDJSON body line, decoded against the optional `index` field.
#[derive(Debug, Deserialize)]
pub struct SearchHeader {
    #[serde(default)]
    pub index: Option<IndexReference>,
}

impl SearchHeader {
    /// Decode a single body line.
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Derive the tenant identifier from an index name: the non-empty portion
/// before the first hyphen.
pub fn tenant_of(index: &str) -> Option<&str> {
    match index.split_once('-') {
        Some(("", _)) => None,
        Some((tenant, _)) => Some(tenant),
        None => None,
    }
}
