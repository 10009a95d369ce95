//! Request shape classification.
//!
//! The gate fronts the Grafana Elasticsearch datasource, which makes exactly
//! two kinds of calls: GET `/{index}/_mapping` and POST `/_msearch`. Everything
//! else is denied; the policy is allow-list only, never block-list.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DenialCode;

/// Compiled mapping-path pattern (lazy initialization).
static MAPPING_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([^/]+)/_mapping$").expect("invalid mapping path pattern"));

/// One of the two permitted request shapes, or a denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestShape {
    /// GET `/{resource}/_mapping`, carrying the raw tenant-resource segment.
    Mapping { resource: String },
    /// POST `/_msearch`, a batched multi-query read.
    BatchSearch,
    /// Everything else, with the code naming the rejection.
    Disallowed(DenialCode),
}

/// Classify a request by method and prefix-stripped path.
pub fn classify(method: &str, path: &str) -> RequestShape {
    match method {
        "GET" => match MAPPING_PATH.captures(path) {
            Some(caps) => RequestShape::Mapping {
                resource: caps[1].to_string(),
            },
            None => RequestShape::Disallowed(DenialCode::NonMappingGet),
        },
        "POST" if path == "/_msearch" => RequestShape::BatchSearch,
        "POST" => RequestShape::Disallowed(DenialCode::NonMsearchPost),
        // PUT / DELETE / anything else: never let other operations through.
        _ => RequestShape::Disallowed(DenialCode::UnauthorizedRequest),
    }
}

/// Strip the configured proxy prefix from a path, if present.
pub fn strip_path_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }
    path.strip_prefix(prefix).unwrap_or(path)
}
