//! Core types and request screening logic for the search gate.

pub mod classify;
pub mod credential;
pub mod error;
pub mod msearch;

pub use classify::{classify, strip_path_prefix, RequestShape};
pub use credential::{basic_credentials, AccessKey};
pub use error::{DenialCode, Error, Result};
pub use msearch::{tenant_of, IndexReference, SearchHeader};
