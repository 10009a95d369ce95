//! Unified error types for the search gate.
//!
//! Every denial carries one of the `DenialCode` wire codes; the gate is
//! allow-list only, so every code maps to a 401.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Wire-level denial codes attached to abort responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialCode {
    /// Missing credentials, or credentials that grant access to nothing.
    Unauthorized,
    /// GET request that is not an index `_mapping` read.
    NonMappingGet,
    /// POST request that is not `/_msearch`.
    NonMsearchPost,
    /// The msearch body could not be read or is not valid UTF-8.
    MsearchBody,
    /// An msearch body line with an index reference failed to parse.
    MsearchIndexLine,
    /// The provision service could not answer a key check.
    AccountLookup,
    /// A referenced index belongs to an account the key cannot access.
    UnauthorizedIndex,
    /// Any request shape outside the GET/POST allow-list.
    UnauthorizedRequest,
}

impl DenialCode {
    /// Get the wire code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::NonMappingGet => "NonMappingGetRequest",
            Self::NonMsearchPost => "NonMsearchPostRequest",
            Self::MsearchBody => "MsearchPostBodyError",
            Self::MsearchIndexLine => "MsearchPostBodyIdxLineError",
            Self::AccountLookup => "AccountLookupError",
            Self::UnauthorizedIndex => "UnauthorizedIndex",
            Self::UnauthorizedRequest => "UnauthorizedRequest",
        }
    }

    /// Get the HTTP status code. Denials are always 401.
    pub fn http_status(&self) -> u16 {
        401
    }
}

/// Unified error type for the search gate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("access requires BasicAuth with access key credentials")]
    MissingCredentials,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("provision service unreachable: {0}")]
    OracleUnreachable(String),

    #[error("provision service returned status {status} for account {account}")]
    OracleStatus { account: String, status: u16 },
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn oracle_unreachable(msg: impl Into<String>) -> Self {
        Self::OracleUnreachable(msg.into())
    }
}
