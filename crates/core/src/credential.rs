//! Access key credentials presented via HTTP Basic authentication.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name/secret credential pair for an account access key.
///
/// The pair is opaque to the gate; it is only forwarded to the provision
/// service for verification. Serializes to the provision wire format
/// `{"name": ..., "key": ...}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    /// Key name (Basic auth username).
    pub name: String,
    /// Key secret (Basic auth password). Never logged.
    pub key: String,
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("name", &self.name)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Parse an `Authorization: Basic` header into an [`AccessKey`].
///
/// Any defect (missing header, wrong scheme, bad base64, no `:` separator)
/// collapses into [`Error::MissingCredentials`]; the caller denies without
/// distinguishing why.
pub fn basic_credentials(header: Option<&str>) -> Result<AccessKey> {
    let header = header.ok_or(Error::MissingCredentials)?;

    let encoded = header
        .get(..6)
        .filter(|scheme| scheme.eq_ignore_ascii_case("basic "))
        .map(|_| header[6..].trim())
        .ok_or(Error::MissingCredentials)?;

    let decoded = BASE64
        .decode(encoded)
        .map_err(|_| Error::MissingCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| Error::MissingCredentials)?;

    let (name, key) = decoded.split_once(':').ok_or(Error::MissingCredentials)?;

    Ok(AccessKey {
        name: name.to_string(),
        key: key.to_string(),
    })
}
