//! The authorization decision engine, mounted as middleware in front of the
//! upstream forwarder.
//!
//! Each request is screened in one pass: credentials, then shape, then a
//! permission check per referenced account. Any uncertainty denies the
//! request; an allowance writes nothing and hands the request (body restored
//! byte-identical) to the inner handler.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use gate_core::{
    basic_credentials, classify, strip_path_prefix, tenant_of, AccessKey, DenialCode, Error,
    IndexReference, RequestShape, SearchHeader,
};
use tracing::{info, warn};

use crate::response::Denial;
use crate::state::AppState;

pub async fn authorize_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    match screen(&state, request).await {
        Ok(request) => next.run(request).await,
        Err(denial) => denial.into_response(),
    }
}

/// Screen one request. Returns the request (with its body intact) when the
/// presented key is authorized for every account the request implies.
async fn screen(state: &AppState, request: Request) -> Result<Request, Denial> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let key = match basic_credentials(auth_header) {
        Ok(key) => key,
        Err(err) => {
            info!("Request without access key credentials denied");
            return Err(Denial::new(DenialCode::Unauthorized, err.to_string()));
        }
    };

    let path = strip_path_prefix(request.uri().path(), &state.path_prefix).to_string();

    match classify(request.method().as_str(), &path) {
        RequestShape::Mapping { resource } => {
            screen_mapping(state, &key, &resource, &path).await?;
            Ok(request)
        }
        RequestShape::BatchSearch => {
            let (parts, body) = request.into_parts();
            let bytes = to_bytes(body, usize::MAX)
                .await
                .map_err(|err| Denial::new(DenialCode::MsearchBody, err.to_string()))?;

            screen_msearch(state, &key, &bytes).await?;

            // Restore the body so the forwarder sees the original bytes.
            Ok(Request::from_parts(parts, Body::from(bytes)))
        }
        RequestShape::Disallowed(code) => {
            info!(
                method = %request.method(),
                path = %path,
                code = code.as_str(),
                "Request shape denied"
            );
            Err(Denial::new(code, path))
        }
    }
}

async fn screen_mapping(
    state: &AppState,
    key: &AccessKey,
    resource: &str,
    path: &str,
) -> Result<(), Denial> {
    let Some(account) = tenant_of(resource) else {
        warn!(path = %path, "Mapping path without account prefix");
        return Err(Denial::new(DenialCode::NonMappingGet, path));
    };

    info!(account = %account, key_name = %key.name, "Mapping request");

    match state.authorizer.authorize(account, key).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            info!(account = %account, key_name = %key.name, "Mapping request denied");
            Err(Denial::new(
                DenialCode::Unauthorized,
                format!("access key not authorized for account {account}"),
            ))
        }
        Err(err) => Err(lookup_denial(account, key, err)),
    }
}

/// Screen an msearch body line by line.
///
/// A single-reference line that checks out admits the whole batch without
/// evaluating later lines; a multi-reference line requires every element and
/// aborts on the first that fails. The asymmetry is the contracted behavior
/// of the gate, not an accident of this implementation.
async fn screen_msearch(state: &AppState, key: &AccessKey, body: &[u8]) -> Result<(), Denial> {
    let text = std::str::from_utf8(body)
        .map_err(|err| Denial::new(DenialCode::MsearchBody, err.to_string()))?;

    let mut referenced = false;
    let mut granted = false;

    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let header = SearchHeader::parse(line).map_err(|err| {
            warn!(line = number + 1, key_name = %key.name, "Unparseable msearch line");
            Denial::new(
                DenialCode::MsearchIndexLine,
                format!("line {}: {err}", number + 1),
            )
        })?;

        match header.index {
            None => continue,
            Some(IndexReference::Single(index)) => {
                referenced = true;
                let account = account_for(&index, number, key)?;
                match state.authorizer.authorize(account, key).await {
                    Ok(true) => return Ok(()),
                    Ok(false) => {}
                    Err(err) => return Err(lookup_denial(account, key, err)),
                }
            }
            Some(IndexReference::Multiple(indexes)) => {
                referenced = true;
                for index in &indexes {
                    let account = account_for(index, number, key)?;
                    match state.authorizer.authorize(account, key).await {
                        Ok(true) => granted = true,
                        Ok(false) => {
                            info!(account = %account, key_name = %key.name, "Index denied");
                            return Err(Denial::new(DenialCode::UnauthorizedIndex, account));
                        }
                        Err(err) => return Err(lookup_denial(account, key, err)),
                    }
                }
            }
        }
    }

    if referenced && !granted {
        info!(key_name = %key.name, "No authorized index reference in batch");
        return Err(Denial::new(
            DenialCode::Unauthorized,
            "no authorized index reference in request body",
        ));
    }

    Ok(())
}

fn account_for<'a>(index: &'a str, line: usize, key: &AccessKey) -> Result<&'a str, Denial> {
    tenant_of(index).ok_or_else(|| {
        warn!(index = %index, key_name = %key.name, "Index without account prefix");
        Denial::new(
            DenialCode::MsearchIndexLine,
            format!("line {}: index {index:?} has no account prefix", line + 1),
        )
    })
}

fn lookup_denial(account: &str, key: &AccessKey, err: Error) -> Denial {
    warn!(account = %account, key_name = %key.name, error = %err, "Account lookup failed");
    Denial::new(DenialCode::AccountLookup, err.to_string())
}
