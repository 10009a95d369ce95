//! Upstream forwarder for allowed requests.
//!
//! Relays method, path (prefix stripped), query, headers, and the original
//! body bytes to the configured upstream, and relays the upstream response
//! back. The gate middleware has already authorized anything that reaches
//! this handler.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gate_core::strip_path_prefix;
use tracing::{debug, error};

use crate::response::ErrorResponse;
use crate::state::AppState;

/// Headers that must not be relayed in either direction.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub async fn forward(State(state): State<AppState>, request: Request) -> Response {
    match relay(&state, request).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "Upstream relay failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new(err, "UpstreamError")),
            )
                .into_response()
        }
    }
}

async fn relay(state: &AppState, request: Request) -> Result<Response, String> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| e.to_string())?;

    let path = strip_path_prefix(parts.uri.path(), &state.path_prefix);
    let mut url = format!("{}://{}{}", state.upstream.scheme, state.upstream.host, path);
    if let Some(query) = parts.uri.query() {
        url.push('?');
        url.push_str(query);
    }

    debug!(method = %parts.method, url = %url, "Forwarding upstream");

    let mut headers = parts.headers.clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    for name in HOP_BY_HOP {
        headers.remove(name);
    }

    let upstream = state
        .http_client
        .request(parts.method, url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = upstream.status();
    let mut builder = Response::builder().status(status);
    for (name, value) in upstream.headers() {
        let skip = HOP_BY_HOP.contains(&name.as_str()) || name == &header::CONTENT_LENGTH;
        if !skip {
            builder = builder.header(name, value);
        }
    }

    let bytes = upstream.bytes().await.map_err(|e| e.to_string())?;
    builder.body(Body::from(bytes)).map_err(|e| e.to_string())
}
