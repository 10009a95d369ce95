//! Routes: health probes plus the gated catch-all forwarder.

pub mod health;
pub mod proxy;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::gate;
use crate::state::AppState;

/// Creates the gate router.
///
/// Health probes are reachable without credentials; every other path falls
/// through to the forwarder behind the authorization middleware.
pub fn router(state: AppState) -> Router {
    let gated = Router::new()
        .fallback(proxy::forward)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::authorize_request,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health/live", get(health::live_handler))
        .route("/health/ready", get(health::ready_handler))
        .merge(gated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
