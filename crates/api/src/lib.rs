//! HTTP layer for the search gate.

pub mod gate;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, Authorizer};
