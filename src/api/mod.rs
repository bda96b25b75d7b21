//! API module
//!
//! HTTP layer: routes, request/response types.

pub mod routes;

pub use routes::{router, AppState};
