//! Reference implementation of the employee REST contract.
//!
//! Keeps records in process memory only. Used for local development of the
//! console and as the far end of the end-to-end tests.

pub mod http;
pub mod store;

pub use http::{AppState, ServeConfig, build_router, serve, serve_listener};
pub use store::EmployeeStore;
