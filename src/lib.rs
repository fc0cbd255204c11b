//! Quiz backend library: question store, answer scoring, admin auth and the HTTP router.
//!
//! The binary in `main.rs` wires these together; integration tests drive
//! `routes::build_router` directly.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod protocol;
pub mod routes;
pub mod scorer;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;
