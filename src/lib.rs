//! OpsRamp template cloner library.
//!
//! Re-exports the modules used by the `opsramp-cloner` binary and by the
//! integration tests in `tests/`.

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;
pub mod workflow;
