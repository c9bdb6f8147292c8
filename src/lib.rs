//! ProfRate Backend Library
//!
//! Professor rating service: catalog and rating store, rating rules, the
//! HTTP API, and the terminal client. Exposed for the binaries and tests.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod ratings;
pub mod server;
pub mod store;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use store::Database;
