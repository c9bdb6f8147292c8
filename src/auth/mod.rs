//! Authentication Module
//! Mission: Registration, opaque token login/logout, and per-route token checks

pub mod api;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use api::AuthState;
pub use middleware::{optional_token, require_token};
pub use models::AuthenticatedUser;
pub use user_store::UserStore;
