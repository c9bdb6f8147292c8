//! HTTP API: shared state, handlers and the routing table

pub mod error;
pub mod handlers;
pub mod routes;

pub use routes::{build_router, route_table, Access};

use crate::auth::{AuthState, UserStore};
use crate::config::Config;
use crate::ratings::{QueryService, RatingService};
use crate::store::Database;
use axum::extract::FromRef;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ratings: RatingService,
    pub queries: QueryService,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Self {
        let user_store = Arc::new(UserStore::new(db.clone(), config.bcrypt_cost));
        Self {
            ratings: RatingService::new(db.clone()),
            queries: QueryService::new(db),
            auth: AuthState::new(user_store, config.min_password_length),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
