//! Routing table
//!
//! Every endpoint is declared once with its access level; the token check
//! runs as route middleware ahead of the handler.

use crate::api::{handlers, AppState};
use crate::auth::{self, optional_token, require_token, AuthState};
use crate::config::Config;
use crate::error::ServiceError;
use crate::middleware::{rate_limit_middleware, request_logging, RateLimitLayer};
use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

/// Who may call an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// A token is checked if sent; an invalid one is ignored
    OptionalToken,
    RequireToken,
}

pub struct Endpoint {
    pub path: &'static str,
    pub access: Access,
    /// Subject to the per-IP credential rate limit
    pub throttled: bool,
    pub handler: MethodRouter<AppState>,
}

impl Endpoint {
    fn new(path: &'static str, access: Access, handler: MethodRouter<AppState>) -> Self {
        Self {
            path,
            access,
            throttled: false,
            handler,
        }
    }

    fn throttled(mut self) -> Self {
        self.throttled = true;
        self
    }
}

pub fn route_table() -> Vec<Endpoint> {
    use Access::*;

    vec![
        Endpoint::new("/health", Public, get(handlers::health)),
        Endpoint::new("/api/", Public, get(handlers::api_root)),
        Endpoint::new("/api/register/", Public, post(auth::api::register)).throttled(),
        Endpoint::new("/api/login/", Public, post(auth::api::login)).throttled(),
        Endpoint::new("/api/logout/", RequireToken, post(auth::api::logout)),
        Endpoint::new("/api/modules/", OptionalToken, get(handlers::list_modules)),
        Endpoint::new("/api/professors/", OptionalToken, get(handlers::list_professors)),
        Endpoint::new(
            "/api/ratings/:professor_id/:module_code/",
            OptionalToken,
            get(handlers::professor_rating),
        ),
        Endpoint::new("/api/rate/", RequireToken, post(handlers::rate)),
    ]
}

async fn not_found() -> ServiceError {
    ServiceError::not_found("Not found.")
}

/// Build the application router from the routing table
pub fn build_router(state: AppState, config: &Config) -> (Router, Option<RateLimitLayer>) {
    let auth_state: AuthState = state.auth.clone();
    let limiter = config
        .rate_limit
        .enabled
        .then(|| RateLimitLayer::new((&config.rate_limit).into()));

    let mut router = Router::new();
    for endpoint in route_table() {
        let mut handler = match endpoint.access {
            Access::Public => endpoint.handler,
            Access::OptionalToken => endpoint.handler.route_layer(middleware::from_fn_with_state(
                auth_state.clone(),
                optional_token,
            )),
            Access::RequireToken => endpoint.handler.route_layer(middleware::from_fn_with_state(
                auth_state.clone(),
                require_token,
            )),
        };
        if let (true, Some(limiter)) = (endpoint.throttled, &limiter) {
            handler = handler.route_layer(middleware::from_fn_with_state(
                limiter.clone(),
                rate_limit_middleware,
            ));
        }
        router = router.route(endpoint.path, handler);
    }

    let cors = if config.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    let router = router
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(request_logging))
        .layer(cors);

    info!(
        routes = route_table().len(),
        rate_limited = limiter.is_some(),
        "Router built"
    );
    (router, limiter)
}
