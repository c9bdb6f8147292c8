//! Authentication Middleware
//! Mission: Resolve `Authorization: Token <key>` headers to users

use crate::auth::{api::AuthState, models::AuthenticatedUser};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

/// Auth scheme expected in the Authorization header
pub const TOKEN_SCHEME: &str = "Token";

/// Extract the token key from the Authorization header.
///
/// `Ok(None)` when no header is present.
pub fn token_from_headers(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidFormat)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(key), None) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => {
            Ok(Some(key.to_string()))
        }
        _ => Err(AuthError::InvalidFormat),
    }
}

fn resolve(state: &AuthState, key: String) -> Result<AuthenticatedUser, AuthError> {
    let user = state
        .user_store
        .user_for_token(&key)
        .map_err(|e| {
            error!("Token lookup failed: {:#}", e);
            AuthError::Internal
        })?
        .ok_or(AuthError::InvalidToken)?;

    Ok(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
        token: key,
    })
}

/// Rejects requests without a valid token; attaches the user otherwise
pub async fn require_token(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let key = token_from_headers(req.headers())?.ok_or(AuthError::MissingToken)?;
    let user = resolve(&state, key)?;

    debug!("Authenticated request for {}", user.username);
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Attaches the user when a valid token is present; never rejects
pub async fn optional_token(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Ok(Some(key)) = token_from_headers(req.headers()) {
        if let Ok(user) = resolve(&state, key) {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken,
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            ),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "Invalid authorization header. Use: Token <key>",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token."),
            AuthError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let code = if status == StatusCode::UNAUTHORIZED {
            "unauthorized"
        } else {
            "internal_error"
        };

        (
            status,
            [(header::WWW_AUTHENTICATE, TOKEN_SCHEME)],
            Json(json!({ "detail": message, "code": code })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_auth_error_responses() {
        let missing = AuthError::MissingToken.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            missing.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Token"
        );

        let invalid_format = AuthError::InvalidFormat.into_response();
        assert_eq!(invalid_format.status(), StatusCode::UNAUTHORIZED);

        let invalid_token = AuthError::InvalidToken.into_response();
        assert_eq!(invalid_token.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_token_header_parsing() {
        assert_eq!(token_from_headers(&HeaderMap::new()).unwrap(), None);
        assert_eq!(
            token_from_headers(&headers_with("Token abc123")).unwrap(),
            Some("abc123".to_string())
        );
        assert!(matches!(
            token_from_headers(&headers_with("Bearer abc123")),
            Err(AuthError::InvalidFormat)
        ));
        assert!(matches!(
            token_from_headers(&headers_with("Token")),
            Err(AuthError::InvalidFormat)
        ));
        assert!(matches!(
            token_from_headers(&headers_with("Token a b")),
            Err(AuthError::InvalidFormat)
        ));
    }
}
