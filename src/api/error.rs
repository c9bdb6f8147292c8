//! HTTP mapping for service errors

use crate::auth::middleware::TOKEN_SCHEME;
use crate::error::{ServiceError, ServiceResult};
use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::Conflict(_)
            | ServiceError::InvalidState(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ServiceError::Storage(err) => {
                tracing::error!("Storage error: {:#}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "detail": detail,
            "code": self.kind(),
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, TOKEN_SCHEME)], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Unwrap a JSON body, turning axum's rejection into a `Validation` error
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ServiceResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ServiceError::validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServiceError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Conflict("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::InvalidState("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_storage_error_not_leaked() {
        let err: ServiceError = anyhow::anyhow!("database is locked").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["detail"], "Internal server error");
        assert_eq!(body["code"], "internal_error");
    }

    #[tokio::test]
    async fn test_unauthorized_carries_challenge() {
        let response = ServiceError::Unauthorized("nope".into()).into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Token"
        );
        let body = body_json(response).await;
        assert_eq!(body["detail"], "nope");
        assert_eq!(body["code"], "unauthorized");
    }
}
