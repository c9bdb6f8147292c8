//! Route handlers for the rating API

use crate::api::{error::json_body, AppState};
use crate::auth::AuthenticatedUser;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{ModuleListing, ModuleRatingSummary, ProfessorSummary};
use crate::ratings::RateRequest;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ===== Request/Response Types =====

#[derive(Debug, Default, Deserialize)]
pub struct RatingQuery {
    pub year: Option<String>,
    pub semester: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Empty values count as absent
fn optional_int(value: Option<&str>, field: &str) -> ServiceResult<Option<i32>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ServiceError::validation(format!("{} must be an integer.", field))),
    }
}

// ===== Route Handlers =====

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Index of the API's endpoints - GET /api/
pub async fn api_root() -> Json<Value> {
    Json(json!({
        "register": "/api/register/",
        "login": "/api/login/",
        "logout": "/api/logout/",
        "modules": "/api/modules/",
        "professors": "/api/professors/",
        "ratings": "/api/ratings/{professor_id}/{module_code}/",
        "rate": "/api/rate/",
    }))
}

/// Every module instance with its professors - GET /api/modules/
pub async fn list_modules(State(state): State<AppState>) -> ServiceResult<Json<Vec<ModuleListing>>> {
    Ok(Json(state.queries.list_modules()?))
}

/// Every professor with their overall rating - GET /api/professors/
pub async fn list_professors(
    State(state): State<AppState>,
) -> ServiceResult<Json<Vec<ProfessorSummary>>> {
    Ok(Json(state.queries.list_professors_with_ratings()?))
}

/// Average rating of a professor in a module - GET /api/ratings/{professor_id}/{module_code}/
pub async fn professor_rating(
    State(state): State<AppState>,
    Path((professor_id, module_code)): Path<(String, String)>,
    Query(params): Query<RatingQuery>,
) -> ServiceResult<Json<ModuleRatingSummary>> {
    // Non-numeric ids cannot name a professor
    let professor_id = professor_id
        .parse::<i64>()
        .map_err(|_| ServiceError::not_found("Professor not found."))?;
    let year = optional_int(params.year.as_deref(), "year")?;
    let semester = optional_int(params.semester.as_deref(), "semester")?;

    let summary = state
        .ratings
        .average_rating(professor_id, &module_code, year, semester)?;
    Ok(Json(summary))
}

/// Submit a rating - POST /api/rate/ (token required)
pub async fn rate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<Value>)> {
    let submission = json_body(payload)?.into_submission()?;
    state
        .ratings
        .submit_rating(&user.user_id.to_string(), &submission)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Rating submitted successfully." })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_int() {
        assert_eq!(optional_int(None, "year").unwrap(), None);
        assert_eq!(optional_int(Some(""), "year").unwrap(), None);
        assert_eq!(optional_int(Some(" 2024 "), "year").unwrap(), Some(2024));

        let err = optional_int(Some("spring"), "semester").unwrap_err();
        assert_eq!(err.to_string(), "semester must be an integer.");
    }
}
