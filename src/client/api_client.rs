//! HTTP client for the rating API

use super::{ClientError, ClientResult};
use crate::auth::models::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::models::{ModuleListing, ModuleRatingSummary, ProfessorSummary};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[inline]
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/ratings/<id>/<code>/` with the code percent-encoded as one segment
    fn rating_url(&self, professor_id: i64, module_code: &str) -> ClientResult<Url> {
        let invalid = || ClientError::Input(format!("Invalid base URL: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["api", "ratings", &professor_id.to_string(), module_code, ""]);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, format!("Token {}", token)),
            None => request,
        }
    }

    /// Decode a 2xx body, or turn the error body into `ClientError::Api`
    async fn decode<T: DeserializeOwned>(resp: Response) -> ClientResult<T> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let text = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });

        debug!(status = status.as_u16(), %detail, "API error");
        Err(ClientError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> ClientResult<UserResponse> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = self.client.post(self.url("/api/register/")).json(&body).send().await?;
        Self::decode(resp).await
    }

    /// Log in and keep the returned token for later calls
    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<String> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = self.client.post(self.url("/api/login/")).json(&body).send().await?;
        let LoginResponse { token } = Self::decode(resp).await?;
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Invalidate the token on the server and forget it
    pub async fn logout(&mut self) -> ClientResult<String> {
        let resp = self
            .authorized(self.client.post(self.url("/api/logout/")))
            .send()
            .await?;
        let body: Value = Self::decode(resp).await?;
        self.token = None;
        Ok(message_of(&body))
    }

    pub async fn list_modules(&self) -> ClientResult<Vec<ModuleListing>> {
        let resp = self
            .authorized(self.client.get(self.url("/api/modules/")))
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn list_professors(&self) -> ClientResult<Vec<ProfessorSummary>> {
        let resp = self
            .authorized(self.client.get(self.url("/api/professors/")))
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn average_rating(
        &self,
        professor_id: i64,
        module_code: &str,
        year: Option<i32>,
        semester: Option<i32>,
    ) -> ClientResult<ModuleRatingSummary> {
        let mut query: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }
        if let Some(semester) = semester {
            query.push(("semester", semester.to_string()));
        }

        let url = self.rating_url(professor_id, module_code)?;
        let resp = self
            .authorized(self.client.get(url).query(&query))
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn rate(
        &self,
        professor_id: i64,
        module_code: &str,
        year: i32,
        semester: i32,
        rating: i32,
    ) -> ClientResult<String> {
        let body = json!({
            "professor": professor_id,
            "module": module_code,
            "year": year,
            "semester": semester,
            "rating": rating,
        });
        let resp = self
            .authorized(self.client.post(self.url("/api/rate/")).json(&body))
            .send()
            .await?;
        let body: Value = Self::decode(resp).await?;
        Ok(message_of(&body))
    }
}

fn message_of(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or("OK")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url("/api/"), "http://localhost:8000/api/");
        assert!(client.token().is_none());

        let client = client.with_token(Some("abc".to_string()));
        assert_eq!(client.token(), Some("abc"));
    }

    #[test]
    fn test_rating_url_encodes_module_code() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.rating_url(1, "CS3021").unwrap().as_str(),
            "http://localhost:8000/api/ratings/1/CS3021/"
        );
        assert_eq!(
            client.rating_url(1, "CS/30?21#x").unwrap().as_str(),
            "http://localhost:8000/api/ratings/1/CS%2F30%3F21%23x/"
        );
    }

    #[test]
    fn test_message_of() {
        assert_eq!(message_of(&json!({"message": "Logged out successfully"})), "Logged out successfully");
        assert_eq!(message_of(&json!({})), "OK");
    }
}
