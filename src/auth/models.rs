//! Authentication Models
//! Mission: Define user accounts, opaque tokens and the auth request bodies

use crate::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted username
pub const MAX_USERNAME_LEN: usize = 150;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: String,
}

/// Opaque login token, one per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub key: String,
    pub user_id: Uuid,
    pub created_at: String,
}

impl AuthToken {
    /// Generate a new token key
    pub fn generate_key() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Identity attached to a request by the token middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

/// Login request body
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Registration request body
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Check username, email and password shape before touching the store
    pub fn validate(&self, min_password_length: usize) -> ServiceResult<()> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(ServiceError::validation("Username is required."));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(ServiceError::validation(format!(
                "Username must be at most {} characters.",
                MAX_USERNAME_LEN
            )));
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            return Err(ServiceError::validation(
                "Username may contain only letters, numbers, and @/./+/-/_ characters.",
            ));
        }

        if !is_plausible_email(self.email.trim()) {
            return Err(ServiceError::validation("Enter a valid email address."));
        }

        if self.password.chars().count() < min_password_length {
            return Err(ServiceError::validation(format!(
                "Password must be at least {} characters.",
                min_password_length
            )));
        }
        Ok(())
    }
}

/// Empty is allowed; otherwise `local@domain.tld`
fn is_plausible_email(email: &str) -> bool {
    if email.is_empty() {
        return true;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// User response (sanitized)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_token_generation() {
        let key1 = AuthToken::generate_key();
        let key2 = AuthToken::generate_key();

        assert_eq!(key1.len(), 32);
        assert_ne!(key1, key2); // Keys should be unique
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            email: "bob@uni.example".to_string(),
            password_hash: "secret-hash".to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_valid_registration() {
        assert!(request("bob", "bob@uni.example", "password1").validate(8).is_ok());
        assert!(request("bob.smith+x", "", "password1").validate(8).is_ok());
    }

    #[test]
    fn test_invalid_registration() {
        assert!(request("", "bob@uni.example", "password1").validate(8).is_err());
        assert!(request("bob smith", "", "password1").validate(8).is_err());
        assert!(request(&"x".repeat(151), "", "password1").validate(8).is_err());
        assert!(request("bob", "not-an-email", "password1").validate(8).is_err());
        assert!(request("bob", "a@b@c.com", "password1").validate(8).is_err());
        assert!(request("bob", "bob@localhost", "password1").validate(8).is_err());
        assert!(request("bob", "", "short").validate(8).is_err());
    }
}
