//! User Storage
//! Mission: Store user accounts and their login tokens in SQLite

use crate::auth::models::{AuthToken, User};
use crate::error::{ServiceError, ServiceResult};
use crate::store::{is_unique_violation, Database};
use anyhow::{Context, Result};
use bcrypt::{hash, verify};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))?;
    Ok(User {
        id,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// User and token storage over the shared database
pub struct UserStore {
    db: Database,
    bcrypt_cost: u32,
}

impl UserStore {
    pub fn new(db: Database, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    /// Create a new user. A taken username is a `Conflict`.
    pub fn create_user(&self, username: &str, email: &str, password: &str) -> ServiceResult<User> {
        let password_hash = hash(password, self.bcrypt_cost).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        };

        let inserted = self.db.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO users (id, username, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id.to_string(),
                    user.username,
                    user.email,
                    user.password_hash,
                    user.created_at,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e).context("Failed to insert user"),
            }
        })?;

        if !inserted {
            return Err(ServiceError::Conflict(
                "A user with that username already exists.".to_string(),
            ));
        }

        info!("Created user: {}", user.username);
        Ok(user)
    }

    /// Get user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.db.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT id, username, email, password_hash, created_at
                     FROM users WHERE username = ?1",
                    params![username],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })
    }

    /// Verify username and password, returning the user on success
    pub fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        match self.get_user_by_username(username)? {
            Some(user) => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid.then_some(user))
            }
            None => Ok(None),
        }
    }

    /// The user's token, created on first use
    pub fn token_for_user(&self, user_id: &Uuid) -> Result<AuthToken> {
        self.db.with_conn(|conn| {
            let created = conn.execute(
                "INSERT OR IGNORE INTO auth_tokens (key, user_id, created_at) VALUES (?1, ?2, ?3)",
                params![
                    AuthToken::generate_key(),
                    user_id.to_string(),
                    Utc::now().to_rfc3339()
                ],
            )?;
            if created > 0 {
                debug!("Issued new token for user {}", user_id);
            }

            let token = conn.query_row(
                "SELECT key, created_at FROM auth_tokens WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| {
                    Ok(AuthToken {
                        key: row.get(0)?,
                        user_id: *user_id,
                        created_at: row.get(1)?,
                    })
                },
            )?;
            Ok(token)
        })
    }

    /// Resolve a token key to its user
    pub fn user_for_token(&self, key: &str) -> Result<Option<User>> {
        self.db.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT u.id, u.username, u.email, u.password_hash, u.created_at
                     FROM auth_tokens t JOIN users u ON u.id = t.user_id
                     WHERE t.key = ?1",
                    params![key],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })
    }

    /// Delete a token. Returns false if it did not exist.
    pub fn delete_token(&self, key: &str) -> Result<bool> {
        let deleted = self.db.with_conn(|conn| {
            let n = conn.execute("DELETE FROM auth_tokens WHERE key = ?1", params![key])?;
            Ok(n)
        })?;
        Ok(deleted > 0)
    }
}
