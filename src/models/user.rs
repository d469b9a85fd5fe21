use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::credential_chars;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    pub session_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A user without an expiry has no live session.
    pub fn session_expired(&self, now: DateTime<Utc>) -> bool {
        match self.session_expires_at {
            Some(expires_at) => expires_at < now,
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 2, max = 19, message = "must be between 2 and 19 characters"),
        custom(function = "credential_chars")
    )]
    pub username: String,
    #[validate(
        email(message = "must be a valid email address"),
        custom(function = "credential_chars")
    )]
    pub email: String,
    #[validate(
        length(min = 6, max = 20, message = "must be between 6 and 20 characters"),
        custom(function = "credential_chars")
    )]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
