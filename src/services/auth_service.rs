//! Registration and the session lifecycle.
//!
//! A user is either logged out (no token) or logged in with exactly one
//! `(token, expires_at)` pair. Logging in again overwrites the pair; expiry
//! is only noticed when the token is next presented, at which point it is
//! cleared.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{dummy_password_hash, generate_session_token, hash_password, verify_password},
    error::{AppError, Result},
    models::{NewUser, RegisterRequest, Session, User},
    repository::UserRepository,
};

pub const SESSION_TTL_HOURS: i64 = 12;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const USER_EXISTS: &str = "The username or email already exists";

pub fn session_ttl() -> Duration {
    Duration::hours(SESSION_TTL_HOURS)
}

pub async fn register_user<R: UserRepository>(repo: &mut R, request: &RegisterRequest) -> Result<Uuid> {
    request.validate()?;

    if repo.find_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::Conflict(USER_EXISTS.to_string()));
    }

    if repo
        .find_user_by_username(&request.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(USER_EXISTS.to_string()));
    }

    let password_hash = hash_password(&request.password)?;

    let user_id = repo
        .insert_user(NewUser {
            username: request.username.clone(),
            email: request.email.clone(),
            password_hash,
        })
        .await?;

    tracing::info!(%user_id, username = %request.username, "user registered");

    Ok(user_id)
}

pub async fn issue_session<R: UserRepository>(
    repo: &mut R,
    email: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<Session> {
    let user = repo.find_user_by_email(email).await?;

    let verified = match &user {
        Some(user) => verify_password(password, &user.password_hash)?,
        None => {
            let _ = verify_password(password, dummy_password_hash());
            false
        }
    };

    let Some(user) = user.filter(|_| verified) else {
        tracing::debug!("rejected login attempt");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let token = generate_session_token();
    let expires_at = now + session_ttl();

    repo.set_session_token(&user.email, &token, expires_at)
        .await?;

    tracing::info!(user_id = %user.id, %expires_at, "session issued");

    Ok(Session {
        user_id: user.id,
        token,
        expires_at,
    })
}

pub async fn validate_session<R: UserRepository>(
    repo: &mut R,
    token: &str,
    now: DateTime<Utc>,
) -> Result<User> {
    let user = repo
        .find_user_by_token(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid session".to_string()))?;

    if user.session_expired(now) {
        repo.clear_session_token(token).await?;
        tracing::info!(user_id = %user.id, "expired session revoked");
        return Err(AppError::Unauthorized("Session expired".to_string()));
    }

    Ok(user)
}

pub async fn revoke_session<R: UserRepository>(repo: &mut R, token: &str) -> Result<()> {
    repo.clear_session_token(token).await?;
    tracing::debug!("session revoked");
    Ok(())
}

/// Anonymous visitors are `Ok(None)`; only storage failures are errors.
pub async fn authenticate_request<R: UserRepository>(
    repo: &mut R,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<User>> {
    match validate_session(repo, token, now).await {
        Ok(user) => Ok(Some(user)),
        Err(AppError::Unauthorized(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
