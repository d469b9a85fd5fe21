use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{TypedHeader, headers::Cookie};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use rand::RngCore;
use std::{convert::Infallible, sync::LazyLock};

use crate::{
    AppState,
    error::{AppError, Result},
    models::User,
    repository::PgRepository,
    services::auth_service,
};

pub const SESSION_COOKIE: &str = "session_id";

const BCRYPT_COST: u32 = 10;

// Verified against when the email is unknown so both login failures cost a hash
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| bcrypt::hash("dummy-password", BCRYPT_COST).unwrap_or_default());

// Password hashing utilities
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST).map_err(AppError::from)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).map_err(AppError::from)
}

pub fn dummy_password_hash() -> &'static str {
    &DUMMY_HASH
}

/// 256 random bits from the thread CSPRNG, URL-safe base64 without padding.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// -- Cookie helpers --

pub fn session_cookie(
    token: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    secure: bool,
) -> String {
    let max_age = (expires_at - now).num_seconds().max(0);
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        max_age,
        if secure { "; Secure" } else { "" }
    )
}

pub fn clear_session_cookie(secure: bool) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
        SESSION_COOKIE,
        if secure { "; Secure" } else { "" }
    )
}

async fn session_token(parts: &mut Parts) -> Option<String> {
    let TypedHeader(cookies) = parts.extract::<TypedHeader<Cookie>>().await.ok()?;
    cookies
        .get(SESSION_COOKIE)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// The raw `session_id` cookie, whether or not it still names a live session.
#[derive(Debug)]
pub struct SessionCookie(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for SessionCookie {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(SessionCookie(session_token(parts).await))
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = session_token(parts)
            .await
            .ok_or_else(|| AppError::Unauthorized("Please sign in first".to_string()))?;

        // Expired sessions are revoked inside this transaction
        let mut repo = PgRepository::begin(&state.db).await?;
        let user = auth_service::authenticate_request(&mut repo, &token, Utc::now()).await?;
        repo.commit().await?;

        let user =
            user.ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

        Ok(AuthUser { user, token })
    }
}

// Optional auth user (for pages that work with or without a session)
#[derive(Debug)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    pub fn user(&self) -> Option<User> {
        self.0.as_ref().map(|auth| auth.user.clone())
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Only a missing or dead session means anonymous; storage errors surface
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalAuthUser(Some(user))),
            Err(AppError::Unauthorized(_)) => Ok(OptionalAuthUser(None)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn session_token_is_43_url_safe_chars() {
        let token = generate_session_token();
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn session_tokens_are_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn dummy_hash_is_a_valid_bcrypt_hash() {
        assert!(!verify_password("anything", dummy_password_hash()).unwrap());
    }

    #[test]
    fn session_cookie_carries_remaining_lifetime() {
        let now = Utc::now();
        let cookie = session_cookie("abc", now + Duration::hours(12), now, false);
        assert_eq!(
            cookie,
            "session_id=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=43200"
        );
        assert!(session_cookie("abc", now, now, true).ends_with("Max-Age=0; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert_eq!(
            clear_session_cookie(false),
            "session_id=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
        );
    }
}
