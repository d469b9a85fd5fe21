use axum::{
    Form,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use chrono::Utc;

use crate::{
    AppState,
    auth::{OptionalAuthUser, SessionCookie, clear_session_cookie, session_cookie},
    error::{AppError, Result},
    models::{LoginRequest, RegisterRequest},
    repository::PgRepository,
    services::auth_service,
    templates::{Html, SignInTemplate, SignUpTemplate},
};

// Errors the forms report inline; everything else goes to the error page
fn form_error(error: AppError) -> Result<(StatusCode, String)> {
    let status = error.status();
    match error {
        AppError::Validation(message)
        | AppError::Conflict(message)
        | AppError::Unauthorized(message) => Ok((status, message)),
        other => Err(other),
    }
}

pub async fn sign_up_page(OptionalAuthUser(auth): OptionalAuthUser) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }

    Html(SignUpTemplate {
        user: None,
        username: String::new(),
        email: String::new(),
        error: None,
    })
    .into_response()
}

pub async fn sign_up(
    State(state): State<AppState>,
    Form(payload): Form<RegisterRequest>,
) -> Result<Response> {
    let mut repo = PgRepository::begin(&state.db).await?;

    match auth_service::register_user(&mut repo, &payload).await {
        Ok(_) => {
            repo.commit().await?;
            Ok(Redirect::to("/sign-in").into_response())
        }
        Err(e) => {
            let (status, message) = form_error(e)?;
            let page = SignUpTemplate {
                user: None,
                username: payload.username,
                email: payload.email,
                error: Some(message),
            };
            Ok(Html(page).with_status(status))
        }
    }
}

pub async fn sign_in_page(OptionalAuthUser(auth): OptionalAuthUser) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }

    Html(SignInTemplate {
        user: None,
        email: String::new(),
        error: None,
    })
    .into_response()
}

pub async fn sign_in(
    State(state): State<AppState>,
    Form(payload): Form<LoginRequest>,
) -> Result<Response> {
    let now = Utc::now();
    let mut repo = PgRepository::begin(&state.db).await?;

    match auth_service::issue_session(&mut repo, &payload.email, &payload.password, now).await {
        Ok(session) => {
            repo.commit().await?;

            let cookie = session_cookie(
                &session.token,
                session.expires_at,
                now,
                state.config.secure_cookies,
            );

            Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/")).into_response())
        }
        Err(e) => {
            let (status, message) = form_error(e)?;
            let page = SignInTemplate {
                user: None,
                email: payload.email,
                error: Some(message),
            };
            Ok(Html(page).with_status(status))
        }
    }
}

/// Clears the cookie even when the session behind it is already gone.
pub async fn logout(
    State(state): State<AppState>,
    SessionCookie(token): SessionCookie,
) -> Result<Response> {
    if let Some(token) = token {
        let mut repo = PgRepository::begin(&state.db).await?;
        auth_service::revoke_session(&mut repo, &token).await?;
        repo.commit().await?;

        tracing::info!("user logged out");
    }

    let cookie = clear_session_cookie(state.config.secure_cookies);
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/")).into_response())
}
