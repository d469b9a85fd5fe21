use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{CreateCommentRequest, Polarity},
    services::{comment_service, reaction_service},
};

pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
    Form(payload): Form<CreateCommentRequest>,
) -> Result<Redirect> {
    payload.validate()?;

    comment_service::create_comment(&state.db, post_id, &auth_user.user.username, &payload)
        .await?;

    Ok(Redirect::to(&format!("/posts/{}", post_id)))
}

// Redirects back to the post the comment belongs to
async fn react(
    state: &AppState,
    auth_user: &AuthUser,
    comment_id: Uuid,
    polarity: Polarity,
) -> Result<Redirect> {
    let comment = comment_service::get_comment_by_id(&state.db, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    reaction_service::react_to_comment(&state.db, auth_user.user.id, comment_id, polarity).await?;

    Ok(Redirect::to(&format!("/posts/{}", comment.post_id)))
}

pub async fn like_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Redirect> {
    react(&state, &auth_user, comment_id, Polarity::Like).await
}

pub async fn dislike_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Redirect> {
    react(&state, &auth_user, comment_id, Polarity::Dislike).await
}
