use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, OptionalAuthUser},
    error::{AppError, Result},
    models::{Polarity, PostForm, PostView},
    services::{comment_service, post_service, reaction_service},
    templates::{Html, IndexTemplate, PostFormTemplate, PostTemplate},
};

async fn find_post(state: &AppState, post_id: Uuid) -> Result<PostView> {
    post_service::get_post_by_id(&state.db, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

async fn find_own_post(state: &AppState, auth_user: &AuthUser, post_id: Uuid) -> Result<PostView> {
    let post = find_post(state, post_id).await?;

    if post.author_id != auth_user.user.id {
        return Err(AppError::Forbidden(
            "Only the author can change this post".to_string(),
        ));
    }

    Ok(post)
}

fn post_form_page(
    auth_user: AuthUser,
    heading: &str,
    action: String,
    form: PostForm,
    error: Option<String>,
) -> PostFormTemplate {
    PostFormTemplate {
        user: Some(auth_user.user),
        heading: heading.to_string(),
        action,
        form,
        error,
    }
}

pub async fn index(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
) -> Result<Html<IndexTemplate>> {
    let posts = post_service::get_posts(&state.db).await?;

    Ok(Html(IndexTemplate {
        user: auth.user(),
        heading: "All posts".to_string(),
        posts,
    }))
}

pub async fn posts_by_category(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    Path(category): Path<String>,
) -> Result<Html<IndexTemplate>> {
    let posts = post_service::get_posts_by_category(&state.db, &category).await?;

    Ok(Html(IndexTemplate {
        user: auth.user(),
        heading: format!("Category: {}", category),
        posts,
    }))
}

pub async fn get_post(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Html<PostTemplate>> {
    let post = find_post(&state, post_id).await?;
    let comments = comment_service::get_comments(&state.db, post_id).await?;

    Ok(Html(PostTemplate {
        user: auth.user(),
        post,
        comments,
    }))
}

pub async fn created_posts(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Html<IndexTemplate>> {
    let posts = post_service::get_created_posts(&state.db, auth_user.user.id).await?;

    Ok(Html(IndexTemplate {
        user: Some(auth_user.user),
        heading: "My posts".to_string(),
        posts,
    }))
}

pub async fn liked_posts(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Html<IndexTemplate>> {
    let posts = post_service::get_liked_posts(&state.db, auth_user.user.id).await?;

    Ok(Html(IndexTemplate {
        user: Some(auth_user.user),
        heading: "Liked posts".to_string(),
        posts,
    }))
}

pub async fn create_post_page(auth_user: AuthUser) -> Html<PostFormTemplate> {
    Html(post_form_page(
        auth_user,
        "New post",
        "/posts".to_string(),
        PostForm::default(),
        None,
    ))
}

pub async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Form(payload): Form<PostForm>,
) -> Result<Response> {
    if let Err(e) = payload.validate() {
        let page = post_form_page(
            auth_user,
            "New post",
            "/posts".to_string(),
            payload,
            Some(AppError::from(e).to_string()),
        );
        return Ok(Html(page).with_status(StatusCode::BAD_REQUEST));
    }

    let post = post_service::create_post(&state.db, auth_user.user.id, &payload).await?;

    Ok(Redirect::to(&format!("/posts/{}", post.id)).into_response())
}

pub async fn edit_post_page(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Html<PostFormTemplate>> {
    let post = find_own_post(&state, &auth_user, post_id).await?;

    Ok(Html(post_form_page(
        auth_user,
        "Edit post",
        format!("/posts/{}/edit", post_id),
        PostForm::from(&post),
        None,
    )))
}

pub async fn update_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
    Form(payload): Form<PostForm>,
) -> Result<Response> {
    find_own_post(&state, &auth_user, post_id).await?;

    if let Err(e) = payload.validate() {
        let page = post_form_page(
            auth_user,
            "Edit post",
            format!("/posts/{}/edit", post_id),
            payload,
            Some(AppError::from(e).to_string()),
        );
        return Ok(Html(page).with_status(StatusCode::BAD_REQUEST));
    }

    post_service::update_post(&state.db, post_id, &payload).await?;

    tracing::info!(%post_id, user_id = %auth_user.user.id, "post updated");
    Ok(Redirect::to(&format!("/posts/{}", post_id)).into_response())
}

pub async fn delete_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Redirect> {
    find_own_post(&state, &auth_user, post_id).await?;
    post_service::delete_post(&state.db, post_id).await?;

    Ok(Redirect::to("/"))
}

async fn react(state: &AppState, auth_user: &AuthUser, post_id: Uuid, polarity: Polarity) -> Result<Redirect> {
    reaction_service::react_to_post(&state.db, auth_user.user.id, post_id, polarity).await?;
    Ok(Redirect::to(&format!("/posts/{}", post_id)))
}

pub async fn like_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Redirect> {
    react(&state, &auth_user, post_id, Polarity::Like).await
}

pub async fn dislike_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Redirect> {
    react(&state, &auth_user, post_id, Polarity::Dislike).await
}
