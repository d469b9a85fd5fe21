pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;
pub mod templates;
pub mod validation;

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    // Pages readable without a session
    let public_routes = Router::new()
        .route("/", get(handlers::posts::index))
        .route(
            "/categories/{category}",
            get(handlers::posts::posts_by_category),
        )
        .route("/posts/{post_id}", get(handlers::posts::get_post))
        .route(
            "/sign-up",
            get(handlers::auth::sign_up_page).post(handlers::auth::sign_up),
        )
        .route(
            "/sign-in",
            get(handlers::auth::sign_in_page).post(handlers::auth::sign_in),
        );

    // Protected routes
    let protected_routes = Router::new()
        .route("/logout", post(handlers::auth::logout))
        // Post routes
        .route("/posts/new", get(handlers::posts::create_post_page))
        .route("/posts", post(handlers::posts::create_post))
        .route("/posts/created", get(handlers::posts::created_posts))
        .route("/posts/liked", get(handlers::posts::liked_posts))
        .route(
            "/posts/{post_id}/edit",
            get(handlers::posts::edit_post_page).post(handlers::posts::update_post),
        )
        .route(
            "/posts/{post_id}/delete",
            post(handlers::posts::delete_post),
        )
        .route("/posts/{post_id}/like", post(handlers::posts::like_post))
        .route(
            "/posts/{post_id}/dislike",
            post(handlers::posts::dislike_post),
        )
        // Comment routes
        .route(
            "/posts/{post_id}/comments",
            post(handlers::comments::create_comment),
        )
        .route(
            "/comments/{comment_id}/like",
            post(handlers::comments::like_comment),
        )
        .route(
            "/comments/{comment_id}/dislike",
            post(handlers::comments::dislike_comment),
        );

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/static", static_files)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
