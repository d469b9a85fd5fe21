use askama::Template;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    models::{Comment, PostForm, PostView, User},
};

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> Html<T> {
    /// Render failures become a 500 whatever status was asked for.
    pub fn with_status(self, status: StatusCode) -> Response {
        match self.0.render() {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => AppError::from(e).into_response(),
        }
    }
}

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        self.with_status(StatusCode::OK)
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user: Option<User>,
    pub heading: String,
    pub posts: Vec<PostView>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub user: Option<User>,
    pub post: PostView,
    pub comments: Vec<Comment>,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub user: Option<User>,
    pub heading: String,
    pub action: String,
    pub form: PostForm,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "sign_in.html")]
pub struct SignInTemplate {
    pub user: Option<User>,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "sign_up.html")]
pub struct SignUpTemplate {
    pub user: Option<User>,
    pub username: String,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub user: Option<User>,
    pub status: u16,
    pub reason: String,
    pub message: String,
}
