use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Comment, CreateCommentRequest},
};

pub async fn create_comment(
    db: &PgPool,
    post_id: Uuid,
    author: &str,
    request: &CreateCommentRequest,
) -> Result<Comment> {
    let post_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
        .bind(post_id)
        .fetch_one(db)
        .await?;

    if !post_exists {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (id, post_id, author, content, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, post_id, author, content, like_count, dislike_count, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(post_id)
    .bind(author)
    .bind(request.content())
    .bind(Utc::now())
    .fetch_one(db)
    .await?;

    tracing::debug!(comment_id = %comment.id, %post_id, "comment created");
    Ok(comment)
}

pub async fn get_comments(db: &PgPool, post_id: Uuid) -> Result<Vec<Comment>> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, author, content, like_count, dislike_count, created_at
        FROM comments
        WHERE post_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(db)
    .await?;

    Ok(comments)
}

pub async fn get_comment_by_id(db: &PgPool, comment_id: Uuid) -> Result<Option<Comment>> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, author, content, like_count, dislike_count, created_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(comment_id)
    .fetch_optional(db)
    .await?;

    Ok(comment)
}
