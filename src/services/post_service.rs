use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Polarity, Post, PostForm, PostView},
};

const POST_VIEW_SELECT: &str = r#"
    SELECT
        p.id, p.author_id, u.username AS author_name,
        p.title, p.content, p.about, p.like_count, p.dislike_count,
        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
        p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON p.author_id = u.id
"#;

pub async fn create_post(db: &PgPool, author_id: Uuid, form: &PostForm) -> Result<Post> {
    let now = Utc::now();
    let mut tx = db.begin().await?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (id, author_id, title, content, about, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(author_id)
    .bind(form.title())
    .bind(form.content())
    .bind(form.about())
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    insert_categories(&mut tx, post.id, &form.category_list()).await?;

    tx.commit().await?;

    tracing::info!(post_id = %post.id, %author_id, "post created");
    Ok(post)
}

pub async fn update_post(db: &PgPool, post_id: Uuid, form: &PostForm) -> Result<()> {
    let mut tx = db.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE posts
        SET title = $1, content = $2, about = $3, updated_at = $4
        WHERE id = $5
        "#,
    )
    .bind(form.title())
    .bind(form.content())
    .bind(form.about())
    .bind(Utc::now())
    .bind(post_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    sqlx::query("DELETE FROM post_categories WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    insert_categories(&mut tx, post_id, &form.category_list()).await?;

    tx.commit().await?;

    Ok(())
}

/// Categories, comments and reactions go with the post.
pub async fn delete_post(db: &PgPool, post_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    tracing::info!(%post_id, "post deleted");
    Ok(())
}

pub async fn get_post_by_id(db: &PgPool, post_id: Uuid) -> Result<Option<PostView>> {
    let query = format!("{} WHERE p.id = $1", POST_VIEW_SELECT);

    let post = sqlx::query_as::<_, PostView>(&query)
        .bind(post_id)
        .fetch_optional(db)
        .await?;

    let Some(post) = post else {
        return Ok(None);
    };

    let mut posts = [post];
    attach_categories(db, &mut posts).await?;
    let [post] = posts;

    Ok(Some(post))
}

pub async fn get_posts(db: &PgPool) -> Result<Vec<PostView>> {
    let query = format!("{} ORDER BY p.created_at DESC", POST_VIEW_SELECT);

    let mut posts = sqlx::query_as::<_, PostView>(&query)
        .fetch_all(db)
        .await?;

    attach_categories(db, &mut posts).await?;
    Ok(posts)
}

pub async fn get_posts_by_category(db: &PgPool, category: &str) -> Result<Vec<PostView>> {
    let query = format!(
        "{} WHERE p.id IN (SELECT post_id FROM post_categories WHERE category = $1) ORDER BY p.created_at DESC",
        POST_VIEW_SELECT
    );

    let mut posts = sqlx::query_as::<_, PostView>(&query)
        .bind(category)
        .fetch_all(db)
        .await?;

    attach_categories(db, &mut posts).await?;
    Ok(posts)
}

pub async fn get_created_posts(db: &PgPool, author_id: Uuid) -> Result<Vec<PostView>> {
    let query = format!(
        "{} WHERE p.author_id = $1 ORDER BY p.created_at DESC",
        POST_VIEW_SELECT
    );

    let mut posts = sqlx::query_as::<_, PostView>(&query)
        .bind(author_id)
        .fetch_all(db)
        .await?;

    attach_categories(db, &mut posts).await?;
    Ok(posts)
}

pub async fn get_liked_posts(db: &PgPool, user_id: Uuid) -> Result<Vec<PostView>> {
    let query = format!(
        r#"
        {}
        WHERE p.id IN (
            SELECT post_id FROM post_reactions WHERE user_id = $1 AND polarity = $2
        )
        ORDER BY p.created_at DESC
        "#,
        POST_VIEW_SELECT
    );

    let mut posts = sqlx::query_as::<_, PostView>(&query)
        .bind(user_id)
        .bind(Polarity::Like.as_i16())
        .fetch_all(db)
        .await?;

    attach_categories(db, &mut posts).await?;
    Ok(posts)
}

async fn insert_categories(
    tx: &mut Transaction<'static, Postgres>,
    post_id: Uuid,
    categories: &[String],
) -> Result<()> {
    for category in categories {
        sqlx::query("INSERT INTO post_categories (post_id, category) VALUES ($1, $2)")
            .bind(post_id)
            .bind(category)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

async fn attach_categories(db: &PgPool, posts: &mut [PostView]) -> Result<()> {
    if posts.is_empty() {
        return Ok(());
    }

    let ids: Vec<Uuid> = posts.iter().map(|post| post.id).collect();

    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT post_id, category FROM post_categories WHERE post_id = ANY($1) ORDER BY category",
    )
    .bind(&ids)
    .fetch_all(db)
    .await?;

    for (post_id, category) in rows {
        if let Some(post) = posts.iter_mut().find(|post| post.id == post_id) {
            post.categories.push(category);
        }
    }

    Ok(())
}
