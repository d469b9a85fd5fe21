use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{category_list, split_categories, text_content, trim_text};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub about: String,
    pub like_count: i32,
    pub dislike_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Post as listed and rendered, joined with its author and categories
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub about: String,
    pub like_count: i32,
    pub dislike_count: i32,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub categories: Vec<String>,
}

// Create and edit forms share the same fields
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostForm {
    #[validate(
        length(max = 100, message = "must be at most 100 characters"),
        custom(function = "text_content")
    )]
    pub title: String,
    #[validate(
        length(max = 300, message = "must be at most 300 characters"),
        custom(function = "text_content")
    )]
    pub about: String,
    #[validate(
        length(max = 1500, message = "must be at most 1500 characters"),
        custom(function = "text_content")
    )]
    pub content: String,
    #[validate(custom(function = "category_list"))]
    #[serde(default)]
    pub categories: String,
}

impl PostForm {
    pub fn title(&self) -> &str {
        trim_text(&self.title)
    }

    pub fn about(&self) -> &str {
        trim_text(&self.about)
    }

    pub fn content(&self) -> &str {
        trim_text(&self.content)
    }

    pub fn category_list(&self) -> Vec<String> {
        split_categories(&self.categories)
    }
}

impl From<&PostView> for PostForm {
    fn from(post: &PostView) -> Self {
        Self {
            title: post.title.clone(),
            about: post.about.clone(),
            content: post.content.clone(),
            categories: post.categories.join(", "),
        }
    }
}
