//! Character rules shared by the form validators.
//!
//! Credentials (username, email, password) are restricted to ASCII graphic
//! characters, bytes 33 through 126. Free text (post fields, categories,
//! comments) may additionally contain spaces, `\r` and `\n`, must not be
//! blank once the surrounding spaces and line breaks are trimmed, and is
//! stored trimmed.

use std::borrow::Cow;

use validator::ValidationError;

pub const MAX_CATEGORY_LEN: usize = 32;

const TRIMMED: [char; 3] = [' ', '\n', '\r'];

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn trim_text(value: &str) -> &str {
    value.trim_matches(TRIMMED)
}

pub fn credential_chars(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_graphic()) {
        Ok(())
    } else {
        Err(error(
            "credential_chars",
            "only printable ASCII characters without spaces are allowed",
        ))
    }
}

pub fn text_content(value: &str) -> Result<(), ValidationError> {
    let trimmed = trim_text(value);
    if trimmed.is_empty() {
        return Err(error("blank", "must not be empty"));
    }
    let allowed = |c: char| c == '\r' || c == '\n' || (' '..='~').contains(&c);
    if !trimmed.chars().all(allowed) {
        return Err(error("text_chars", "contains unsupported characters"));
    }
    Ok(())
}

/// Splits the comma-separated category field into distinct, trimmed labels,
/// keeping first-seen order.
pub fn split_categories(value: &str) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for category in value.split(',').map(trim_text) {
        if !category.is_empty() && !categories.iter().any(|c| c == category) {
            categories.push(category.to_string());
        }
    }
    categories
}

pub fn category_list(value: &str) -> Result<(), ValidationError> {
    let categories = split_categories(value);
    if categories.is_empty() {
        return Err(error("categories", "at least one category is required"));
    }
    for category in &categories {
        if category.chars().count() > MAX_CATEGORY_LEN {
            return Err(error("category_length", "category is too long"));
        }
        text_content(category)?;
    }
    Ok(())
}
