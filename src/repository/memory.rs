use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use super::{ReactionRepository, UserRepository};
use crate::{
    error::{AppError, Result},
    models::{NewUser, Polarity, Target, User},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub like: i32,
    pub dislike: i32,
}

/// In-process repository with the same uniqueness and non-negative counter
/// rules as the Postgres schema. Writes apply immediately.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    users: Vec<User>,
    counters: HashMap<Target, Counters>,
    reactions: HashMap<(Target, Uuid), Polarity>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a post or comment with zeroed counters.
    pub fn add_target(&mut self, target: Target) {
        self.counters.entry(target).or_default();
    }

    pub fn counters(&self, target: Target) -> Option<Counters> {
        self.counters.get(&target).copied()
    }

    pub fn reaction(&self, target: Target, user_id: Uuid) -> Option<Polarity> {
        self.reactions.get(&(target, user_id)).copied()
    }

    pub fn reaction_count(&self, target: Target, polarity: Polarity) -> usize {
        self.reactions
            .iter()
            .filter(|((t, _), p)| *t == target && **p == polarity)
            .count()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }
}

impl UserRepository for MemoryRepository {
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<Uuid> {
        if self
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::Conflict(
                "The username or email already exists".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        self.users.push(User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            session_token: None,
            session_expires_at: None,
            created_at: Utc::now(),
        });

        Ok(id)
    }

    async fn set_session_token(
        &mut self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        if self
            .users
            .iter()
            .any(|u| u.email != email && u.session_token.as_deref() == Some(token))
        {
            return Err(AppError::Internal("duplicate session token".to_string()));
        }

        if let Some(user) = self.users.iter_mut().find(|u| u.email == email) {
            user.session_token = Some(token.to_string());
            user.session_expires_at = Some(expires_at);
        }

        Ok(())
    }

    async fn find_user_by_token(&mut self, token: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.session_token.as_deref() == Some(token))
            .cloned())
    }

    async fn clear_session_token(&mut self, token: &str) -> Result<()> {
        for user in self
            .users
            .iter_mut()
            .filter(|u| u.session_token.as_deref() == Some(token))
        {
            user.session_token = None;
            user.session_expires_at = None;
        }

        Ok(())
    }
}

impl ReactionRepository for MemoryRepository {
    async fn lock_target(&mut self, target: Target) -> Result<bool> {
        Ok(self.counters.contains_key(&target))
    }

    async fn has_reaction(
        &mut self,
        target: Target,
        user_id: Uuid,
        polarity: Polarity,
    ) -> Result<bool> {
        Ok(self.reaction(target, user_id) == Some(polarity))
    }

    async fn insert_reaction(
        &mut self,
        target: Target,
        user_id: Uuid,
        polarity: Polarity,
    ) -> Result<()> {
        if self.reactions.contains_key(&(target, user_id)) {
            return Err(AppError::Internal(format!(
                "duplicate reaction on {} {}",
                target.kind, target.id
            )));
        }
        self.reactions.insert((target, user_id), polarity);

        Ok(())
    }

    async fn delete_reaction(
        &mut self,
        target: Target,
        user_id: Uuid,
        polarity: Polarity,
    ) -> Result<()> {
        if self.reaction(target, user_id) == Some(polarity) {
            self.reactions.remove(&(target, user_id));
        }

        Ok(())
    }

    async fn adjust_counter(&mut self, target: Target, polarity: Polarity, delta: i32) -> Result<()> {
        let counters = self
            .counters
            .get_mut(&target)
            .ok_or_else(|| AppError::NotFound(format!("{} not found", target.kind)))?;

        let counter = match polarity {
            Polarity::Like => &mut counters.like,
            Polarity::Dislike => &mut counters.dislike,
        };
        if *counter + delta < 0 {
            return Err(AppError::Internal(format!(
                "{} counter would become negative",
                polarity
            )));
        }
        *counter += delta;

        Ok(())
    }
}
