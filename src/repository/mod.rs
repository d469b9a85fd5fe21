//! Persistence boundary for the session and reaction logic.
//!
//! Each repository value is one unit of work: [`PgRepository`] wraps a
//! database transaction, [`MemoryRepository`] mutates in-process maps.

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use chrono::{DateTime, Utc};
use std::future::Future;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{NewUser, Polarity, Target, User},
};

pub trait UserRepository: Send {
    fn find_user_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    fn find_user_by_username(
        &mut self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Fails with `Conflict` when the email or username is already taken.
    fn insert_user(&mut self, user: NewUser) -> impl Future<Output = Result<Uuid>> + Send;

    /// Overwrites whatever session the user held before.
    fn set_session_token(
        &mut self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn find_user_by_token(
        &mut self,
        token: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    /// No-op when no user holds the token.
    fn clear_session_token(&mut self, token: &str) -> impl Future<Output = Result<()>> + Send;
}

pub trait ReactionRepository: Send {
    /// Locks the target for the rest of the unit of work. Returns `false`
    /// when it does not exist.
    fn lock_target(&mut self, target: Target) -> impl Future<Output = Result<bool>> + Send;

    fn has_reaction(
        &mut self,
        target: Target,
        user_id: Uuid,
        polarity: Polarity,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn insert_reaction(
        &mut self,
        target: Target,
        user_id: Uuid,
        polarity: Polarity,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_reaction(
        &mut self,
        target: Target,
        user_id: Uuid,
        polarity: Polarity,
    ) -> impl Future<Output = Result<()>> + Send;

    fn adjust_counter(
        &mut self,
        target: Target,
        polarity: Polarity,
        delta: i32,
    ) -> impl Future<Output = Result<()>> + Send;
}
