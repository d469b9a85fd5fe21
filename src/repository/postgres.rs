use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{ReactionRepository, UserRepository};
use crate::{
    error::{AppError, Result},
    models::{NewUser, Polarity, Target, User},
};

/// Repository bound to a single Postgres transaction. Dropping it without
/// calling [`PgRepository::commit`] rolls every statement back.
pub struct PgRepository {
    tx: Transaction<'static, Postgres>,
}

impl PgRepository {
    pub async fn begin(db: &PgPool) -> Result<Self> {
        Ok(Self { tx: db.begin().await? })
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl UserRepository for PgRepository {
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(user)
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(user)
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<Uuid> {
        let user_id = Uuid::new_v4();

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await;

        match result {
            Ok(_) => Ok(user_id),
            // Lost a race against a concurrent registration
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                "The username or email already exists".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_session_token(
        &mut self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET session_token = $1, session_expires_at = $2 WHERE email = $3",
        )
        .bind(token)
        .bind(expires_at)
        .bind(email)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn find_user_by_token(&mut self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE session_token = $1")
            .bind(token)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(user)
    }

    async fn clear_session_token(&mut self, token: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET session_token = NULL, session_expires_at = NULL
            WHERE session_token = $1
            "#,
        )
        .bind(token)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }
}

impl ReactionRepository for PgRepository {
    async fn lock_target(&mut self, target: Target) -> Result<bool> {
        let query = format!(
            "SELECT id FROM {} WHERE id = $1 FOR UPDATE",
            target.kind.table()
        );

        let row = sqlx::query_scalar::<_, Uuid>(&query)
            .bind(target.id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.is_some())
    }

    async fn has_reaction(
        &mut self,
        target: Target,
        user_id: Uuid,
        polarity: Polarity,
    ) -> Result<bool> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = $1 AND user_id = $2 AND polarity = $3)",
            target.kind.reaction_table(),
            target.kind.reaction_key()
        );

        let exists = sqlx::query_scalar::<_, bool>(&query)
            .bind(target.id)
            .bind(user_id)
            .bind(polarity.as_i16())
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(exists)
    }

    async fn insert_reaction(
        &mut self,
        target: Target,
        user_id: Uuid,
        polarity: Polarity,
    ) -> Result<()> {
        let query = format!(
            "INSERT INTO {} ({}, user_id, polarity, created_at) VALUES ($1, $2, $3, $4)",
            target.kind.reaction_table(),
            target.kind.reaction_key()
        );

        sqlx::query(&query)
            .bind(target.id)
            .bind(user_id)
            .bind(polarity.as_i16())
            .bind(Utc::now())
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn delete_reaction(
        &mut self,
        target: Target,
        user_id: Uuid,
        polarity: Polarity,
    ) -> Result<()> {
        let query = format!(
            "DELETE FROM {} WHERE {} = $1 AND user_id = $2 AND polarity = $3",
            target.kind.reaction_table(),
            target.kind.reaction_key()
        );

        sqlx::query(&query)
            .bind(target.id)
            .bind(user_id)
            .bind(polarity.as_i16())
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn adjust_counter(&mut self, target: Target, polarity: Polarity, delta: i32) -> Result<()> {
        let column = polarity.counter_column();
        let query = format!(
            "UPDATE {} SET {column} = {column} + $1 WHERE id = $2",
            target.kind.table()
        );

        let result = sqlx::query(&query)
            .bind(delta)
            .bind(target.id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} not found", target.kind)));
        }

        Ok(())
    }
}
