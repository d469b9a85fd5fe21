use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Polarity, ReactionState, Target},
    repository::{PgRepository, ReactionRepository},
};

/// Applies one like/dislike toggle and returns the user's resulting state.
///
/// Repeating a reaction removes it; reacting with the opposite polarity
/// first removes the existing reaction. Each row change is paired with a
/// ±1 on the matching counter of the target.
pub async fn apply_reaction<R: ReactionRepository>(
    repo: &mut R,
    user_id: Uuid,
    target: Target,
    polarity: Polarity,
) -> Result<ReactionState> {
    if !repo.lock_target(target).await? {
        return Err(AppError::NotFound(format!("{} not found", target.kind)));
    }

    if repo.has_reaction(target, user_id, polarity).await? {
        repo.delete_reaction(target, user_id, polarity).await?;
        repo.adjust_counter(target, polarity, -1).await?;

        tracing::debug!(%user_id, target = %target.id, %polarity, "reaction removed");
        return Ok(ReactionState::None);
    }

    let opposite = polarity.opposite();
    if repo.has_reaction(target, user_id, opposite).await? {
        repo.delete_reaction(target, user_id, opposite).await?;
        repo.adjust_counter(target, opposite, -1).await?;
    }

    repo.insert_reaction(target, user_id, polarity).await?;
    repo.adjust_counter(target, polarity, 1).await?;

    tracing::debug!(%user_id, target = %target.id, %polarity, "reaction recorded");
    Ok(polarity.into())
}

async fn react(db: &PgPool, user_id: Uuid, target: Target, polarity: Polarity) -> Result<ReactionState> {
    let mut repo = PgRepository::begin(db).await?;
    let state = apply_reaction(&mut repo, user_id, target, polarity).await?;
    repo.commit().await?;

    Ok(state)
}

pub async fn react_to_post(
    db: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
    polarity: Polarity,
) -> Result<ReactionState> {
    react(db, user_id, Target::post(post_id), polarity).await
}

pub async fn react_to_comment(
    db: &PgPool,
    user_id: Uuid,
    comment_id: Uuid,
    polarity: Polarity,
) -> Result<ReactionState> {
    react(db, user_id, Target::comment(comment_id), polarity).await
}
