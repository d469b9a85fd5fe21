use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Like,
    Dislike,
}

impl Polarity {
    pub fn opposite(self) -> Self {
        match self {
            Polarity::Like => Polarity::Dislike,
            Polarity::Dislike => Polarity::Like,
        }
    }

    // Stored in the reaction tables' `polarity` column
    pub fn as_i16(self) -> i16 {
        match self {
            Polarity::Like => 1,
            Polarity::Dislike => -1,
        }
    }

    pub fn counter_column(self) -> &'static str {
        match self {
            Polarity::Like => "like_count",
            Polarity::Dislike => "dislike_count",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Like => write!(f, "like"),
            Polarity::Dislike => write!(f, "dislike"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    pub fn table(self) -> &'static str {
        match self {
            TargetKind::Post => "posts",
            TargetKind::Comment => "comments",
        }
    }

    pub fn reaction_table(self) -> &'static str {
        match self {
            TargetKind::Post => "post_reactions",
            TargetKind::Comment => "comment_reactions",
        }
    }

    pub fn reaction_key(self) -> &'static str {
        match self {
            TargetKind::Post => "post_id",
            TargetKind::Comment => "comment_id",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Post => write!(f, "Post"),
            TargetKind::Comment => write!(f, "Comment"),
        }
    }
}

/// The post or comment a reaction is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub id: Uuid,
}

impl Target {
    pub fn post(id: Uuid) -> Self {
        Self {
            kind: TargetKind::Post,
            id,
        }
    }

    pub fn comment(id: Uuid) -> Self {
        Self {
            kind: TargetKind::Comment,
            id,
        }
    }
}

/// A single user's reaction on a single target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ReactionState {
    #[default]
    None,
    Liked,
    Disliked,
}

impl ReactionState {
    /// Toggle semantics: repeating a reaction removes it, the opposite
    /// reaction replaces it.
    pub fn apply(self, polarity: Polarity) -> Self {
        match (self, polarity) {
            (ReactionState::Liked, Polarity::Like) => ReactionState::None,
            (ReactionState::Disliked, Polarity::Dislike) => ReactionState::None,
            (_, polarity) => polarity.into(),
        }
    }
}

impl From<Polarity> for ReactionState {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Like => ReactionState::Liked,
            Polarity::Dislike => ReactionState::Disliked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        use Polarity::*;
        use ReactionState as S;

        assert_eq!(S::None.apply(Like), S::Liked);
        assert_eq!(S::None.apply(Dislike), S::Disliked);
        assert_eq!(S::Liked.apply(Like), S::None);
        assert_eq!(S::Liked.apply(Dislike), S::Disliked);
        assert_eq!(S::Disliked.apply(Like), S::Liked);
        assert_eq!(S::Disliked.apply(Dislike), S::None);
    }

    #[test]
    fn opposite_is_an_involution() {
        assert_eq!(Polarity::Like.opposite(), Polarity::Dislike);
        assert_eq!(Polarity::Like.opposite().opposite(), Polarity::Like);
    }

    #[test]
    fn polarity_storage_values() {
        assert_eq!(Polarity::Like.as_i16(), 1);
        assert_eq!(Polarity::Dislike.as_i16(), -1);
        assert_eq!(Polarity::Dislike.counter_column(), "dislike_count");
    }
}
