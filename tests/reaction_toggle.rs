use forum::{
    error::AppError,
    models::{Polarity, ReactionState, Target},
    repository::{MemoryRepository, memory::Counters},
    services::reaction_service::apply_reaction,
};
use uuid::Uuid;

fn counters(like: i32, dislike: i32) -> Counters {
    Counters { like, dislike }
}

fn setup() -> (MemoryRepository, Target) {
    let mut repo = MemoryRepository::new();
    let target = Target::post(Uuid::new_v4());
    repo.add_target(target);
    (repo, target)
}

#[tokio::test]
async fn like_twice_restores_counters() {
    let (mut repo, post) = setup();
    let user = Uuid::new_v4();

    let state = apply_reaction(&mut repo, user, post, Polarity::Like).await.unwrap();
    assert_eq!(state, ReactionState::Liked);
    assert_eq!(repo.counters(post), Some(counters(1, 0)));

    let state = apply_reaction(&mut repo, user, post, Polarity::Like).await.unwrap();
    assert_eq!(state, ReactionState::None);
    assert_eq!(repo.counters(post), Some(counters(0, 0)));
    assert_eq!(repo.reaction(post, user), None);
}

#[tokio::test]
async fn opposite_reaction_replaces_existing_one() {
    let (mut repo, post) = setup();
    let user = Uuid::new_v4();

    apply_reaction(&mut repo, user, post, Polarity::Dislike).await.unwrap();
    assert_eq!(repo.counters(post), Some(counters(0, 1)));

    let state = apply_reaction(&mut repo, user, post, Polarity::Like).await.unwrap();
    assert_eq!(state, ReactionState::Liked);
    assert_eq!(repo.counters(post), Some(counters(1, 0)));
    assert_eq!(repo.reaction(post, user), Some(Polarity::Like));
    assert_eq!(repo.reaction_count(post, Polarity::Dislike), 0);
}

#[tokio::test]
async fn two_users_scenario() {
    let (mut repo, post) = setup();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    apply_reaction(&mut repo, alice, post, Polarity::Like).await.unwrap();
    assert_eq!(repo.counters(post), Some(counters(1, 0)));

    apply_reaction(&mut repo, alice, post, Polarity::Like).await.unwrap();
    assert_eq!(repo.counters(post), Some(counters(0, 0)));

    apply_reaction(&mut repo, alice, post, Polarity::Dislike).await.unwrap();
    assert_eq!(repo.counters(post), Some(counters(0, 1)));

    apply_reaction(&mut repo, bob, post, Polarity::Dislike).await.unwrap();
    assert_eq!(repo.counters(post), Some(counters(0, 2)));

    apply_reaction(&mut repo, alice, post, Polarity::Like).await.unwrap();
    assert_eq!(repo.counters(post), Some(counters(1, 1)));
    assert_eq!(repo.reaction(post, alice), Some(Polarity::Like));
    assert_eq!(repo.reaction(post, bob), Some(Polarity::Dislike));
}

// Every sequence of up to four reactions from one user
#[tokio::test]
async fn counters_follow_the_toggle_table() {
    let choices = [Polarity::Like, Polarity::Dislike];

    for len in 1..=4u32 {
        for mask in 0..(1u32 << len) {
            let sequence: Vec<Polarity> = (0..len)
                .map(|i| choices[((mask >> i) & 1) as usize])
                .collect();

            let (mut repo, post) = setup();
            let user = Uuid::new_v4();
            let mut expected = ReactionState::None;

            for &polarity in &sequence {
                let state = apply_reaction(&mut repo, user, post, polarity).await.unwrap();
                expected = expected.apply(polarity);
                assert_eq!(state, expected, "sequence {:?}", sequence);
            }

            let want = match expected {
                ReactionState::None => counters(0, 0),
                ReactionState::Liked => counters(1, 0),
                ReactionState::Disliked => counters(0, 1),
            };
            assert_eq!(repo.counters(post), Some(want), "sequence {:?}", sequence);
            assert_eq!(
                repo.reaction_count(post, Polarity::Like) as i32,
                want.like
            );
            assert_eq!(
                repo.reaction_count(post, Polarity::Dislike) as i32,
                want.dislike
            );
        }
    }
}

#[tokio::test]
async fn unknown_target_is_not_found() {
    let mut repo = MemoryRepository::new();
    let missing = Target::comment(Uuid::new_v4());

    let err = apply_reaction(&mut repo, Uuid::new_v4(), missing, Polarity::Like)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(ref message) if message == "Comment not found"));
    assert_eq!(repo.reaction_count(missing, Polarity::Like), 0);
}

#[tokio::test]
async fn comments_and_posts_are_counted_separately() {
    let mut repo = MemoryRepository::new();
    let id = Uuid::new_v4();
    let post = Target::post(id);
    let comment = Target::comment(id);
    repo.add_target(post);
    repo.add_target(comment);

    let user = Uuid::new_v4();
    apply_reaction(&mut repo, user, comment, Polarity::Dislike).await.unwrap();
    apply_reaction(&mut repo, user, post, Polarity::Like).await.unwrap();

    assert_eq!(repo.counters(comment), Some(counters(0, 1)));
    assert_eq!(repo.counters(post), Some(counters(1, 0)));
    assert_eq!(repo.reaction(comment, user), Some(Polarity::Dislike));
}
