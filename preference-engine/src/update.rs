//! The incremental preference update algorithm.
//!
//! A rating event contributes a confidence-weighted pull toward the
//! item's vector, accumulated into `behavioral_embedding` as a weighted
//! running average. The running average (rather than a gradient step)
//! is deliberate: it is exactly invertible, so deletes and updates can
//! undo earlier inserts without replaying history.
//!
//! Pure functions over explicit state; no I/O.

use crate::error::{UpdateError, UpdateResult};
use crate::math;
use crate::models::{ItemVector, Operation, PreferenceState, RatingMutation, SkipReason};

/// Weight sums at or below this are treated as empty (last live rating
/// removed) and reset the behavioral signal.
const WEIGHT_EPSILON: f32 = 1e-6;

/// Outcome of applying a mutation to a preference state.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(PreferenceState),
    Skipped(SkipReason),
}

/// Confidence weight of a rating value, U-shaped over 1..=5.
///
/// Extreme opinions (1, 5) are stronger behavioral signal than lukewarm
/// ones (3).
pub fn confidence(rating: u8) -> f32 {
    match rating {
        1 | 5 => 1.0,
        2 | 4 => 0.7,
        3 => 0.3,
        _ => 0.0,
    }
}

/// Signed signal of a rating value: `t(r) = (r - 3) / 2`, in [-1, 1].
pub fn signal(rating: u8) -> f32 {
    (rating as f32 - 3.0) / 2.0
}

/// Apply a rating mutation to a user's preference state.
///
/// Returns `Skipped` when the item has no embedding yet (enrichment is
/// an external collaborator; the job completes as a no-op until the
/// vector appears). Fails with [`UpdateError::IncompleteState`] when the
/// user has no interest baseline, and with
/// [`UpdateError::DimensionMismatch`] when participating vectors
/// disagree on dimensionality.
pub fn apply(
    state: &PreferenceState,
    mutation: &RatingMutation,
    item: &ItemVector,
) -> UpdateResult<UpdateOutcome> {
    let interest = state
        .interest_embedding
        .as_ref()
        .ok_or(UpdateError::IncompleteState)?;

    let item_embedding = match &item.embedding {
        Some(embedding) => embedding,
        None => return Ok(UpdateOutcome::Skipped(SkipReason::ItemNotEnriched)),
    };

    math::ensure_dim(interest.len(), item_embedding.len())?;
    if let Some(behavioral) = &state.behavioral_embedding {
        math::ensure_dim(interest.len(), behavioral.len())?;
    }

    let (behavioral, weight_sum, rating_count) = match mutation.operation {
        Operation::Insert { rating } => accumulate(
            state.behavioral_embedding.as_deref(),
            state.behavioral_weight_sum,
            state.rating_count,
            item_embedding,
            confidence(rating),
            Signed::Insert,
        ),
        Operation::Delete { old_rating } => accumulate(
            state.behavioral_embedding.as_deref(),
            state.behavioral_weight_sum,
            state.rating_count,
            item_embedding,
            confidence(old_rating),
            Signed::Delete,
        ),
        // delete(old) composed with insert(new) against the same item,
        // returned as one state so the caller persists a single write.
        Operation::Update { rating, old_rating } => {
            let (behavioral, weight_sum, rating_count) = accumulate(
                state.behavioral_embedding.as_deref(),
                state.behavioral_weight_sum,
                state.rating_count,
                item_embedding,
                confidence(old_rating),
                Signed::Delete,
            );
            accumulate(
                behavioral.as_deref(),
                weight_sum,
                rating_count,
                item_embedding,
                confidence(rating),
                Signed::Insert,
            )
        }
    };

    let profile_embedding = recompute_profile(interest, behavioral.as_deref(), rating_count)?;

    Ok(UpdateOutcome::Updated(PreferenceState {
        interest_embedding: state.interest_embedding.clone(),
        behavioral_embedding: behavioral,
        behavioral_weight_sum: weight_sum,
        rating_count,
        profile_embedding,
    }))
}

enum Signed {
    Insert,
    Delete,
}

/// One step of the weighted running average.
///
/// `new = (old * old_weight + w * item) / (old_weight + w)` with a null
/// behavioral treated as the zero vector at weight 0. A non-positive
/// resulting weight (deleting the only live rating) resets the signal.
fn accumulate(
    behavioral: Option<&[f32]>,
    weight_sum: f32,
    rating_count: u32,
    item_embedding: &[f32],
    confidence: f32,
    sign: Signed,
) -> (Option<Vec<f32>>, f32, u32) {
    let w = match sign {
        Signed::Insert => confidence,
        Signed::Delete => -confidence,
    };
    let new_weight_sum = weight_sum + w;

    if new_weight_sum <= WEIGHT_EPSILON {
        return (None, 0.0, 0);
    }

    let new_behavioral: Vec<f32> = match behavioral {
        Some(prev) => prev
            .iter()
            .zip(item_embedding.iter())
            .map(|(b, x)| (b * weight_sum + w * x) / new_weight_sum)
            .collect(),
        None => item_embedding
            .iter()
            .map(|x| w * x / new_weight_sum)
            .collect(),
    };

    let new_rating_count = match sign {
        Signed::Insert => rating_count + 1,
        Signed::Delete => rating_count.saturating_sub(1),
    };

    (Some(new_behavioral), new_weight_sum, new_rating_count)
}

/// Deterministic profile blend: the interest baseline alone for a cold
/// user, otherwise a normalized mix that shifts toward the behavioral
/// signal as the rating history grows.
fn recompute_profile(
    interest: &[f32],
    behavioral: Option<&[f32]>,
    rating_count: u32,
) -> UpdateResult<Vec<f32>> {
    match behavioral {
        Some(behavioral) if rating_count > 0 => {
            let beta = math::blend_weight(rating_count);
            let mut profile = math::blend(interest, behavioral, beta)?;
            math::normalize(&mut profile);
            Ok(profile)
        }
        _ => Ok(interest.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use uuid::Uuid;

    const TOLERANCE: f32 = 1e-5;

    fn item(item_id: i64, embedding: Vec<f32>) -> ItemVector {
        ItemVector {
            item_id,
            embedding: Some(embedding),
            genre_tags: vec![],
        }
    }

    fn mutation(operation: Operation) -> RatingMutation {
        RatingMutation {
            user_id: Uuid::new_v4(),
            item_id: 1,
            operation,
        }
    }

    fn state_2d() -> PreferenceState {
        PreferenceState::onboarded(vec![1.0, 1.0])
    }

    fn apply_ok(state: &PreferenceState, op: Operation, item: &ItemVector) -> PreferenceState {
        match apply(state, &mutation(op), item).unwrap() {
            UpdateOutcome::Updated(next) => next,
            UpdateOutcome::Skipped(reason) => panic!("unexpected skip: {:?}", reason),
        }
    }

    fn assert_vec_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < TOLERANCE, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_confidence_map_is_u_shaped() {
        assert_eq!(confidence(1), 1.0);
        assert_eq!(confidence(2), 0.7);
        assert_eq!(confidence(3), 0.3);
        assert_eq!(confidence(4), 0.7);
        assert_eq!(confidence(5), 1.0);
    }

    #[test]
    fn test_signal_normalization() {
        assert_eq!(signal(1), -1.0);
        assert_eq!(signal(3), 0.0);
        assert_eq!(signal(5), 1.0);
        assert_eq!(signal(4), 0.5);
    }

    // Scenario A: first insert adopts the item vector at full weight.
    #[test]
    fn test_first_insert_adopts_item_vector() {
        let next = apply_ok(
            &state_2d(),
            Operation::Insert { rating: 5 },
            &item(10, vec![1.0, 0.0]),
        );

        assert!((next.behavioral_weight_sum - 1.0).abs() < TOLERANCE);
        assert_eq!(next.rating_count, 1);
        assert_vec_close(next.behavioral_embedding.as_ref().unwrap(), &[1.0, 0.0]);
    }

    // Scenario B: second full-confidence insert averages the two items.
    #[test]
    fn test_second_insert_averages() {
        let after_x = apply_ok(
            &state_2d(),
            Operation::Insert { rating: 5 },
            &item(10, vec![1.0, 0.0]),
        );
        let after_y = apply_ok(
            &after_x,
            Operation::Insert { rating: 1 },
            &item(11, vec![0.0, 1.0]),
        );

        assert!((after_y.behavioral_weight_sum - 2.0).abs() < TOLERANCE);
        assert_eq!(after_y.rating_count, 2);
        assert_vec_close(after_y.behavioral_embedding.as_ref().unwrap(), &[0.5, 0.5]);
    }

    // Scenario C: deleting the rating on X leaves Y's vector alone.
    #[test]
    fn test_delete_removes_contribution() {
        let after_x = apply_ok(
            &state_2d(),
            Operation::Insert { rating: 5 },
            &item(10, vec![1.0, 0.0]),
        );
        let after_y = apply_ok(
            &after_x,
            Operation::Insert { rating: 1 },
            &item(11, vec![0.0, 1.0]),
        );
        let after_delete = apply_ok(
            &after_y,
            Operation::Delete { old_rating: 5 },
            &item(10, vec![1.0, 0.0]),
        );

        assert!((after_delete.behavioral_weight_sum - 1.0).abs() < TOLERANCE);
        assert_eq!(after_delete.rating_count, 1);
        assert_vec_close(
            after_delete.behavioral_embedding.as_ref().unwrap(),
            &[0.0, 1.0],
        );
    }

    #[test]
    fn test_insert_then_delete_is_invertible() {
        let before = apply_ok(
            &state_2d(),
            Operation::Insert { rating: 4 },
            &item(10, vec![0.2, 0.9]),
        );

        for rating in 1..=5u8 {
            let inserted = apply_ok(
                &before,
                Operation::Insert { rating },
                &item(11, vec![0.7, -0.3]),
            );
            let restored = apply_ok(
                &inserted,
                Operation::Delete { old_rating: rating },
                &item(11, vec![0.7, -0.3]),
            );

            assert!(
                (restored.behavioral_weight_sum - before.behavioral_weight_sum).abs() < TOLERANCE
            );
            assert_eq!(restored.rating_count, before.rating_count);
            assert_vec_close(
                restored.behavioral_embedding.as_ref().unwrap(),
                before.behavioral_embedding.as_ref().unwrap(),
            );
        }
    }

    #[test]
    fn test_deleting_only_rating_resets_signal() {
        let inserted = apply_ok(
            &state_2d(),
            Operation::Insert { rating: 3 },
            &item(10, vec![0.4, 0.6]),
        );
        let reset = apply_ok(
            &inserted,
            Operation::Delete { old_rating: 3 },
            &item(10, vec![0.4, 0.6]),
        );

        assert!(reset.behavioral_embedding.is_none());
        assert_eq!(reset.behavioral_weight_sum, 0.0);
        assert_eq!(reset.rating_count, 0);
        assert_eq!(reset.profile_embedding, vec![1.0, 1.0]);
    }

    #[test]
    fn test_update_equals_delete_then_insert() {
        let base = apply_ok(
            &apply_ok(
                &state_2d(),
                Operation::Insert { rating: 5 },
                &item(10, vec![1.0, 0.0]),
            ),
            Operation::Insert { rating: 2 },
            &item(11, vec![0.0, 1.0]),
        );

        let composed = apply_ok(
            &apply_ok(
                &base,
                Operation::Delete { old_rating: 2 },
                &item(11, vec![0.0, 1.0]),
            ),
            Operation::Insert { rating: 4 },
            &item(11, vec![0.0, 1.0]),
        );
        let updated = apply_ok(
            &base,
            Operation::Update {
                rating: 4,
                old_rating: 2,
            },
            &item(11, vec![0.0, 1.0]),
        );

        assert!((composed.behavioral_weight_sum - updated.behavioral_weight_sum).abs() < TOLERANCE);
        assert_eq!(composed.rating_count, updated.rating_count);
        assert_vec_close(
            composed.behavioral_embedding.as_ref().unwrap(),
            updated.behavioral_embedding.as_ref().unwrap(),
        );
        assert_vec_close(&composed.profile_embedding, &updated.profile_embedding);
    }

    #[test]
    fn test_update_preserves_rating_count() {
        let base = apply_ok(
            &state_2d(),
            Operation::Insert { rating: 3 },
            &item(10, vec![1.0, 0.0]),
        );
        let updated = apply_ok(
            &base,
            Operation::Update {
                rating: 5,
                old_rating: 3,
            },
            &item(10, vec![1.0, 0.0]),
        );
        assert_eq!(updated.rating_count, 1);
        assert!((updated.behavioral_weight_sum - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_weight_sum_is_sum_of_confidences() {
        let mut rng = rand::thread_rng();
        let mut state = state_2d();
        let mut expected = 0.0f32;

        for i in 0..50 {
            let rating: u8 = rng.gen_range(1..=5);
            expected += confidence(rating);
            state = apply_ok(
                &state,
                Operation::Insert { rating },
                &item(i, vec![rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)]),
            );
        }

        assert!((state.behavioral_weight_sum - expected).abs() < 1e-3);
        assert_eq!(state.rating_count, 50);
    }

    #[test]
    fn test_cold_start_profile_equals_interest() {
        let state = PreferenceState::onboarded(vec![0.3, 0.7]);
        assert_eq!(state.rating_count, 0);
        assert_eq!(state.profile_embedding, vec![0.3, 0.7]);
    }

    #[test]
    fn test_profile_is_unit_length_after_update() {
        let next = apply_ok(
            &state_2d(),
            Operation::Insert { rating: 5 },
            &item(10, vec![0.0, 3.0]),
        );
        assert!((math::l2_norm(&next.profile_embedding) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_unenriched_item_skips() {
        let bare = ItemVector {
            item_id: 10,
            embedding: None,
            genre_tags: vec![],
        };
        let outcome = apply(&state_2d(), &mutation(Operation::Insert { rating: 5 }), &bare);
        assert_eq!(
            outcome.unwrap(),
            UpdateOutcome::Skipped(SkipReason::ItemNotEnriched)
        );
    }

    #[test]
    fn test_missing_interest_baseline_is_an_error() {
        let state = PreferenceState {
            interest_embedding: None,
            behavioral_embedding: None,
            behavioral_weight_sum: 0.0,
            rating_count: 0,
            profile_embedding: vec![],
        };
        let err = apply(
            &state,
            &mutation(Operation::Insert { rating: 5 }),
            &item(10, vec![1.0, 0.0]),
        )
        .unwrap_err();
        assert_eq!(err, UpdateError::IncompleteState);
    }

    #[test]
    fn test_dimension_mismatch_is_fatal() {
        let err = apply(
            &state_2d(),
            &mutation(Operation::Insert { rating: 5 }),
            &item(10, vec![1.0, 0.0, 0.0]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            UpdateError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }
}
