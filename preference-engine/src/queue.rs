//! The recompute queue contract.
//!
//! The in-process transport is a bounded tokio mpsc channel; what this
//! module owns is the *contract*: one job per committed mutation,
//! boundary validation, and same-user FIFO ordering (guaranteed by
//! construction — single channel, single consumer). Durability is an
//! external transport concern.

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::error::EnqueueError;
use crate::models::{RatingMutation, RecomputeJob};

/// Producer handle for the recompute queue.
///
/// Enqueue is synchronous with the triggering mutation; the caller does
/// not wait for recomputation to finish. Cloneable so every mutation
/// site can hold a handle.
#[derive(Clone)]
pub struct RecomputeQueue {
    tx: mpsc::Sender<RecomputeJob>,
}

impl RecomputeQueue {
    /// Create a queue with the given capacity, returning the producer
    /// handle and the receiver to hand to [`crate::worker::RecomputeWorker::run`].
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<RecomputeJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Validate and enqueue one job for a committed rating mutation.
    ///
    /// Returns the job id on success.
    ///
    /// # Errors
    ///
    /// `EnqueueError::Invalid` if the mutation fails boundary validation
    /// or the credential is empty; `EnqueueError::Closed` if the worker
    /// side has shut down.
    pub async fn enqueue(
        &self,
        mutation: RatingMutation,
        credential: String,
    ) -> Result<Uuid, EnqueueError> {
        mutation.validate()?;
        if credential.is_empty() {
            return Err(EnqueueError::Invalid("empty credential".to_string()));
        }

        let job = RecomputeJob::new(mutation, credential);
        let job_id = job.id;
        let key = job.key.clone();

        self.tx
            .send(job)
            .await
            .map_err(|_| EnqueueError::Closed)?;

        debug!(job_id = %job_id, key = %key, "recompute job enqueued");
        Ok(job_id)
    }

    /// Drop this producer handle. The channel closes only once every
    /// cloned handle has been dropped; the worker then drains the
    /// remaining jobs and exits its loop.
    pub fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;

    fn mutation(operation: Operation) -> RatingMutation {
        RatingMutation {
            user_id: Uuid::new_v4(),
            item_id: 7,
            operation,
        }
    }

    #[tokio::test]
    async fn test_enqueue_preserves_order() {
        let (queue, mut rx) = RecomputeQueue::bounded(16);

        for rating in 1..=3u8 {
            queue
                .enqueue(mutation(Operation::Insert { rating }), "token".into())
                .await
                .unwrap();
        }

        for rating in 1..=3u8 {
            let job = rx.recv().await.unwrap();
            assert_eq!(job.mutation.operation, Operation::Insert { rating });
        }
    }

    #[tokio::test]
    async fn test_invalid_mutation_rejected_at_boundary() {
        let (queue, _rx) = RecomputeQueue::bounded(16);
        let err = queue
            .enqueue(mutation(Operation::Insert { rating: 6 }), "token".into())
            .await
            .unwrap_err();
        assert!(matches!(err, EnqueueError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_empty_credential_rejected() {
        let (queue, _rx) = RecomputeQueue::bounded(16);
        let err = queue
            .enqueue(mutation(Operation::Insert { rating: 5 }), String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EnqueueError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_channel_stays_open_while_cloned_handles_live() {
        let (queue, mut rx) = RecomputeQueue::bounded(16);
        let cloned = queue.clone();

        // Closing one handle does not shut the channel
        queue.close();
        cloned
            .enqueue(mutation(Operation::Insert { rating: 5 }), "token".into())
            .await
            .unwrap();

        // Dropping the last handle does
        cloned.close();
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_enqueue_after_receiver_dropped_is_closed() {
        let (queue, rx) = RecomputeQueue::bounded(16);
        drop(rx);
        let err = queue
            .enqueue(mutation(Operation::Insert { rating: 5 }), "token".into())
            .await
            .unwrap_err();
        assert!(matches!(err, EnqueueError::Closed));
    }
}
