//! Reviewer assignment and membership reconciliation engine
//!
//! Every public operation runs inside exactly one store transaction. The
//! body takes the transaction by value and hands it back with its result;
//! `Ok` commits and `Err` rolls back. When the future is cancelled or times
//! out the store rolls back on drop. Pure reads use a snapshot that does
//! not queue behind writers.

mod assignment;
mod lifecycle;
mod reassignment;
mod reconcile;
mod stats;

use std::future::Future;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::EngineConfig;
use crate::store::{Store, StoreTx};
use crate::{Error, Result};

/// Engine over a transactional store
pub struct Engine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `body` in a fresh write transaction under the configured deadline
    async fn transaction<T, F, Fut>(&self, op: &'static str, body: F) -> Result<T>
    where
        F: FnOnce(S::Tx) -> Fut,
        Fut: Future<Output = (S::Tx, Result<T>)>,
    {
        self.scoped(op, false, body).await
    }

    /// Like [`Engine::transaction`] but on a read-only snapshot that does
    /// not wait for the write lock
    async fn snapshot<T, F, Fut>(&self, op: &'static str, body: F) -> Result<T>
    where
        F: FnOnce(S::Tx) -> Fut,
        Fut: Future<Output = (S::Tx, Result<T>)>,
    {
        self.scoped(op, true, body).await
    }

    /// The deadline covers begin and body only. Once the body has finished
    /// the outcome is settled without a deadline, so a commit that lands is
    /// never reported as a timeout.
    async fn scoped<T, F, Fut>(&self, op: &'static str, read_only: bool, body: F) -> Result<T>
    where
        F: FnOnce(S::Tx) -> Fut,
        Fut: Future<Output = (S::Tx, Result<T>)>,
    {
        let work = async {
            let begun = if read_only {
                self.store.begin_read().await
            } else {
                self.store.begin().await
            };
            let tx = begun.inspect_err(|e| {
                tracing::error!(op, error = %e, "Failed to begin transaction");
            })?;
            Ok::<_, Error>(body(tx).await)
        };

        let (tx, result) = match self.config.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(finished) => finished?,
                Err(_) => {
                    tracing::error!(op, timeout = ?limit, "Operation deadline exceeded, rolled back");
                    return Err(Error::Timeout(limit));
                }
            },
            None => work.await?,
        };

        settle(op, tx, result).await
    }
}

/// Commit on success, roll back on failure
async fn settle<Tx: StoreTx, T>(op: &'static str, tx: Tx, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit().await.inspect_err(|e| {
                tracing::error!(op, error = %e, "Failed to commit transaction");
            })?;
            Ok(value)
        }
        Err(err) => {
            if err.is_internal() {
                tracing::error!(op, error = %err, "Operation failed, rolled back");
            }
            if let Err(rb) = tx.rollback().await {
                tracing::error!(op, error = %rb, "Failed to roll back transaction");
            }
            Err(err)
        }
    }
}

/// Fresh generator per call; no shuffle state outlives an operation
fn shuffled<T>(mut items: Vec<T>) -> Vec<T> {
    let mut rng = StdRng::from_entropy();
    items.shuffle(&mut rng);
    items
}
