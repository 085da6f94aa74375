//! Open -> Merged transition

use chrono::Utc;

use super::Engine;
use crate::models::{require, PrStatus, PullRequest};
use crate::store::{Store, StoreTx};
use crate::{Error, Result};

impl<S: Store> Engine<S> {
    /// Mark a pull request merged. Merging a merged PR returns it unchanged,
    /// including its original `merged_at`.
    pub async fn merge_pr(&self, pr_id: &str) -> Result<PullRequest> {
        require("pull_request_id", pr_id)?;

        self.transaction("merge_pr", |mut tx| async move {
            let result = merge_in(&mut tx, pr_id).await;
            (tx, result)
        })
        .await
    }
}

async fn merge_in<Tx: StoreTx>(tx: &mut Tx, pr_id: &str) -> Result<PullRequest> {
    let Some(pr) = tx.get_pull_request(pr_id).await? else {
        tracing::warn!(op = "merge_pr", pr_id, "Pull request not found");
        return Err(Error::PrNotFound(pr_id.to_string()));
    };

    if !pr.status.can_transition_to(PrStatus::Merged) {
        tracing::warn!(op = "merge_pr", pr_id, "Pull request is already merged");
        return Ok(pr);
    }

    if !tx.mark_merged(pr_id, Utc::now()).await? {
        // Lost a race: re-read and report whatever is there now
        tracing::warn!(op = "merge_pr", pr_id, "Pull request changed while merging");
    }

    let merged = tx
        .get_pull_request(pr_id)
        .await?
        .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))?;

    tracing::debug!(op = "merge_pr", pr_id, merged_at = ?merged.merged_at, "Pull request merged");
    Ok(merged)
}
