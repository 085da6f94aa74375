//! Swapping one reviewer for another member of their team

use super::{shuffled, Engine};
use crate::models::{require, Reassignment};
use crate::store::{Store, StoreTx};
use crate::{Error, Result};

impl<S: Store> Engine<S> {
    /// Replace `old_reviewer_id` on `pr_id` with a random active teammate of
    /// theirs. On any failure the old link is left in place.
    pub async fn reassign_pr(&self, pr_id: &str, old_reviewer_id: &str) -> Result<Reassignment> {
        require("pull_request_id", pr_id)?;
        require("old_reviewer_id", old_reviewer_id)?;

        self.transaction("reassign_pr", |mut tx| async move {
            let result = reassign_in(&mut tx, pr_id, old_reviewer_id).await;
            (tx, result)
        })
        .await
    }
}

async fn reassign_in<Tx: StoreTx>(
    tx: &mut Tx,
    pr_id: &str,
    old_reviewer_id: &str,
) -> Result<Reassignment> {
    let Some(pr) = tx.get_pull_request(pr_id).await? else {
        tracing::warn!(op = "reassign_pr", pr_id, "Pull request not found");
        return Err(Error::PrNotFound(pr_id.to_string()));
    };

    if pr.status.is_terminal() {
        tracing::warn!(op = "reassign_pr", pr_id, "Pull request already merged");
        return Err(Error::PrMerged(pr_id.to_string()));
    }

    if !tx.is_reviewer(pr_id, old_reviewer_id).await? {
        tracing::warn!(
            op = "reassign_pr",
            pr_id,
            user_id = old_reviewer_id,
            "User is not a reviewer of this pull request"
        );
        return Err(Error::UserNotReviewerOfPr {
            pr_id: pr_id.to_string(),
            user_id: old_reviewer_id.to_string(),
        });
    }

    let candidates = tx.replacement_candidates(pr_id, old_reviewer_id).await?;
    if candidates.is_empty() {
        tracing::warn!(op = "reassign_pr", pr_id, user_id = old_reviewer_id, "No candidates to assign");
        return Err(Error::NoCandidatesToAssign(pr_id.to_string()));
    }

    // Free the slot first so the capacity check admits the replacement
    tx.unlink_reviewer(pr_id, old_reviewer_id).await?;

    let Some(replaced_by) = tx.link_reviewer(pr_id, &shuffled(candidates)).await? else {
        tracing::warn!(op = "reassign_pr", pr_id, "Every candidate was taken concurrently");
        return Err(Error::NoCandidatesToAssign(pr_id.to_string()));
    };

    let pull_request = tx
        .get_pull_request(pr_id)
        .await?
        .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))?;

    tracing::debug!(
        op = "reassign_pr",
        pr_id,
        old_reviewer_id,
        new_reviewer_id = %replaced_by,
        "Reviewer reassigned"
    );

    Ok(Reassignment {
        pull_request,
        replaced_by,
    })
}
