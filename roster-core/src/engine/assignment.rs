//! Reviewer selection for newly opened pull requests

use chrono::Utc;

use super::{shuffled, Engine};
use crate::models::{Member, NewPullRequest, PrStatus, PullRequest, REVIEWER_CAPACITY};
use crate::store::{PullRequestRow, Store, StoreTx};
use crate::{Error, Result};

impl<S: Store> Engine<S> {
    /// Open a pull request and link up to two random teammates of the author
    pub async fn create_pr(&self, request: NewPullRequest) -> Result<PullRequest> {
        request.validate()?;

        self.transaction("create_pr", |mut tx| async move {
            let result = create_pr_in(&mut tx, &request).await;
            (tx, result)
        })
        .await
    }
}

async fn create_pr_in<Tx: StoreTx>(tx: &mut Tx, request: &NewPullRequest) -> Result<PullRequest> {
    if tx.get_user(&request.author_id).await?.is_none() {
        tracing::warn!(
            op = "create_pr",
            pr_id = %request.id,
            author_id = %request.author_id,
            "Author not found"
        );
        return Err(Error::UserNotFound(request.author_id.clone()));
    }

    let row = PullRequestRow {
        id: request.id.clone(),
        title: request.title.clone(),
        author_id: request.author_id.clone(),
        status: PrStatus::Open,
        need_more_reviewers: true,
        created_at: Utc::now(),
    };
    tx.insert_pull_request(&row).await.inspect_err(|e| {
        if matches!(e, Error::PrAlreadyExists(_)) {
            tracing::warn!(op = "create_pr", pr_id = %request.id, "Pull request already exists");
        }
    })?;

    let teammates = tx.eligible_members(&request.id, None).await?;
    tracing::debug!(
        op = "create_pr",
        pr_id = %request.id,
        teammates = teammates.len(),
        "Loaded candidate teammates"
    );

    let linked = link_up_to(tx, &request.id, shuffled(teammates), REVIEWER_CAPACITY).await?;

    let pr = sync_need_more_reviewers(tx, &request.id).await?;
    tracing::debug!(
        op = "create_pr",
        pr_id = %pr.id,
        reviewers = linked.len(),
        need_more_reviewers = pr.need_more_reviewers,
        "Pull request created"
    );

    Ok(pr)
}

/// Try-link loop over an already shuffled pool.
///
/// Each round links the first candidate the store accepts; candidates the
/// store skipped (linked by someone else) are dropped from the pool along
/// with the winner. Stops at `slots` links or when the store links nobody.
pub(super) async fn link_up_to<Tx: StoreTx>(
    tx: &mut Tx,
    pr_id: &str,
    mut pool: Vec<Member>,
    slots: usize,
) -> Result<Vec<String>> {
    let mut linked = Vec::with_capacity(slots);

    while linked.len() < slots && !pool.is_empty() {
        let Some(user_id) = tx.link_reviewer(pr_id, &pool).await? else {
            break;
        };

        match pool.iter().position(|m| m.user_id == user_id) {
            Some(pos) => {
                pool.drain(..=pos);
            }
            None => pool.clear(),
        }
        linked.push(user_id);
    }

    Ok(linked)
}

/// Reload the PR and make `need_more_reviewers` match its link count
pub(super) async fn sync_need_more_reviewers<Tx: StoreTx>(
    tx: &mut Tx,
    pr_id: &str,
) -> Result<PullRequest> {
    let mut pr = tx
        .get_pull_request(pr_id)
        .await?
        .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))?;

    let expected = pr.expected_need_more_reviewers();
    if pr.is_open() && pr.need_more_reviewers != expected {
        if !tx.set_need_more_reviewers(pr_id, expected).await? {
            return Err(Error::PrNotFound(pr_id.to_string()));
        }
        pr.need_more_reviewers = expected;
    }

    Ok(pr)
}
