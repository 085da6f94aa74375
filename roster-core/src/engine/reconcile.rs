//! Team membership writes and the deactivation cascade
//!
//! When a member becomes inactive their links on open pull requests are
//! removed and each affected PR gets one shot at a replacement from the
//! author's team. Merged PRs keep their reviewers. The cascade is a flat
//! members x affected-PRs loop inside the membership transaction.

use super::assignment::{link_up_to, sync_need_more_reviewers};
use super::{shuffled, Engine};
use crate::models::{require, NewTeam, Team, TeamWithMembers, User};
use crate::store::{Store, StoreTx};
use crate::{Error, Result};

impl<S: Store> Engine<S> {
    /// Create a team and upsert its members, reconciling every member
    /// written as inactive. All of it commits or none of it does.
    pub async fn create_team(&self, request: NewTeam) -> Result<TeamWithMembers> {
        request.validate()?;

        self.transaction("create_team", |mut tx| async move {
            let result = create_team_in(&mut tx, request).await;
            (tx, result)
        })
        .await
    }

    /// Flip a user's activity flag; deactivation runs the cascade
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        require("user_id", user_id)?;

        self.transaction("set_user_active", |mut tx| async move {
            let result = set_user_active_in(&mut tx, user_id, is_active).await;
            (tx, result)
        })
        .await
    }
}

async fn create_team_in<Tx: StoreTx>(tx: &mut Tx, request: NewTeam) -> Result<TeamWithMembers> {
    let team = Team {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.team_name.clone(),
    };

    tx.create_team(&team).await.inspect_err(|e| {
        if matches!(e, Error::TeamAlreadyExists(_)) {
            tracing::warn!(op = "create_team", team_name = %team.name, "Team already exists");
        }
    })?;

    tx.upsert_members(&team.id, &request.members).await.inspect_err(|e| {
        if matches!(e, Error::UsernameAlreadyExists(_)) {
            tracing::warn!(op = "create_team", team_name = %team.name, error = %e, "Username already taken");
        } else {
            tracing::error!(op = "create_team", team_name = %team.name, error = %e, "Failed to write members");
        }
    })?;

    for member in request.inactive_members() {
        reconcile_member(tx, &member.user_id).await?;
    }

    tracing::debug!(
        op = "create_team",
        team_name = %team.name,
        members = request.members.len(),
        "Team created"
    );

    Ok(TeamWithMembers {
        team_name: request.team_name,
        members: request.members,
    })
}

async fn set_user_active_in<Tx: StoreTx>(
    tx: &mut Tx,
    user_id: &str,
    is_active: bool,
) -> Result<User> {
    if !tx.set_user_active(user_id, is_active).await? {
        tracing::warn!(op = "set_user_active", user_id, "User not found");
        return Err(Error::UserNotFound(user_id.to_string()));
    }

    if !is_active {
        reconcile_member(tx, user_id).await?;
    }

    let user = tx
        .get_user(user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;

    tracing::debug!(op = "set_user_active", user_id, is_active, "Activity updated");
    Ok(user)
}

/// Unlink an inactive member from their open PRs and backfill each one
pub(super) async fn reconcile_member<Tx: StoreTx>(tx: &mut Tx, user_id: &str) -> Result<()> {
    let affected = tx.unlink_open_reviews(user_id).await?;
    if affected.is_empty() {
        return Ok(());
    }

    tracing::info!(
        op = "reconcile",
        user_id,
        pull_requests = affected.len(),
        "Unassigned inactive reviewer from open pull requests"
    );

    for pr_id in &affected {
        if tx.get_pull_request(pr_id).await?.is_none() {
            tracing::error!(op = "reconcile", pr_id = %pr_id, "Pull request vanished during reconciliation");
            return Err(Error::PrNotFound(pr_id.clone()));
        }

        let pool = tx.eligible_members(pr_id, Some(user_id)).await?;
        let linked = link_up_to(tx, pr_id, shuffled(pool), 1).await?;
        let pr = sync_need_more_reviewers(tx, pr_id).await?;

        match linked.first() {
            Some(replacement) => tracing::info!(
                op = "reconcile",
                pr_id = %pr_id,
                old_reviewer_id = user_id,
                new_reviewer_id = %replacement,
                "Replacement reviewer linked"
            ),
            None => tracing::info!(
                op = "reconcile",
                pr_id = %pr_id,
                old_reviewer_id = user_id,
                need_more_reviewers = pr.need_more_reviewers,
                "No replacement available, pull request understaffed"
            ),
        }
    }

    Ok(())
}
