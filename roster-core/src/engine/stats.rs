//! Read-side operations: teams, review listings, merge statistics

use super::Engine;
use crate::models::{require, MergeStatistics, Page, PullRequestShort, TeamWithMembers};
use crate::store::{Store, StoreTx};
use crate::{Error, Result};

impl<S: Store> Engine<S> {
    pub async fn get_team(&self, team_name: &str) -> Result<TeamWithMembers> {
        require("team_name", team_name)?;

        self.snapshot("get_team", |mut tx| async move {
            let result = get_team_in(&mut tx, team_name).await;
            (tx, result)
        })
        .await
    }

    /// Pull requests the user currently reviews, open or merged
    pub async fn get_reviewed_prs(&self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        require("user_id", user_id)?;

        self.snapshot("get_reviewed_prs", |mut tx| async move {
            let result = reviewed_in(&mut tx, user_id).await;
            (tx, result)
        })
        .await
    }

    /// Merged PR counts per author, sliced by `page`
    pub async fn statistics(&self, page: Page) -> Result<MergeStatistics> {
        self.snapshot("statistics", |mut tx| async move {
            let result = tx.merged_counts_by_author(page).await;
            if let Ok(stats) = &result {
                tracing::debug!(
                    op = "statistics",
                    authors = stats.distinct_author_count,
                    page_authors = stats.counts_by_author.len(),
                    "Statistics computed"
                );
            }
            (tx, result)
        })
        .await
    }
}

async fn get_team_in<Tx: StoreTx>(tx: &mut Tx, team_name: &str) -> Result<TeamWithMembers> {
    if !tx.team_exists(team_name).await? {
        tracing::warn!(op = "get_team", team_name, "Team not found");
        return Err(Error::TeamNotFound(team_name.to_string()));
    }

    let members = tx.team_members(team_name).await?;
    tracing::debug!(op = "get_team", team_name, members = members.len(), "Team loaded");

    Ok(TeamWithMembers {
        team_name: team_name.to_string(),
        members,
    })
}

async fn reviewed_in<Tx: StoreTx>(tx: &mut Tx, user_id: &str) -> Result<Vec<PullRequestShort>> {
    if tx.get_user(user_id).await?.is_none() {
        tracing::warn!(op = "get_reviewed_prs", user_id, "User not found");
        return Err(Error::UserNotFound(user_id.to_string()));
    }

    let prs = tx.reviewed_pull_requests(user_id).await?;
    tracing::debug!(op = "get_reviewed_prs", user_id, pull_requests = prs.len(), "Reviews loaded");
    Ok(prs)
}
