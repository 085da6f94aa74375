//! Store contract consumed by the engine
//!
//! The engine never touches SQL. It opens one [`StoreTx`] per operation and
//! performs every read and write through it, so an operation commits or
//! rolls back as a unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Member, MergeStatistics, Page, PrStatus, PullRequest, PullRequestShort, Team, User,
};
use crate::Result;

/// Row written when a pull request is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRow {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub status: PrStatus,
    pub need_more_reviewers: bool,
    pub created_at: DateTime<Utc>,
}

/// Source of transactions
#[async_trait]
pub trait Store: Send + Sync {
    type Tx: StoreTx;

    /// Begin a transaction that holds the store's write lock until it ends
    async fn begin(&self) -> Result<Self::Tx>;

    /// Begin a transaction that only reads and does not wait for writers
    async fn begin_read(&self) -> Result<Self::Tx> {
        self.begin().await
    }
}

/// One open transaction.
///
/// Dropping a transaction without calling [`StoreTx::commit`] must roll it
/// back; cancellation relies on this.
#[async_trait]
pub trait StoreTx: Send {
    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;

    // Membership

    async fn get_user(&mut self, user_id: &str) -> Result<Option<User>>;

    async fn team_exists(&mut self, team_name: &str) -> Result<bool>;

    /// Fails with `TeamAlreadyExists` when the name is taken
    async fn create_team(&mut self, team: &Team) -> Result<()>;

    /// Insert or move each member into the team, overwriting username and
    /// activity. Fails with `UsernameAlreadyExists` on a username clash.
    async fn upsert_members(&mut self, team_id: &str, members: &[Member]) -> Result<()>;

    async fn team_members(&mut self, team_name: &str) -> Result<Vec<Member>>;

    /// Returns false when no such user exists
    async fn set_user_active(&mut self, user_id: &str, is_active: bool) -> Result<bool>;

    // Pull requests

    /// Fails with `PrAlreadyExists` when the id is taken
    async fn insert_pull_request(&mut self, pr: &PullRequestRow) -> Result<()>;

    async fn get_pull_request(&mut self, pr_id: &str) -> Result<Option<PullRequest>>;

    /// Returns false when no such pull request exists
    async fn set_need_more_reviewers(&mut self, pr_id: &str, value: bool) -> Result<bool>;

    /// Open -> Merged. Returns false if the PR is missing or already merged.
    async fn mark_merged(&mut self, pr_id: &str, merged_at: DateTime<Utc>) -> Result<bool>;

    async fn reviewed_pull_requests(&mut self, user_id: &str) -> Result<Vec<PullRequestShort>>;

    // Reviewer links

    /// Active members of the author's team who could review `pr_id`: not the
    /// author, not `exclude`, and not already linked.
    async fn eligible_members(
        &mut self,
        pr_id: &str,
        exclude: Option<&str>,
    ) -> Result<Vec<Member>>;

    /// Active members of `old_reviewer_id`'s team who could take over their
    /// review: not the old reviewer, not the author, and not already linked.
    async fn replacement_candidates(
        &mut self,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Vec<Member>>;

    /// Link the first candidate that can be inserted.
    ///
    /// Candidates already linked are skipped, not errors. Nothing is linked
    /// once the PR is merged or at capacity. Returns the linked user id.
    async fn link_reviewer(&mut self, pr_id: &str, candidates: &[Member])
        -> Result<Option<String>>;

    async fn unlink_reviewer(&mut self, pr_id: &str, user_id: &str) -> Result<bool>;

    /// Remove the user's links on open pull requests only, returning the ids
    /// of the pull requests that lost a reviewer
    async fn unlink_open_reviews(&mut self, user_id: &str) -> Result<Vec<String>>;

    async fn is_reviewer(&mut self, pr_id: &str, user_id: &str) -> Result<bool>;

    // Reporting

    async fn merged_counts_by_author(&mut self, page: Page) -> Result<MergeStatistics>;
}
