//! `Store` implementation backed by SQLite
//!
//! Every engine write runs inside one `BEGIN IMMEDIATE` transaction, so
//! writers queue on the database lock instead of failing when a deferred
//! read transaction tries to upgrade. Reads use a deferred transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_core::{
    Member, MergeStatistics, Page, PullRequest, PullRequestRow, PullRequestShort, Store, StoreTx,
    Team, User,
};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::Error;
use crate::repos::{
    PullRequestRepository, ReviewerRepository, StatsRepository, TeamRepository, UserRepository,
};

type CoreResult<T> = roster_core::Result<T>;

/// Transaction source over a connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for SqliteStore {
    type Tx = SqliteTx;

    async fn begin(&self) -> CoreResult<SqliteTx> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(Error::from)?;
        Ok(SqliteTx { tx })
    }

    /// Deferred transaction; under WAL it reads a snapshot while a writer
    /// holds the lock
    async fn begin_read(&self) -> CoreResult<SqliteTx> {
        let tx = self.pool.begin().await.map_err(Error::from)?;
        Ok(SqliteTx { tx })
    }
}

/// An open write transaction. Dropping it rolls back.
pub struct SqliteTx {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteTx {
    fn teams(&mut self) -> TeamRepository<'_> {
        TeamRepository::new(&mut self.tx)
    }

    fn users(&mut self) -> UserRepository<'_> {
        UserRepository::new(&mut self.tx)
    }

    fn pull_requests(&mut self) -> PullRequestRepository<'_> {
        PullRequestRepository::new(&mut self.tx)
    }

    fn reviewers(&mut self) -> ReviewerRepository<'_> {
        ReviewerRepository::new(&mut self.tx)
    }
}

#[async_trait]
impl StoreTx for SqliteTx {
    async fn commit(self) -> CoreResult<()> {
        self.tx.commit().await.map_err(Error::from)?;
        Ok(())
    }

    async fn rollback(self) -> CoreResult<()> {
        self.tx.rollback().await.map_err(Error::from)?;
        Ok(())
    }

    async fn get_user(&mut self, user_id: &str) -> CoreResult<Option<User>> {
        Ok(self.users().get(user_id).await?)
    }

    async fn team_exists(&mut self, team_name: &str) -> CoreResult<bool> {
        Ok(self.teams().exists(team_name).await?)
    }

    async fn create_team(&mut self, team: &Team) -> CoreResult<()> {
        Ok(self.teams().create(team).await?)
    }

    async fn upsert_members(&mut self, team_id: &str, members: &[Member]) -> CoreResult<()> {
        Ok(self.users().upsert(team_id, members).await?)
    }

    async fn team_members(&mut self, team_name: &str) -> CoreResult<Vec<Member>> {
        Ok(self.teams().members(team_name).await?)
    }

    async fn set_user_active(&mut self, user_id: &str, is_active: bool) -> CoreResult<bool> {
        Ok(self.users().set_active(user_id, is_active).await?)
    }

    async fn insert_pull_request(&mut self, pr: &PullRequestRow) -> CoreResult<()> {
        Ok(self.pull_requests().insert(pr).await?)
    }

    async fn get_pull_request(&mut self, pr_id: &str) -> CoreResult<Option<PullRequest>> {
        Ok(self.pull_requests().get(pr_id).await?)
    }

    async fn set_need_more_reviewers(&mut self, pr_id: &str, value: bool) -> CoreResult<bool> {
        Ok(self.pull_requests().set_need_more_reviewers(pr_id, value).await?)
    }

    async fn mark_merged(&mut self, pr_id: &str, merged_at: DateTime<Utc>) -> CoreResult<bool> {
        Ok(self.pull_requests().mark_merged(pr_id, merged_at).await?)
    }

    async fn reviewed_pull_requests(&mut self, user_id: &str) -> CoreResult<Vec<PullRequestShort>> {
        Ok(self.pull_requests().reviewed_by(user_id).await?)
    }

    async fn eligible_members(
        &mut self,
        pr_id: &str,
        exclude: Option<&str>,
    ) -> CoreResult<Vec<Member>> {
        Ok(self.reviewers().eligible(pr_id, exclude).await?)
    }

    async fn replacement_candidates(
        &mut self,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> CoreResult<Vec<Member>> {
        Ok(self.reviewers().replacements(pr_id, old_reviewer_id).await?)
    }

    async fn link_reviewer(
        &mut self,
        pr_id: &str,
        candidates: &[Member],
    ) -> CoreResult<Option<String>> {
        Ok(self.reviewers().link_first(pr_id, candidates).await?)
    }

    async fn unlink_reviewer(&mut self, pr_id: &str, user_id: &str) -> CoreResult<bool> {
        Ok(self.reviewers().unlink(pr_id, user_id).await?)
    }

    async fn unlink_open_reviews(&mut self, user_id: &str) -> CoreResult<Vec<String>> {
        Ok(self.reviewers().unlink_open(user_id).await?)
    }

    async fn is_reviewer(&mut self, pr_id: &str, user_id: &str) -> CoreResult<bool> {
        Ok(self.reviewers().is_linked(pr_id, user_id).await?)
    }

    async fn merged_counts_by_author(&mut self, page: Page) -> CoreResult<MergeStatistics> {
        Ok(StatsRepository::new(&mut self.tx).merged_by_author(page).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::setup_test_db;

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let (db, _dir) = setup_test_db().await;
        let store = db.store();

        let mut tx = store.begin().await.unwrap();
        tx.create_team(&Team {
            id: "t1".into(),
            name: "backend".into(),
        })
        .await
        .unwrap();
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(!tx.team_exists("backend").await.unwrap());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_read_does_not_wait_for_writer() {
        let (db, _dir) = setup_test_db().await;
        let store = db.store();

        let mut writer = store.begin().await.unwrap();
        writer
            .create_team(&Team {
                id: "t1".into(),
                name: "backend".into(),
            })
            .await
            .unwrap();

        // The writer still holds the lock; the reader sees the last commit
        let mut reader = store.begin_read().await.unwrap();
        assert!(!reader.team_exists("backend").await.unwrap());
        reader.commit().await.unwrap();

        writer.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_persists() {
        let (db, _dir) = setup_test_db().await;
        let store = db.store();

        let mut tx = store.begin().await.unwrap();
        tx.create_team(&Team {
            id: "t1".into(),
            name: "backend".into(),
        })
        .await
        .unwrap();
        tx.upsert_members("t1", &[Member::new("u1", "alice")])
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let user = tx.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.team_name, "backend");
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_conflicts_surface_as_domain_errors() {
        let (db, _dir) = setup_test_db().await;
        let store = db.store();

        let mut tx = store.begin().await.unwrap();
        let team = Team {
            id: "t1".into(),
            name: "backend".into(),
        };
        tx.create_team(&team).await.unwrap();
        let err = tx
            .create_team(&Team {
                id: "t2".into(),
                name: "backend".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, roster_core::Error::TeamAlreadyExists(ref n) if n == "backend"));
    }
}
