//! Pull request repository

use chrono::{DateTime, Utc};
use roster_core::{PrStatus, PullRequest, PullRequestRow, PullRequestShort};
use sqlx::SqliteConnection;

use crate::error::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct PullRequestRecord {
    id: String,
    title: String,
    author_id: String,
    status: String,
    need_more_reviewers: bool,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct PullRequestShortRecord {
    id: String,
    title: String,
    author_id: String,
    status: String,
}

fn parse_status(value: &str) -> Result<PrStatus> {
    value
        .parse::<PrStatus>()
        .map_err(|_| Error::InvalidData(format!("unknown pull request status {}", value)))
}

/// Repository for pull requests
pub struct PullRequestRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> PullRequestRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Insert a pull request, failing with `DuplicatePullRequest` when the id is taken
    pub async fn insert(&mut self, pr: &PullRequestRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pull_requests (id, title, author_id, status, need_more_reviewers, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.id)
        .bind(&pr.title)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.need_more_reviewers)
        .bind(pr.created_at)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| Error::unique_or(e, || Error::DuplicatePullRequest(pr.id.clone())))?;
        Ok(())
    }

    /// Load a pull request with its reviewers in assignment order
    pub async fn get(&mut self, pr_id: &str) -> Result<Option<PullRequest>> {
        let record = sqlx::query_as::<_, PullRequestRecord>(
            r#"
            SELECT id, title, author_id, status, need_more_reviewers, created_at, merged_at
            FROM pull_requests
            WHERE id = ?
            "#,
        )
        .bind(pr_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let reviewers: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT user_id FROM pull_request_reviewers
            WHERE pr_id = ?
            ORDER BY assigned_at, rowid
            "#,
        )
        .bind(pr_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(Some(PullRequest {
            status: parse_status(&record.status)?,
            id: record.id,
            title: record.title,
            author_id: record.author_id,
            reviewers: reviewers.into_iter().map(|(id,)| id).collect(),
            need_more_reviewers: record.need_more_reviewers,
            created_at: record.created_at,
            merged_at: record.merged_at,
        }))
    }

    /// Returns false when the pull request does not exist
    pub async fn set_need_more_reviewers(&mut self, pr_id: &str, value: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE pull_requests SET need_more_reviewers = ? WHERE id = ?")
            .bind(value)
            .bind(pr_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Move an open pull request to merged. Returns false if nothing changed.
    pub async fn mark_merged(&mut self, pr_id: &str, merged_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE pull_requests
            SET status = 'MERGED', merged_at = ?
            WHERE id = ? AND status = 'OPEN'
            "#,
        )
        .bind(merged_at)
        .bind(pr_id)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Pull requests on which the user is a reviewer, ordered by id
    pub async fn reviewed_by(&mut self, user_id: &str) -> Result<Vec<PullRequestShort>> {
        let rows = sqlx::query_as::<_, PullRequestShortRecord>(
            r#"
            SELECT p.id, p.title, p.author_id, p.status
            FROM pull_requests p
            JOIN pull_request_reviewers r ON r.pr_id = p.id
            WHERE r.user_id = ?
            ORDER BY p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(PullRequestShort {
                    status: parse_status(&r.status)?,
                    id: r.id,
                    title: r.title,
                    author_id: r.author_id,
                })
            })
            .collect()
    }
}
