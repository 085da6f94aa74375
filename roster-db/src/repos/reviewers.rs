//! Reviewer link repository

use chrono::Utc;
use roster_core::{Member, REVIEWER_CAPACITY};
use sqlx::SqliteConnection;

use super::teams::MemberRecord;
use crate::error::Result;

/// Repository for the links between pull requests and their reviewers
pub struct ReviewerRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ReviewerRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Active teammates of the author, minus the author, `exclude` and
    /// anyone already reviewing
    pub async fn eligible(&mut self, pr_id: &str, exclude: Option<&str>) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRecord>(
            r#"
            SELECT u.id, u.username, u.is_active
            FROM pull_requests p
            JOIN users a ON a.id = p.author_id
            JOIN users u ON u.team_id = a.team_id
            WHERE p.id = ?1
              AND u.id != p.author_id
              AND (?2 IS NULL OR u.id != ?2)
              AND u.is_active = 1
              AND NOT EXISTS (
                  SELECT 1 FROM pull_request_reviewers r
                  WHERE r.pr_id = p.id AND r.user_id = u.id
              )
            ORDER BY u.id
            "#,
        )
        .bind(pr_id)
        .bind(exclude)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    /// Active teammates of the outgoing reviewer who could take their place
    pub async fn replacements(&mut self, pr_id: &str, old_reviewer_id: &str) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRecord>(
            r#"
            SELECT u.id, u.username, u.is_active
            FROM users o
            JOIN users u ON u.team_id = o.team_id
            JOIN pull_requests p ON p.id = ?1
            WHERE o.id = ?2
              AND u.id != o.id
              AND u.id != p.author_id
              AND u.is_active = 1
              AND NOT EXISTS (
                  SELECT 1 FROM pull_request_reviewers r
                  WHERE r.pr_id = p.id AND r.user_id = u.id
              )
            ORDER BY u.id
            "#,
        )
        .bind(pr_id)
        .bind(old_reviewer_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    /// Try candidates in order until one is linked.
    ///
    /// The insert only lands while the PR is open and below capacity, so a
    /// full or merged PR links nobody.
    pub async fn link_first(&mut self, pr_id: &str, candidates: &[Member]) -> Result<Option<String>> {
        for candidate in candidates {
            let result = sqlx::query(
                r#"
                INSERT INTO pull_request_reviewers (pr_id, user_id, assigned_at)
                SELECT ?1, ?2, ?3
                WHERE (SELECT COUNT(*) FROM pull_request_reviewers WHERE pr_id = ?1) < ?4
                  AND EXISTS (SELECT 1 FROM pull_requests WHERE id = ?1 AND status = 'OPEN')
                ON CONFLICT(pr_id, user_id) DO NOTHING
                "#,
            )
            .bind(pr_id)
            .bind(&candidate.user_id)
            .bind(Utc::now())
            .bind(REVIEWER_CAPACITY as i64)
            .execute(&mut *self.conn)
            .await?;

            if result.rows_affected() == 1 {
                return Ok(Some(candidate.user_id.clone()));
            }
            tracing::debug!(pr_id, user_id = %candidate.user_id, "Candidate not linked");
        }
        Ok(None)
    }

    pub async fn unlink(&mut self, pr_id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pull_request_reviewers WHERE pr_id = ? AND user_id = ?")
            .bind(pr_id)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Drop the user from every open pull request they review, returning
    /// the affected ids sorted
    pub async fn unlink_open(&mut self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            DELETE FROM pull_request_reviewers
            WHERE user_id = ?
              AND pr_id IN (SELECT id FROM pull_requests WHERE status = 'OPEN')
            RETURNING pr_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        let mut ids: Vec<String> = rows.into_iter().map(|(id,)| id).collect();
        ids.sort();
        Ok(ids)
    }

    pub async fn is_linked(&mut self, pr_id: &str, user_id: &str) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM pull_request_reviewers WHERE pr_id = ? AND user_id = ?",
        )
        .bind(pr_id)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(found.is_some())
    }
}
