//! Merge statistics queries

use roster_core::{MergeStatistics, Page};
use sqlx::SqliteConnection;

use crate::error::Result;

pub struct StatsRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> StatsRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Merged pull requests per author, authors ordered by id and sliced by `page`
    pub async fn merged_by_author(&mut self, page: Page) -> Result<MergeStatistics> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = page.limit.map(i64::from).unwrap_or(-1);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT author_id, COUNT(*)
            FROM pull_requests
            WHERE status = 'MERGED'
            GROUP BY author_id
            ORDER BY author_id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.conn)
        .await?;

        let (authors,): (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT author_id) FROM pull_requests WHERE status = 'MERGED'",
        )
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(MergeStatistics {
            counts_by_author: rows
                .into_iter()
                .map(|(author, count)| (author, count.max(0) as u64))
                .collect(),
            distinct_author_count: authors.max(0) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::PullRequestRepository;
    use crate::testing::{seed_team, setup_test_db};
    use chrono::Utc;
    use roster_core::{PrStatus, PullRequestRow};

    #[tokio::test]
    async fn test_counts_only_merged() {
        let (db, _dir) = setup_test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        seed_team(&mut conn, "backend", &["a", "b", "c"]).await;

        let mut prs = PullRequestRepository::new(&mut conn);
        for (id, author, merge) in [
            ("pr-1", "a", true),
            ("pr-2", "a", true),
            ("pr-3", "b", true),
            ("pr-4", "c", false),
        ] {
            prs.insert(&PullRequestRow {
                id: id.into(),
                title: id.into(),
                author_id: author.into(),
                status: PrStatus::Open,
                need_more_reviewers: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
            if merge {
                prs.mark_merged(id, Utc::now()).await.unwrap();
            }
        }

        let mut stats = StatsRepository::new(&mut conn);
        let all = stats.merged_by_author(Page::all()).await.unwrap();
        assert_eq!(all.distinct_author_count, 2);
        assert_eq!(all.counts_by_author.get("a"), Some(&2));
        assert_eq!(all.counts_by_author.get("b"), Some(&1));
        assert!(!all.counts_by_author.contains_key("c"));

        let second = stats
            .merged_by_author(Page::new(Some(1), Some(1)))
            .await
            .unwrap();
        assert_eq!(second.counts_by_author.keys().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(second.distinct_author_count, 2);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let (db, _dir) = setup_test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let stats = StatsRepository::new(&mut conn)
            .merged_by_author(Page::all())
            .await
            .unwrap();
        assert!(stats.counts_by_author.is_empty());
        assert_eq!(stats.distinct_author_count, 0);
    }
}
