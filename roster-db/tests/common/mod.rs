#![allow(dead_code)]

use std::time::Duration;

use roster_core::{
    Engine, EngineConfig, Member, NewPullRequest, NewTeam, PullRequest, Store, StoreTx,
};
use roster_db::{Database, DatabaseConfig, SqliteStore};
use tempfile::TempDir;

pub struct Harness {
    pub engine: Engine<SqliteStore>,
    pub db: Database,
    _dir: TempDir,
}

pub async fn setup() -> Harness {
    setup_with(EngineConfig::default(), Duration::from_secs(5)).await
}

pub async fn setup_with(config: EngineConfig, busy_timeout: Duration) -> Harness {
    let dir = TempDir::new().unwrap();
    let db = Database::open(
        DatabaseConfig::new(dir.path().join("roster.db")).with_busy_timeout(busy_timeout),
    )
    .await
    .unwrap();
    let engine = Engine::with_config(db.store(), config);
    Harness {
        engine,
        db,
        _dir: dir,
    }
}

/// Team whose members use their id as username
pub fn team(name: &str, member_ids: &[&str]) -> NewTeam {
    NewTeam::new(
        name,
        member_ids.iter().map(|id| Member::new(*id, *id)).collect(),
    )
}

impl Harness {
    pub async fn add_team(&self, name: &str, member_ids: &[&str]) {
        self.engine.create_team(team(name, member_ids)).await.unwrap();
    }

    pub async fn open_pr(&self, pr_id: &str, author_id: &str) -> PullRequest {
        self.engine
            .create_pr(NewPullRequest::new(pr_id, format!("Change {}", pr_id), author_id))
            .await
            .unwrap()
    }

    /// Read a pull request straight from the store
    pub async fn pr(&self, pr_id: &str) -> PullRequest {
        let mut tx = self.engine.store().begin().await.unwrap();
        let pr = tx.get_pull_request(pr_id).await.unwrap().unwrap();
        tx.rollback().await.unwrap();
        pr
    }
}
