mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{setup, setup_with};
use roster_core::{Engine, EngineConfig, Error, NewPullRequest, Page};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_create_has_one_winner() {
    let h = setup().await;
    h.add_team("payments", &["u1", "u2", "u3", "u4"]).await;
    let engine = Arc::new(Engine::new(h.db.store()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .create_pr(NewPullRequest::new("pr-1", format!("attempt {}", i), "u1"))
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(pr) => {
                created += 1;
                assert_eq!(pr.reviewers.len(), 2);
            }
            Err(Error::PrAlreadyExists(id)) => assert_eq!(id, "pr-1"),
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(h.pr("pr-1").await.reviewers.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_deactivation_races_with_assignment() {
    let h = setup().await;
    h.add_team("payments", &["u1", "u2", "u3", "u4", "u5"]).await;
    let engine = Arc::new(Engine::new(h.db.store()));

    let mut handles = Vec::new();
    for i in 0..10 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .create_pr(NewPullRequest::new(format!("pr-{}", i), "Change", "u1"))
                .await
                .map(|_| ())
        }));
    }
    {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.set_user_active("u2", false).await.map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for i in 0..10 {
        let pr = h.pr(&format!("pr-{}", i)).await;
        assert_eq!(pr.reviewers.len(), 2);
        assert!(!pr.has_reviewer("u1"));
        assert!(!pr.has_reviewer("u2"));
        assert!(!pr.need_more_reviewers);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_deadline_rolls_back() {
    let config = EngineConfig {
        operation_timeout: Some(Duration::from_millis(100)),
    };
    let h = setup_with(config, Duration::from_secs(5)).await;
    h.add_team("payments", &["u1", "u2", "u3"]).await;

    // Hold the write lock so the engine cannot begin
    let blocker = h.db.pool().begin_with("BEGIN IMMEDIATE").await.unwrap();

    let err = h
        .engine
        .create_pr(NewPullRequest::new("pr-1", "Change", "u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
    assert_eq!(err.code(), "INTERNAL");

    blocker.rollback().await.unwrap();

    let unbounded = Engine::new(h.db.store());
    let pr = unbounded
        .create_pr(NewPullRequest::new("pr-1", "Change", "u1"))
        .await
        .unwrap();
    assert_eq!(pr.reviewers.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reads_do_not_queue_behind_writer() {
    let config = EngineConfig {
        operation_timeout: Some(Duration::from_millis(500)),
    };
    let h = setup_with(config, Duration::from_secs(5)).await;
    h.add_team("payments", &["u1", "u2"]).await;
    h.open_pr("pr-1", "u1").await;
    h.engine.merge_pr("pr-1").await.unwrap();

    let blocker = h.db.pool().begin_with("BEGIN IMMEDIATE").await.unwrap();

    let team = h.engine.get_team("payments").await.unwrap();
    assert_eq!(team.members.len(), 2);
    let reviews = h.engine.get_reviewed_prs("u2").await.unwrap();
    assert_eq!(reviews.len(), 1);
    let stats = h.engine.statistics(Page::all()).await.unwrap();
    assert_eq!(stats.distinct_author_count, 1);

    // Writers still wait for the lock
    let err = h.engine.merge_pr("pr-1").await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));

    blocker.rollback().await.unwrap();
}
