mod common;

use common::setup;
use roster_core::{Error, Member, NewTeam};

#[tokio::test]
async fn test_deactivation_replaces_reviewer() {
    let h = setup().await;
    h.add_team("payments", &["u1", "u2", "u3", "u4"]).await;
    let pr = h.open_pr("pr-1", "u1").await;
    let leaving = pr.reviewers[0].clone();
    let staying = pr.reviewers[1].clone();

    let user = h.engine.set_user_active(&leaving, false).await.unwrap();
    assert!(!user.is_active);
    assert_eq!(user.team_name, "payments");

    let after = h.pr("pr-1").await;
    assert_eq!(after.reviewers.len(), 2);
    assert!(!after.has_reviewer(&leaving));
    assert!(after.has_reviewer(&staying));
    assert!(!after.has_reviewer("u1"));
    assert!(!after.need_more_reviewers);
}

#[tokio::test]
async fn test_deactivation_without_replacement_flags_pr() {
    let h = setup().await;
    h.add_team("payments", &["u1", "u2", "u3"]).await;
    h.open_pr("pr-1", "u1").await;

    h.engine.set_user_active("u2", false).await.unwrap();

    let after = h.pr("pr-1").await;
    assert_eq!(after.reviewers, vec!["u3".to_string()]);
    assert!(after.need_more_reviewers);
}

#[tokio::test]
async fn test_merged_prs_keep_inactive_reviewers() {
    let h = setup().await;
    h.add_team("payments", &["u1", "u2"]).await;
    h.open_pr("pr-1", "u1").await;
    h.engine.merge_pr("pr-1").await.unwrap();

    h.engine.set_user_active("u2", false).await.unwrap();

    let after = h.pr("pr-1").await;
    assert_eq!(after.reviewers, vec!["u2".to_string()]);
    let reviews = h.engine.get_reviewed_prs("u2").await.unwrap();
    assert_eq!(reviews.len(), 1);
}

#[tokio::test]
async fn test_team_write_with_inactive_member_cascades() {
    let h = setup().await;
    h.add_team("payments", &["u1", "u2", "u3", "u4"]).await;
    h.open_pr("pr-1", "u1").await;
    h.open_pr("pr-2", "u1").await;

    // Rewrite the team with u2 and u3 inactive
    h.engine
        .create_team(NewTeam::new(
            "payments-v2",
            vec![
                Member::new("u1", "u1"),
                Member::new("u2", "u2").inactive(),
                Member::new("u3", "u3").inactive(),
                Member::new("u4", "u4"),
            ],
        ))
        .await
        .unwrap();

    for pr_id in ["pr-1", "pr-2"] {
        let pr = h.pr(pr_id).await;
        assert!(!pr.has_reviewer("u2"));
        assert!(!pr.has_reviewer("u3"));
        assert!(pr.reviewers.iter().all(|r| r == "u4"));
        assert_eq!(pr.need_more_reviewers, pr.reviewers.len() < 2);
    }
}

#[tokio::test]
async fn test_reactivation_does_not_reassign() {
    let h = setup().await;
    h.add_team("payments", &["u1", "u2", "u3"]).await;
    h.open_pr("pr-1", "u1").await;
    h.engine.set_user_active("u2", false).await.unwrap();

    let user = h.engine.set_user_active("u2", true).await.unwrap();
    assert!(user.is_active);
    assert_eq!(h.pr("pr-1").await.reviewers, vec!["u3".to_string()]);
}

#[tokio::test]
async fn test_unknown_user() {
    let h = setup().await;
    let err = h.engine.set_user_active("ghost", false).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(ref id) if id == "ghost"));
}

#[tokio::test]
async fn test_username_clash_rolls_back_team_write() {
    let h = setup().await;
    h.add_team("payments", &["u1", "u2"]).await;
    h.open_pr("pr-1", "u1").await;

    let err = h
        .engine
        .create_team(NewTeam::new(
            "search",
            vec![Member::new("u2", "u2").inactive(), Member::new("s1", "u1")],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UsernameAlreadyExists(_)));

    // Nothing from the failed write is visible
    let err = h.engine.get_team("search").await.unwrap_err();
    assert!(matches!(err, Error::TeamNotFound(_)));
    let payments = h.engine.get_team("payments").await.unwrap();
    assert!(payments.members.iter().all(|m| m.is_active));
    assert_eq!(h.pr("pr-1").await.reviewers, vec!["u2".to_string()]);
}

#[tokio::test]
async fn test_duplicate_team_name() {
    let h = setup().await;
    h.add_team("payments", &["u1"]).await;

    let err = h
        .engine
        .create_team(common::team("payments", &["u9"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TeamAlreadyExists(ref n) if n == "payments"));
    assert_eq!(err.code(), "TEAM_EXISTS");

    let err = h
        .engine
        .set_user_active("u9", true)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UserNotFound(_)));
}

#[tokio::test]
async fn test_get_team_lists_members() {
    let h = setup().await;
    h.engine
        .create_team(NewTeam::new(
            "payments",
            vec![Member::new("u2", "bob").inactive(), Member::new("u1", "alice")],
        ))
        .await
        .unwrap();

    let team = h.engine.get_team("payments").await.unwrap();
    assert_eq!(team.team_name, "payments");
    assert_eq!(team.members.len(), 2);
    assert_eq!(team.members[0], Member::new("u1", "alice"));
    assert_eq!(team.members[1], Member::new("u2", "bob").inactive());
}
