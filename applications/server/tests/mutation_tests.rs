//! Membership mutations and the change-request ledger

mod common;

use chorus_core::{
    types::{AddTrack, DuplicatePlaylist, TrackPosition},
    ChangeStatus, ChorusError, MutationOutcome, Role, TrackId,
};
use common::TestApp;
use serde_json::json;

fn add(track_id: &TrackId, position: Option<u32>) -> AddTrack {
    AddTrack {
        track_id: track_id.clone(),
        position,
    }
}

#[tokio::test]
async fn test_editor_on_approval_playlist_creates_pending_request() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Team Picks", true).await;
    let (editor, _) = app
        .collaborator(&playlist.id, &owner, "bob", Role::Editor)
        .await;
    let t1 = app.track("t1", "a1", "lofi", 180, 1).await;

    let outcome = app
        .state
        .playlists
        .add_track(&playlist.id, &editor, add(&t1, None))
        .await
        .unwrap();

    let MutationOutcome::Pending(request) = outcome else {
        panic!("expected a pending change request");
    };
    assert_eq!(request.status, ChangeStatus::Pending);
    assert_eq!(request.requested_by, editor);
    assert_eq!(request.proposal.action(), "add_track");

    let stored = app.stored_playlist(&playlist.id).await;
    assert_eq!(stored.track_count, 0);
    assert!(app.positions(&playlist.id).await.is_empty());
}

#[tokio::test]
async fn test_viewer_cannot_mutate_or_propose() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Team Picks", true).await;
    let (viewer, _) = app
        .collaborator(&playlist.id, &owner, "bob", Role::Viewer)
        .await;
    let t1 = app.track("t1", "a1", "lofi", 180, 1).await;

    let err = app
        .state
        .playlists
        .add_track(&playlist.id, &viewer, add(&t1, None))
        .await
        .unwrap_err();

    assert!(matches!(err, ChorusError::Forbidden(_)));
    assert_eq!(app.change_request_count().await, 0);
}

#[tokio::test]
async fn test_stranger_cannot_mutate() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let stranger = app.user("eve").await;
    let playlist = app.playlist(&owner, "Mix", false).await;
    let t1 = app.track("t1", "a1", "lofi", 180, 1).await;

    let err = app
        .state
        .playlists
        .add_track(&playlist.id, &stranger, add(&t1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::Forbidden(_)));
}

#[tokio::test]
async fn test_insert_shifts_later_positions() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Mix", false).await;
    let a = app.track("a", "a1", "lofi", 100, 3).await;
    let b = app.track("b", "a1", "lofi", 100, 3).await;
    let c = app.track("c", "a1", "lofi", 100, 3).await;
    let x = app.track("x", "a1", "lofi", 100, 3).await;
    app.append(&playlist.id, &owner, &[a, b, c]).await;

    let outcome = app
        .state
        .playlists
        .add_track(&playlist.id, &owner, add(&x, Some(1)))
        .await
        .unwrap();
    assert!(matches!(outcome, MutationOutcome::Applied(_)));

    assert_eq!(
        app.positions(&playlist.id).await,
        vec![
            ("a".to_string(), 0),
            ("x".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 3),
        ]
    );
}

#[tokio::test]
async fn test_position_past_end_appends() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Mix", false).await;
    let a = app.track("a", "a1", "lofi", 100, 3).await;
    let b = app.track("b", "a1", "lofi", 100, 3).await;
    app.append(&playlist.id, &owner, &[a]).await;

    app.state
        .playlists
        .add_track(&playlist.id, &owner, add(&b, Some(42)))
        .await
        .unwrap();

    assert_eq!(
        app.positions(&playlist.id).await,
        vec![("a".to_string(), 0), ("b".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_remove_closes_gap() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Mix", false).await;
    let a = app.track("a", "a1", "lofi", 100, 3).await;
    let b = app.track("b", "a1", "lofi", 100, 3).await;
    let c = app.track("c", "a1", "lofi", 100, 3).await;
    let d = app.track("d", "a1", "lofi", 100, 3).await;
    app.append(&playlist.id, &owner, &[a, b.clone(), c, d]).await;

    app.state
        .playlists
        .remove_track(&playlist.id, &owner, b)
        .await
        .unwrap();

    assert_eq!(
        app.positions(&playlist.id).await,
        vec![
            ("a".to_string(), 0),
            ("c".to_string(), 1),
            ("d".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_duplicate_and_missing_tracks_rejected() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Mix", false).await;
    let a = app.track("a", "a1", "lofi", 100, 3).await;
    app.append(&playlist.id, &owner, &[a.clone()]).await;

    let err = app
        .state
        .playlists
        .add_track(&playlist.id, &owner, add(&a, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::BadRequest(_)));

    let err = app
        .state
        .playlists
        .add_track(&playlist.id, &owner, add(&TrackId::new("ghost"), None))
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::NotFound { .. }));

    let err = app
        .state
        .playlists
        .remove_track(&playlist.id, &owner, TrackId::new("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::NotFound { .. }));
}

#[tokio::test]
async fn test_aggregates_follow_membership() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Mix", false).await;
    let a = app.track("a", "a1", "lofi", 120, 3).await;
    let b = app.track("b", "a1", "lofi", 200, 3).await;
    app.append(&playlist.id, &owner, &[a.clone(), b]).await;

    let stored = app.stored_playlist(&playlist.id).await;
    assert_eq!(stored.track_count, 2);
    assert_eq!(stored.total_duration, 320);

    app.state
        .playlists
        .remove_track(&playlist.id, &owner, a)
        .await
        .unwrap();

    let stored = app.stored_playlist(&playlist.id).await;
    assert_eq!(stored.track_count, 1);
    assert_eq!(stored.total_duration, 200);
}

#[tokio::test]
async fn test_reorder_sets_given_positions() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Mix", false).await;
    let a = app.track("a", "a1", "lofi", 100, 3).await;
    let b = app.track("b", "a1", "lofi", 100, 3).await;
    let c = app.track("c", "a1", "lofi", 100, 3).await;
    app.append(&playlist.id, &owner, &[a.clone(), b.clone(), c.clone()])
        .await;

    let tracks = vec![
        TrackPosition {
            track_id: c,
            position: 0,
        },
        TrackPosition {
            track_id: a,
            position: 1,
        },
        TrackPosition {
            track_id: b,
            position: 2,
        },
    ];
    app.state
        .playlists
        .reorder_tracks(&playlist.id, &owner, tracks)
        .await
        .unwrap();

    assert_eq!(
        app.positions(&playlist.id).await,
        vec![
            ("c".to_string(), 0),
            ("a".to_string(), 1),
            ("b".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn test_reorder_with_foreign_track_is_rejected_before_routing() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Team Picks", true).await;
    let (editor, _) = app
        .collaborator(&playlist.id, &owner, "bob", Role::Editor)
        .await;
    let a = app.track("a", "a1", "lofi", 100, 3).await;
    let stray = app.track("stray", "a1", "lofi", 100, 3).await;
    app.append(&playlist.id, &owner, &[a.clone()]).await;

    let tracks = vec![
        TrackPosition {
            track_id: a,
            position: 1,
        },
        TrackPosition {
            track_id: stray,
            position: 0,
        },
    ];
    let err = app
        .state
        .playlists
        .reorder_tracks(&playlist.id, &editor, tracks)
        .await
        .unwrap_err();

    assert!(matches!(err, ChorusError::BadRequest(_)));
    assert_eq!(app.change_request_count().await, 0);
}

#[tokio::test]
async fn test_approve_applies_proposal_and_marks_request() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Team Picks", true).await;
    let (editor, _) = app
        .collaborator(&playlist.id, &owner, "bob", Role::Editor)
        .await;
    let t1 = app.track("t1", "a1", "lofi", 180, 1).await;

    let MutationOutcome::Pending(request) = app
        .state
        .playlists
        .add_track(&playlist.id, &editor, add(&t1, None))
        .await
        .unwrap()
    else {
        panic!("expected a pending change request");
    };

    let approved = app
        .state
        .playlists
        .approve_change_request(&playlist.id, &request.id, &owner)
        .await
        .unwrap();
    assert_eq!(approved.track_count, 1);
    assert_eq!(app.positions(&playlist.id).await, vec![("t1".to_string(), 0)]);

    let reviewed = app
        .state
        .playlists
        .list_change_requests(&playlist.id, &owner, Some(ChangeStatus::Approved))
        .await
        .unwrap();
    assert_eq!(reviewed.len(), 1);
    assert_eq!(reviewed[0].reviewed_by.as_ref(), Some(&owner));
    assert!(reviewed[0].reviewed_at.is_some());

    // A reviewed request cannot be approved again
    let err = app
        .state
        .playlists
        .approve_change_request(&playlist.id, &request.id, &owner)
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::NotFound { .. }));
}

#[tokio::test]
async fn test_approve_of_infeasible_request_leaves_it_pending() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Team Picks", true).await;
    let (editor, _) = app
        .collaborator(&playlist.id, &owner, "bob", Role::Editor)
        .await;
    let t1 = app.track("t1", "a1", "lofi", 180, 1).await;

    let MutationOutcome::Pending(request) = app
        .state
        .playlists
        .add_track(&playlist.id, &editor, add(&t1, None))
        .await
        .unwrap()
    else {
        panic!("expected a pending change request");
    };

    // Owner adds the same track directly in the meantime
    app.append(&playlist.id, &owner, &[t1]).await;

    let err = app
        .state
        .playlists
        .approve_change_request(&playlist.id, &request.id, &owner)
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::BadRequest(_)));

    let pending = app
        .state
        .playlists
        .list_change_requests(&playlist.id, &owner, Some(ChangeStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(app.stored_playlist(&playlist.id).await.track_count, 1);
}

#[tokio::test]
async fn test_reject_leaves_membership_untouched() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Team Picks", true).await;
    let (editor, _) = app
        .collaborator(&playlist.id, &owner, "bob", Role::Editor)
        .await;
    let t1 = app.track("t1", "a1", "lofi", 180, 1).await;

    let MutationOutcome::Pending(request) = app
        .state
        .playlists
        .add_track(&playlist.id, &editor, add(&t1, None))
        .await
        .unwrap()
    else {
        panic!("expected a pending change request");
    };

    let err = app
        .state
        .playlists
        .reject_change_request(&playlist.id, &request.id, &editor)
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::Forbidden(_)));

    let rejected = app
        .state
        .playlists
        .reject_change_request(&playlist.id, &request.id, &owner)
        .await
        .unwrap();
    assert_eq!(rejected.status, ChangeStatus::Rejected);
    assert_eq!(rejected.reviewed_by.as_ref(), Some(&owner));
    assert!(app.positions(&playlist.id).await.is_empty());
}

#[tokio::test]
async fn test_review_requires_approval_workflow() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Team Picks", true).await;
    let (editor, _) = app
        .collaborator(&playlist.id, &owner, "bob", Role::Editor)
        .await;
    let t1 = app.track("t1", "a1", "lofi", 180, 1).await;

    let MutationOutcome::Pending(request) = app
        .state
        .playlists
        .add_track(&playlist.id, &editor, add(&t1, None))
        .await
        .unwrap()
    else {
        panic!("expected a pending change request");
    };

    let changes = serde_json::from_value(json!({ "approval_required": false })).unwrap();
    app.state
        .playlists
        .update(&playlist.id, &owner, changes)
        .await
        .unwrap();

    let err = app
        .state
        .playlists
        .approve_change_request(&playlist.id, &request.id, &owner)
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::BadRequest(_)));
}

#[tokio::test]
async fn test_owner_bypasses_approval() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Team Picks", true).await;
    let t1 = app.track("t1", "a1", "lofi", 180, 1).await;

    let outcome = app
        .state
        .playlists
        .add_track(&playlist.id, &owner, add(&t1, None))
        .await
        .unwrap();

    assert!(matches!(outcome, MutationOutcome::Applied(_)));
    assert_eq!(app.change_request_count().await, 0);
}

#[tokio::test]
async fn test_smart_playlist_cannot_be_edited() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    app.track("t1", "a1", "lofi", 180, 1).await;
    let extra = app.track("t2", "a1", "jazz", 180, 1).await;

    let input = serde_json::from_value(json!({
        "name": "Lofi",
        "criteria": { "type": "genre", "genre": "lofi" }
    }))
    .unwrap();
    let smart = app.state.smart_playlists.create(&owner, input).await.unwrap();

    let err = app
        .state
        .playlists
        .add_track(&smart.id, &owner, add(&extra, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::Forbidden(_)));
}

#[tokio::test]
async fn test_activity_failure_does_not_fail_mutation() {
    let app = TestApp::with_failing_activity().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Mix", false).await;
    let t1 = app.track("t1", "a1", "lofi", 180, 1).await;

    let outcome = app
        .state
        .playlists
        .add_track(&playlist.id, &owner, add(&t1, None))
        .await
        .unwrap();

    assert!(matches!(outcome, MutationOutcome::Applied(_)));
    assert_eq!(app.stored_playlist(&playlist.id).await.track_count, 1);
    assert_eq!(app.activity_count().await, 0);
}

#[tokio::test]
async fn test_duplicate_copies_membership() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let other = app.user("bob").await;
    let playlist = app.playlist(&owner, "Team Picks", true).await;
    let a = app.track("a", "a1", "lofi", 100, 3).await;
    let b = app.track("b", "a1", "lofi", 100, 3).await;
    app.append(&playlist.id, &owner, &[a, b]).await;

    let err = app
        .state
        .playlists
        .duplicate(&playlist.id, &other, DuplicatePlaylist::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::Forbidden(_)));

    let copy = app
        .state
        .playlists
        .duplicate(&playlist.id, &owner, DuplicatePlaylist::default())
        .await
        .unwrap();

    assert_ne!(copy.id, playlist.id);
    assert_eq!(copy.name, "Team Picks (Copy)");
    assert!(!copy.approval_required);
    assert_eq!(copy.track_count, 2);
    assert_eq!(
        app.positions(&copy.id).await,
        vec![("a".to_string(), 0), ("b".to_string(), 1)]
    );
    assert_eq!(app.owner_rows(&copy.id).await, 1);
}

#[tokio::test]
async fn test_share_makes_playlist_public() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let other = app.user("bob").await;
    let playlist = app.playlist(&owner, "Mix", false).await;

    let err = app
        .state
        .playlists
        .share(&playlist.id, &other)
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::Forbidden(_)));

    let info = app.state.playlists.share(&playlist.id, &owner).await.unwrap();
    assert!(info.is_public);
    assert_eq!(info.share_url, format!("/playlists/{}", playlist.id));
    assert!(app.stored_playlist(&playlist.id).await.is_public);

    let seen = app.state.playlists.get(&playlist.id, None).await.unwrap();
    assert_eq!(seen.id, playlist.id);
}

#[tokio::test]
async fn test_delete_is_owner_only() {
    let app = TestApp::new().await;
    let owner = app.user("alice").await;
    let playlist = app.playlist(&owner, "Mix", false).await;
    let (editor, _) = app
        .collaborator(&playlist.id, &owner, "bob", Role::Editor)
        .await;

    let err = app
        .state
        .playlists
        .delete(&playlist.id, &editor)
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::Forbidden(_)));

    app.state.playlists.delete(&playlist.id, &owner).await.unwrap();
    let err = app
        .state
        .playlists
        .get(&playlist.id, Some(&owner))
        .await
        .unwrap_err();
    assert!(matches!(err, ChorusError::NotFound { .. }));
}
