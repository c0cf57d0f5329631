// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set). The emulator provides a clean state
//! for each test run.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use devhub_api::db::firestore::ParticipationKind;
use devhub_api::models::{
    Community, Contributor, ContributorRole, Event, MemberRole, Profile, Project, ProjectCategory,
};
use devhub_api::services::{MembershipService, ParticipationService};
use tower::ServiceExt;

mod common;
use common::test_db;

/// Generate a unique id for test isolation.
fn unique_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

fn test_community(id: &str, is_private: bool) -> Community {
    Community {
        id: id.to_string(),
        name: "Test Community".to_string(),
        description: "A community for tests".to_string(),
        website: None,
        chat_link: None,
        is_private,
        created_by: "creator".to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn test_profile(user_id: &str) -> Profile {
    Profile {
        user_id: user_id.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: None,
        github: None,
        linkedin: None,
        website: None,
        areas: vec![],
        experience: None,
        education_level: None,
        accepted_cookies: true,
        accepted_privacy_policy: true,
        photo_url: None,
        created_at: chrono::Utc::now().to_rfc3339(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn test_event(id: &str, community_id: &str) -> Event {
    Event {
        id: id.to_string(),
        title: "Test Event".to_string(),
        description: "An event for tests".to_string(),
        starts_at: "2030-01-01T19:00:00+00:00".to_string(),
        ends_at: None,
        location: Some("Online".to_string()),
        meeting_link: None,
        community_id: community_id.to_string(),
        created_by: "creator".to_string(),
        attraction_type: Some("talk".to_string()),
        capacity: None,
        created_at: chrono::Utc::now().to_rfc3339(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MEMBERSHIP TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_join_private_community_starts_pending() {
    require_emulator!();

    let db = test_db().await;
    let memberships = MembershipService::new(db.clone());

    let community_id = unique_id("community");
    db.upsert_community(&test_community(&community_id, true))
        .await
        .unwrap();

    let membership = memberships.join("user-a", &community_id).await.unwrap();
    assert_eq!(membership.role, MemberRole::Pending);
}

#[tokio::test]
async fn test_join_public_community_starts_member() {
    require_emulator!();

    let db = test_db().await;
    let memberships = MembershipService::new(db.clone());

    let community_id = unique_id("community");
    db.upsert_community(&test_community(&community_id, false))
        .await
        .unwrap();

    let membership = memberships.join("user-a", &community_id).await.unwrap();
    assert_eq!(membership.role, MemberRole::Member);
}

#[tokio::test]
async fn test_rejoin_does_not_overwrite_role() {
    require_emulator!();

    let db = test_db().await;
    let memberships = MembershipService::new(db.clone());

    let community_id = unique_id("community");
    db.upsert_community(&test_community(&community_id, true))
        .await
        .unwrap();

    // Seed an admin, then have them "join" again
    let admin = devhub_api::models::Membership {
        community_id: community_id.clone(),
        user_id: "admin-user".to_string(),
        role: MemberRole::Admin,
        joined_at: chrono::Utc::now().to_rfc3339(),
    };
    db.set_membership(&admin).await.unwrap();

    let after = memberships.join("admin-user", &community_id).await.unwrap();
    assert_eq!(after.role, MemberRole::Admin, "re-join must not demote");
}

#[tokio::test]
async fn test_approve_moves_pending_to_member() {
    require_emulator!();

    let db = test_db().await;
    let memberships = MembershipService::new(db.clone());

    let community_id = unique_id("community");
    db.upsert_community(&test_community(&community_id, true))
        .await
        .unwrap();

    let admin = devhub_api::models::Membership {
        community_id: community_id.clone(),
        user_id: "admin-user".to_string(),
        role: MemberRole::Admin,
        joined_at: chrono::Utc::now().to_rfc3339(),
    };
    db.set_membership(&admin).await.unwrap();

    memberships.join("applicant", &community_id).await.unwrap();

    let approved = memberships
        .approve("admin-user", &community_id, "applicant")
        .await
        .unwrap();
    assert_eq!(approved.role, MemberRole::Member);

    // Approved row leaves the pending view and shows up as active
    let members = db.list_members(&community_id).await.unwrap();
    let row = members
        .iter()
        .find(|m| m.user_id == "applicant")
        .expect("membership row should exist");
    assert!(row.role.is_active());
}

#[tokio::test]
async fn test_approve_requires_community_admin() {
    require_emulator!();

    let db = test_db().await;
    let memberships = MembershipService::new(db.clone());

    let community_id = unique_id("community");
    db.upsert_community(&test_community(&community_id, true))
        .await
        .unwrap();

    memberships.join("applicant", &community_id).await.unwrap();

    let err = memberships
        .approve("random-user", &community_id, "applicant")
        .await
        .unwrap_err();
    assert!(matches!(err, devhub_api::error::AppError::Forbidden));
}

#[tokio::test]
async fn test_leave_clears_membership_checks() {
    require_emulator!();

    let db = test_db().await;
    let memberships = MembershipService::new(db.clone());

    let community_id = unique_id("community");
    db.upsert_community(&test_community(&community_id, false))
        .await
        .unwrap();

    memberships.join("user-a", &community_id).await.unwrap();
    assert!(memberships.is_member("user-a", &community_id).await.unwrap());

    memberships.leave("user-a", &community_id).await.unwrap();

    assert!(!memberships.is_member("user-a", &community_id).await.unwrap());
    assert!(!memberships.is_admin("user-a", &community_id).await.unwrap());
}

#[tokio::test]
async fn test_last_admin_cannot_leave() {
    require_emulator!();

    let db = test_db().await;
    let memberships = MembershipService::new(db.clone());

    let community_id = unique_id("community");
    db.upsert_community(&test_community(&community_id, false))
        .await
        .unwrap();

    let admin = devhub_api::models::Membership {
        community_id: community_id.clone(),
        user_id: "only-admin".to_string(),
        role: MemberRole::Admin,
        joined_at: chrono::Utc::now().to_rfc3339(),
    };
    db.set_membership(&admin).await.unwrap();

    let err = memberships
        .leave("only-admin", &community_id)
        .await
        .unwrap_err();
    assert!(matches!(err, devhub_api::error::AppError::Conflict(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// PARTICIPATION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_counts_match_set_cardinality() {
    require_emulator!();

    let db = test_db().await;
    let participation = ParticipationService::new(db.clone());

    let event_id = unique_id("event");
    db.upsert_event(&test_event(&event_id, "some-community"))
        .await
        .unwrap();

    for user in ["u1", "u2", "u3"] {
        participation
            .set(user, &event_id, ParticipationKind::Interested)
            .await
            .unwrap();
    }
    participation
        .set("u1", &event_id, ParticipationKind::Attending)
        .await
        .unwrap();

    let counts = participation.counts(&event_id).await.unwrap();
    assert_eq!(counts.interested, 3);
    assert_eq!(counts.attendees, 1);

    let rows = db
        .list_participants(&event_id, ParticipationKind::Interested)
        .await
        .unwrap();
    assert_eq!(counts.interested as usize, rows.len());
}

#[tokio::test]
async fn test_mark_interested_twice_is_idempotent() {
    require_emulator!();

    let db = test_db().await;
    let participation = ParticipationService::new(db.clone());

    let event_id = unique_id("event");
    db.upsert_event(&test_event(&event_id, "some-community"))
        .await
        .unwrap();

    participation
        .set("u1", &event_id, ParticipationKind::Interested)
        .await
        .unwrap();
    participation
        .set("u1", &event_id, ParticipationKind::Interested)
        .await
        .unwrap();

    let counts = participation.counts(&event_id).await.unwrap();
    assert_eq!(counts.interested, 1, "double mark must not double count");
}

#[tokio::test]
async fn test_event_deletion_cascades_to_participation_sets() {
    require_emulator!();

    let db = test_db().await;
    let participation = ParticipationService::new(db.clone());

    let event_id = unique_id("event");
    db.upsert_event(&test_event(&event_id, "some-community"))
        .await
        .unwrap();
    participation
        .set("u1", &event_id, ParticipationKind::Attending)
        .await
        .unwrap();

    db.delete_event(&event_id).await.unwrap();

    assert!(db.get_event(&event_id).await.unwrap().is_none());
    let rows = db
        .list_participants(&event_id, ParticipationKind::Attending)
        .await
        .unwrap();
    assert!(rows.is_empty(), "attendee rows must be deleted with the event");
}

// ═══════════════════════════════════════════════════════════════════════════
// ENTITY ROUND-TRIP TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_project_category_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("project");

    let project = Project {
        id: id.clone(),
        title: "Spectra".to_string(),
        description: "Spectral analysis toolkit".to_string(),
        category: ProjectCategory::Scientific,
        author_id: "author-1".to_string(),
        author_name: "Ada Lovelace".to_string(),
        link: None,
        image_url: None,
        created_at: chrono::Utc::now().to_rfc3339(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    };
    db.upsert_project(&project).await.unwrap();

    let fetched = db.get_project(&id).await.unwrap().expect("project exists");
    assert_eq!(fetched.category, ProjectCategory::Scientific);
    assert_eq!(fetched.title, "Spectra");
}

#[tokio::test]
async fn test_profile_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_id("uid");

    let profile = Profile {
        user_id: uid.clone(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: Some("ada@example.com".to_string()),
        github: None,
        linkedin: None,
        website: None,
        areas: vec!["backend".to_string(), "frontend".to_string()],
        experience: None,
        education_level: None,
        accepted_cookies: true,
        accepted_privacy_policy: true,
        photo_url: None,
        created_at: chrono::Utc::now().to_rfc3339(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    };
    db.upsert_profile(&profile).await.unwrap();

    let fetched = db.get_profile(&uid).await.unwrap().expect("profile exists");
    assert_eq!(fetched.areas, vec!["backend", "frontend"]);
    assert_eq!(fetched.email, Some("ada@example.com".to_string()));
}

#[tokio::test]
async fn test_directory_pages_keep_rows_with_equal_created_at() {
    require_emulator!();

    let db = test_db().await;

    // Two profiles sharing one timestamp, dated far in the future so
    // they sort ahead of anything other tests create.
    let shared_ts = (chrono::Utc::now() + chrono::Duration::days(18250)).to_rfc3339();
    let base = unique_id("tie");
    let uid_a = format!("{}-a", base);
    let uid_b = format!("{}-b", base);
    for uid in [&uid_a, &uid_b] {
        let mut profile = test_profile(uid);
        profile.created_at = shared_ts.clone();
        db.upsert_profile(&profile).await.unwrap();
    }

    let page1 = db.list_profiles(None, 1).await.unwrap();
    assert_eq!(page1.len(), 1);
    assert_eq!(page1[0].user_id, uid_b); // uid descending within the tie

    let boundary = (page1[0].created_at.as_str(), page1[0].user_id.as_str());
    let page2 = db.list_profiles(Some(boundary), 1).await.unwrap();
    assert_eq!(page2.len(), 1);
    assert_eq!(
        page2[0].user_id, uid_a,
        "row sharing the boundary timestamp must appear on the next page"
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// ADMIN DASHBOARD TESTS
// ═══════════════════════════════════════════════════════════════════════════

async fn fetch_stats(app: axum::Router, token: &str) -> serde_json::Value {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/admin/stats")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_admin_stats_track_collection_cardinalities() {
    require_emulator!();

    let db = test_db().await;
    let (app, state) = common::create_test_app_with_db(db.clone());

    // A contributor record is what grants access to the stats route.
    let admin_uid = unique_id("stats-admin");
    db.upsert_contributor(&Contributor {
        user_id: admin_uid.clone(),
        name: "Stats Admin".to_string(),
        role: ContributorRole::Developer,
        photo_url: None,
        created_at: chrono::Utc::now().to_rfc3339(),
    })
    .await
    .unwrap();
    let token = common::create_test_jwt(&admin_uid, &state.config.jwt_signing_key);

    // Seed 3 profiles, 2 communities, 5 events, 1 project, 2 contributors
    for n in 0..3 {
        db.upsert_profile(&test_profile(&unique_id(&format!("stats-user-{}", n))))
            .await
            .unwrap();
    }
    for n in 0..2 {
        let id = unique_id(&format!("stats-community-{}", n));
        db.upsert_community(&test_community(&id, false)).await.unwrap();
    }
    for n in 0..5 {
        let id = unique_id(&format!("stats-event-{}", n));
        db.upsert_event(&test_event(&id, "stats-community")).await.unwrap();
    }
    db.upsert_project(&Project {
        id: unique_id("stats-project"),
        title: "Counted".to_string(),
        description: "A project for the dashboard".to_string(),
        category: ProjectCategory::Portfolio,
        author_id: "author-1".to_string(),
        author_name: "Ada Lovelace".to_string(),
        link: None,
        image_url: None,
        created_at: chrono::Utc::now().to_rfc3339(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    })
    .await
    .unwrap();
    for n in 0..2 {
        db.upsert_contributor(&Contributor {
            user_id: unique_id(&format!("stats-contributor-{}", n)),
            name: "Counted Contributor".to_string(),
            role: ContributorRole::Community,
            photo_url: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
        .await
        .unwrap();
    }

    let stats = fetch_stats(app.clone(), &token).await;

    // Nothing deletes the documents seeded above, so they are a lower
    // bound on each count regardless of what other tests do.
    assert!(stats["users"].as_u64().unwrap() >= 3, "stats: {:?}", stats);
    assert!(stats["communities"].as_u64().unwrap() >= 2);
    assert!(stats["events"].as_u64().unwrap() >= 5);
    assert!(stats["projects"].as_u64().unwrap() >= 1);
    assert!(stats["contributors"].as_u64().unwrap() >= 3); // admin + 2 seeded

    // The reported numbers must be the collection cardinalities at fetch
    // time. Other tests mutate the emulator concurrently, so allow a few
    // attempts to catch a quiet window.
    let mut consistent = false;
    for _ in 0..5 {
        let stats = fetch_stats(app.clone(), &token).await;
        let expected = [
            ("users", db.list_all_profiles().await.unwrap().len() as u64),
            ("communities", db.list_communities().await.unwrap().len() as u64),
            ("events", db.list_events(None).await.unwrap().len() as u64),
            ("projects", db.list_projects().await.unwrap().len() as u64),
            (
                "contributors",
                db.list_contributors().await.unwrap().len() as u64,
            ),
        ];
        if expected
            .iter()
            .all(|(field, count)| stats[*field].as_u64() == Some(*count))
        {
            consistent = true;
            break;
        }
    }
    assert!(consistent, "stats never matched collection cardinalities");
}

#[tokio::test]
async fn test_community_deletion_cascades_to_members() {
    require_emulator!();

    let db = test_db().await;
    let memberships = MembershipService::new(db.clone());

    let community_id = unique_id("community");
    db.upsert_community(&test_community(&community_id, false))
        .await
        .unwrap();
    memberships.join("user-a", &community_id).await.unwrap();

    db.delete_community(&community_id).await.unwrap();

    assert!(db.get_community(&community_id).await.unwrap().is_none());
    let members = db.list_members(&community_id).await.unwrap();
    assert!(members.is_empty(), "member rows must be deleted with the community");
}
