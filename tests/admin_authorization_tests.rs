//! Admin surface authorization tests.
//!
//! Each admin endpoint gets the same three checks: admin succeeds,
//! authenticated parent gets "Admin access required", unauthenticated gets
//! 401. Plus the live-role tests: a role change in storage takes effect on
//! the very next request, whatever the token still says.

mod common;

use common::fixtures::{
    change_role, seed_admin, seed_child, seed_injury, seed_parent,
};
use common::TestHarness;
use nextplay_core::common::auth::Role;

#[tokio::test]
async fn stats_reports_platform_counts() {
    let harness = TestHarness::new();
    let admin = seed_admin(&harness, "admin@example.com");
    let parent = seed_parent(&harness, "parent@example.com");
    let child = seed_child(&harness, parent.id, "Sam");
    seed_injury(&harness, child.id, "Ankle Sprain");

    let token = harness.token_for(&admin);
    let (status, body) = harness
        .request("GET", "/api/admin/stats", Some(&token), None)
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["totalUsers"], 2);
    assert_eq!(body["totalChildren"], 1);
    assert_eq!(body["totalInjuries"], 1);
    assert_eq!(body["activeInjuries"], 1);
}

#[tokio::test]
async fn admin_endpoints_reject_parents_and_anonymous() {
    let harness = TestHarness::new();
    let parent = seed_parent(&harness, "parent@example.com");
    let token = harness.token_for(&parent);

    for uri in [
        "/api/admin/stats",
        "/api/admin/users",
        "/api/admin/export/children",
        "/api/admin/export/injuries",
    ] {
        let (status, body) = harness.request("GET", uri, Some(&token), None).await;
        assert_eq!(status, 403, "{uri}");
        assert_eq!(body["error"], "Admin access required");

        let (status, _) = harness.request("GET", uri, None, None).await;
        assert_eq!(status, 401, "{uri}");
    }
}

#[tokio::test]
async fn users_listing_includes_child_counts() {
    let harness = TestHarness::new();
    let admin = seed_admin(&harness, "admin@example.com");
    let parent = seed_parent(&harness, "parent@example.com");
    seed_child(&harness, parent.id, "Sam");
    seed_child(&harness, parent.id, "Alex");

    let token = harness.token_for(&admin);
    let (status, body) = harness
        .request("GET", "/api/admin/users", Some(&token), None)
        .await;

    assert_eq!(status, 200);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    let parent_row = users
        .iter()
        .find(|u| u["email"] == "parent@example.com")
        .unwrap();
    assert_eq!(parent_row["childrenCount"], 2);
    // Password material never leaves the API.
    assert!(parent_row.get("passwordHash").is_none());
}

#[tokio::test]
async fn exports_are_csv_and_pdf_is_rejected() {
    let harness = TestHarness::new();
    let admin = seed_admin(&harness, "admin@example.com");
    let parent = seed_parent(&harness, "parent@example.com");
    let child = seed_child(&harness, parent.id, "Sam");
    seed_injury(&harness, child.id, "Ankle Sprain");
    let token = harness.token_for(&admin);

    let (status, headers, body) = harness
        .request_raw("GET", "/api/admin/export/children?format=csv", Some(&token), None)
        .await;
    assert_eq!(status, 200);
    assert!(headers["content-type"].to_str().unwrap().contains("text/csv"));
    assert!(body.contains("parent@example.com"));

    let (status, _, _) = harness
        .request_raw("GET", "/api/admin/export/injuries", Some(&token), None)
        .await;
    assert_eq!(status, 200);

    let (status, body) = harness
        .request("GET", "/api/admin/export/children?format=pdf", Some(&token), None)
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "PDF export is not supported");
}

#[tokio::test]
async fn promotion_takes_effect_with_the_old_token() {
    let harness = TestHarness::new();
    let user = seed_parent(&harness, "upgraded@example.com");
    let child = seed_child(&harness, user.id, "Sam");

    // Token minted while still a parent.
    let token = harness.token_for(&user);
    change_role(&harness, user.id, Role::Admin);

    // Admin surface opens immediately.
    let (status, _) = harness
        .request("GET", "/api/admin/stats", Some(&token), None)
        .await;
    assert_eq!(status, 200);

    // And the admin write prohibition applies even to records they created
    // as a parent.
    let (status, body) = harness
        .request("DELETE", &format!("/api/children/{}", child.id), Some(&token), None)
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Admins cannot delete children");
}

#[tokio::test]
async fn demotion_takes_effect_with_the_old_token() {
    let harness = TestHarness::new();
    let user = seed_admin(&harness, "demoted@example.com");

    let token = harness.token_for(&user);
    change_role(&harness, user.id, Role::Parent);

    let (status, body) = harness
        .request("GET", "/api/admin/stats", Some(&token), None)
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Admin access required");
}
