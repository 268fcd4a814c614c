//! Session-gate behavior, end to end: redirect targets for guests, limbo
//! accounts, and role mismatches.

use reqwest::StatusCode;
use shopwright_integration_tests::{TestApp, location};

#[tokio::test]
async fn guest_is_redirected_to_login_from_dashboards() {
    let app = TestApp::spawn().await;

    for path in ["/dashboard_user", "/dashboard_admin", "/dashboard_admin/products"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {path}");
        assert_eq!(location(&response), "/login", "path {path}");
    }
}

#[tokio::test]
async fn guest_can_browse_the_storefront() {
    let app = TestApp::spawn().await;

    for path in ["/", "/products", "/cart", "/login", "/register"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "path {path}");
    }
}

#[tokio::test]
async fn inactive_account_is_confined_to_its_notice_page() {
    let app = TestApp::spawn().await;

    let response = app.login("inactive@example.com").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/inactiveaccount");

    let response = app.get("/dashboard_user").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/inactiveaccount");

    // No redirect loop on the page itself.
    let response = app.get("/inactiveaccount").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unverified_account_is_confined_to_the_verify_page() {
    let app = TestApp::spawn().await;

    let response = app.login("unverified@example.com").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/verify-email");

    let response = app.get("/dashboard_user").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/verify-email");

    let response = app.get("/verify-email").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn verification_conflict_from_backend_lands_on_verify_page() {
    let app = TestApp::spawn().await;
    app.backend.with_state(|s| s.conflict_on_unverified = true);

    let response = app.login("unverified@example.com").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/verify-email");

    let response = app.get("/verify-email").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/dashboard_user").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/verify-email");
}

#[tokio::test]
async fn verified_account_is_pushed_off_limbo_pages() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    for path in ["/verify-email", "/inactiveaccount"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {path}");
        assert_eq!(location(&response), "/dashboard_user", "path {path}");
    }
}

#[tokio::test]
async fn user_role_cannot_reach_the_admin_dashboard() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    let response = app.get("/dashboard_admin").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard_user");

    let response = app.get("/dashboard_admin/mgt-user").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard_user");
}

#[tokio::test]
async fn admin_role_is_sent_to_its_own_dashboard() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;

    let response = app.get("/dashboard_user").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard_admin");
}

#[tokio::test]
async fn signed_in_account_bounces_off_guest_pages() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    for path in ["/login", "/register"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {path}");
        assert_eq!(location(&response), "/dashboard_user", "path {path}");
    }
}

#[tokio::test]
async fn access_denied_page_renders_for_signed_in_account() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    let response = app.get("/access-denied").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("/dashboard_user"), "should link back to the caller's dashboard");
}
