//! Login, registration, and logout flows against the stub backend.

use reqwest::StatusCode;
use shopwright_integration_tests::{TestApp, location};

#[tokio::test]
async fn login_redirects_to_the_dashboard_for_the_role() {
    let app = TestApp::spawn().await;
    let response = app.login("admin@example.com").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard_admin");

    let app = TestApp::spawn().await;
    let response = app.login("user@example.com").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard_user");
}

#[tokio::test]
async fn bad_credentials_re_render_the_form_with_errors() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form("/login", &[("email", "user@example.com"), ("password", "wrong")])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.headers().get(reqwest::header::LOCATION).is_none());

    let body = response.text().await.unwrap();
    assert!(body.contains("These credentials do not match our records."));
    // The typed email survives the round trip.
    assert!(body.contains("user@example.com"));
}

#[tokio::test]
async fn registration_lands_on_the_verify_page() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/register",
            &[
                ("name", "Rita Recruit"),
                ("email", "rita@example.com"),
                ("password", "password123"),
                ("password_confirmation", "password123"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/verify-email");

    let created = app
        .backend
        .with_state(|s| s.users.iter().any(|u| u.email == "rita@example.com"));
    assert!(created);
}

#[tokio::test]
async fn duplicate_email_registration_shows_the_field_error() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/register",
            &[
                ("name", "Copy Cat"),
                ("email", "user@example.com"),
                ("password", "password123"),
                ("password_confirmation", "password123"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("The email has already been taken."));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    let response = app.post_form("/logout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app.get("/dashboard_user").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn logout_works_for_confined_accounts() {
    let app = TestApp::spawn().await;
    app.login("inactive@example.com").await;

    let response = app.post_form("/logout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app.get("/login").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn resend_verification_reports_backend_status() {
    let app = TestApp::spawn().await;
    app.login("unverified@example.com").await;

    let response = app.post_form("/verify-email", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("verification-link-sent"));
}
