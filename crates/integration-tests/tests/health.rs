//! Health endpoints.

use reqwest::StatusCode;
use shopwright_integration_tests::TestApp;

#[tokio::test]
async fn liveness_always_answers() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn readiness_probes_the_backend() {
    let app = TestApp::spawn().await;

    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ready");
}
