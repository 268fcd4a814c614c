//! Cart flows: HTMX fragments, the `cart-updated` trigger, and the badge's
//! fail-to-zero behavior.

use reqwest::StatusCode;
use shopwright_integration_tests::TestApp;

fn hx_trigger(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get("HX-Trigger")
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn adding_to_cart_returns_the_badge_and_trigger() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    let response = app
        .post_form("/cart/add", &[("product_id", "1"), ("quantity", "2")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(hx_trigger(&response), Some("cart-updated"));
    assert_eq!(response.text().await.unwrap().trim(), "2");
}

#[tokio::test]
async fn badge_shows_zero_when_the_count_endpoint_fails() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    app.post_form("/cart/add", &[("product_id", "1"), ("quantity", "3")])
        .await;
    app.backend.with_state(|s| s.fail_cart_count = true);

    let response = app.get("/cart/count").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap().trim(), "0");
}

#[tokio::test]
async fn cart_page_lists_added_items() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    app.post_form("/cart/add", &[("product_id", "1"), ("quantity", "2")])
        .await;

    let response = app.get("/cart").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Oak Chair"));
    assert!(body.contains("$99.80"), "line total for two chairs at $49.90");
}

#[tokio::test]
async fn updating_quantity_re_renders_the_items_fragment() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    app.post_form("/cart/add", &[("product_id", "2"), ("quantity", "1")])
        .await;
    let line_id = app
        .backend
        .with_state(|s| s.cart_lines[0].id)
        .to_string();

    let response = app
        .post_form("/cart/update", &[("item_id", line_id.as_str()), ("quantity", "4")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(hx_trigger(&response), Some("cart-updated"));
    let body = response.text().await.unwrap();
    assert!(body.contains("Pine Table"));
    assert!(body.contains("$480.00"));
}

#[tokio::test]
async fn removing_the_last_line_renders_the_empty_cart() {
    let app = TestApp::spawn().await;
    app.login("user@example.com").await;

    app.post_form("/cart/add", &[("product_id", "1"), ("quantity", "1")])
        .await;
    let line_id = app
        .backend
        .with_state(|s| s.cart_lines[0].id)
        .to_string();

    let response = app
        .post_form("/cart/remove", &[("item_id", line_id.as_str())])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(hx_trigger(&response), Some("cart-updated"));
    let body = response.text().await.unwrap();
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn guest_add_to_cart_fails_without_swapping() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form("/cart/add", &[("product_id", "1"), ("quantity", "1")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(hx_trigger(&response), None);
}

#[tokio::test]
async fn guest_cart_page_renders_empty() {
    let app = TestApp::spawn().await;

    let response = app.get("/cart").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Your cart is empty"));
}
