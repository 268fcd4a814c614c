//! Admin dashboard CRUD tables: row fragments, toasts, and the
//! no-change-on-failure contract.

use reqwest::StatusCode;
use shopwright_integration_tests::TestApp;

#[tokio::test]
async fn product_table_lists_the_catalog() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;

    let response = app.get("/dashboard_admin/products").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Oak Chair"));
    assert!(body.contains("Pine Table"));
}

#[tokio::test]
async fn creating_a_product_returns_a_row_and_toast() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;

    let response = app
        .post_form(
            "/dashboard_admin/products",
            &[
                ("name", "Birch Stool"),
                ("price", "24.50"),
                ("stock", "8"),
                ("category_id", "1"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Birch Stool"));
    assert!(body.contains("Product created"));

    let stored = app.backend.with_state(|s| {
        s.products
            .iter()
            .any(|p| p["name"].as_str() == Some("Birch Stool"))
    });
    assert!(stored);
}

#[tokio::test]
async fn failed_product_update_changes_nothing() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;
    app.backend.with_state(|s| s.fail_product_mutations = true);

    let response = app
        .put_form(
            "/dashboard_admin/products/1",
            &[
                ("name", "Renamed Chair"),
                ("price", "1.00"),
                ("stock", "0"),
                ("category_id", "1"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response.text().await.unwrap().contains("The change was not saved"));

    let name = app.backend.with_state(|s| {
        s.products[0]["name"].as_str().unwrap_or_default().to_string()
    });
    assert_eq!(name, "Oak Chair");
}

#[tokio::test]
async fn deleting_a_product_removes_it_only_on_success() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;

    app.backend.with_state(|s| s.fail_product_mutations = true);
    let response = app.delete("/dashboard_admin/products/1").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let still_there = app
        .backend
        .with_state(|s| s.products.iter().any(|p| p["id"].as_i64() == Some(1)));
    assert!(still_there);

    app.backend.with_state(|s| s.fail_product_mutations = false);
    let response = app.delete("/dashboard_admin/products/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Product deleted"));
    let gone = app
        .backend
        .with_state(|s| s.products.iter().all(|p| p["id"].as_i64() != Some(1)));
    assert!(gone);
}

#[tokio::test]
async fn invalid_product_shows_the_validation_message() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;

    let response = app
        .post_form(
            "/dashboard_admin/products",
            &[("name", ""), ("price", "9.99"), ("stock", "1"), ("category_id", "1")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().await.unwrap().contains("The name field is required."));
}

#[tokio::test]
async fn category_crud_round_trip() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;

    let response = app
        .post_form("/dashboard_admin/categories", &[("title", "Lamps"), ("desc", "Lighting")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Lamps"));

    let id = app.backend.with_state(|s| {
        s.categories
            .iter()
            .find(|c| c["title"].as_str() == Some("Lamps"))
            .and_then(|c| c["id"].as_i64())
            .unwrap()
    });

    let path = format!("/dashboard_admin/categories/{id}");
    let response = app
        .put_form(&path, &[("title", "Floor Lamps"), ("desc", "Lighting")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Floor Lamps"));

    let response = app.delete(&path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let gone = app
        .backend
        .with_state(|s| s.categories.iter().all(|c| c["id"].as_i64() != Some(id)));
    assert!(gone);
}

#[tokio::test]
async fn changing_a_role_returns_the_updated_row() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;

    let response = app
        .put_form(
            "/dashboard_admin/mgt-user/2",
            &[("role", "admin"), ("status", "active")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Account updated"));
    assert!(body.contains("user@example.com"));

    let role = app
        .backend
        .with_state(|s| s.users.iter().find(|u| u.id == 2).unwrap().role.clone());
    assert_eq!(role, "admin");
}

#[tokio::test]
async fn failed_role_change_leaves_the_account_alone() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;
    app.backend.with_state(|s| s.fail_user_mutations = true);

    let response = app
        .put_form(
            "/dashboard_admin/mgt-user/2",
            &[("role", "admin"), ("status", "active")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let role = app
        .backend
        .with_state(|s| s.users.iter().find(|u| u.id == 2).unwrap().role.clone());
    assert_eq!(role, "user");
}

#[tokio::test]
async fn admins_cannot_demote_or_delete_themselves() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;

    let response = app
        .put_form(
            "/dashboard_admin/mgt-user/1",
            &[("role", "user"), ("status", "active")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().await.unwrap().contains("your own account"));

    let response = app.delete("/dashboard_admin/mgt-user/1").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let (role, exists) = app.backend.with_state(|s| {
        let admin = s.users.iter().find(|u| u.id == 1);
        (admin.map(|u| u.role.clone()), admin.is_some())
    });
    assert_eq!(role.as_deref(), Some("admin"));
    assert!(exists);
}

#[tokio::test]
async fn deleting_an_account_returns_an_empty_row() {
    let app = TestApp::spawn().await;
    app.login("admin@example.com").await;

    let response = app.delete("/dashboard_admin/mgt-user/3").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Account deleted"));

    let gone = app
        .backend
        .with_state(|s| s.users.iter().all(|u| u.id != 3));
    assert!(gone);
}

#[tokio::test]
async fn admin_mutation_invalidates_the_public_catalog_cache() {
    let app = TestApp::spawn().await;

    // Warm the public cache.
    let body = app.get("/products").await.text().await.unwrap();
    assert!(body.contains("Oak Chair"));

    app.login("admin@example.com").await;
    app.post_form(
        "/dashboard_admin/products",
        &[
            ("name", "Walnut Desk"),
            ("price", "310.00"),
            ("stock", "2"),
            ("category_id", "2"),
        ],
    )
    .await;

    let body = app.get("/products").await.text().await.unwrap();
    assert!(body.contains("Walnut Desk"), "cache should be refreshed after the mutation");
}
