//! Integration test harness for Shopwright.
//!
//! Spins up a stub of the remote REST backend (a small axum app with
//! in-memory state) plus the real application router, and drives the pair
//! with a cookie-keeping reqwest client. Redirects are not followed so
//! tests can assert on `Location` headers.
//!
//! The stub speaks the backend's dialect: CSRF cookie priming, a session
//! cookie handed out on login, Laravel-shaped 422 bodies, and a 409 on the
//! user fetch when configured. Failure knobs let tests make individual
//! endpoints break without touching the rest.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::significant_drop_tightening)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::{Value, json};

use shopwright_web::config::AppConfig;
use shopwright_web::state::AppState;

const SESSION_COOKIE: &str = "backend_session";
const XSRF_TOKEN: &str = "stub-token";

/// An account known to the stub backend. Password is always "password".
#[derive(Debug, Clone)]
pub struct StubUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub verified: bool,
}

impl StubUser {
    fn api_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "status": self.status,
            "email_verified_at": if self.verified { Some("2024-01-01T00:00:00Z") } else { None },
        })
    }

    fn mgt_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "status": self.status,
        })
    }
}

/// One cart line, keyed to the owning account's email.
#[derive(Debug, Clone)]
pub struct StubCartLine {
    pub id: i64,
    pub owner: String,
    pub product_id: i64,
    pub quantity: u32,
}

/// Mutable stub state, shared between the stub router and the test body.
#[derive(Debug)]
pub struct StubState {
    pub users: Vec<StubUser>,
    pub products: Vec<Value>,
    pub categories: Vec<Value>,
    pub cart_lines: Vec<StubCartLine>,
    next_id: i64,
    /// Respond 409 to `/api/user` for unverified accounts instead of a
    /// 200 with a null timestamp.
    pub conflict_on_unverified: bool,
    /// Break `/api/cart/count` with a 500.
    pub fail_cart_count: bool,
    /// Break product mutations with a 500.
    pub fail_product_mutations: bool,
    /// Break managed-user mutations with a 500.
    pub fail_user_mutations: bool,
}

impl StubState {
    fn seeded() -> Self {
        let users = vec![
            StubUser {
                id: 1,
                name: "Alex Admin".into(),
                email: "admin@example.com".into(),
                role: "admin".into(),
                status: "active".into(),
                verified: true,
            },
            StubUser {
                id: 2,
                name: "Uma User".into(),
                email: "user@example.com".into(),
                role: "user".into(),
                status: "active".into(),
                verified: true,
            },
            StubUser {
                id: 3,
                name: "Ivan Inactive".into(),
                email: "inactive@example.com".into(),
                role: "user".into(),
                status: "inactive".into(),
                verified: true,
            },
            StubUser {
                id: 4,
                name: "Nora New".into(),
                email: "unverified@example.com".into(),
                role: "user".into(),
                status: "active".into(),
                verified: false,
            },
        ];
        let categories = vec![
            json!({"id": 1, "title": "Chairs", "desc": "Seating"}),
            json!({"id": 2, "title": "Tables", "desc": ""}),
        ];
        let products = vec![
            json!({
                "id": 1, "name": "Oak Chair", "price": "49.90", "stock": 10,
                "category_id": 1, "category_title": "Chairs",
                "desc": "Solid oak", "color": "brown", "accessories": ""
            }),
            json!({
                "id": 2, "name": "Pine Table", "price": "120.00", "stock": 3,
                "category_id": 2, "category_title": "Tables",
                "desc": "", "color": "natural", "accessories": ""
            }),
        ];
        Self {
            users,
            products,
            categories,
            cart_lines: Vec::new(),
            next_id: 100,
            conflict_on_unverified: false,
            fail_cart_count: false,
            fail_product_mutations: false,
            fail_user_mutations: false,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Stub = Arc<Mutex<StubState>>;

/// The in-memory stand-in for the remote REST backend.
pub struct StubBackend {
    pub addr: SocketAddr,
    pub state: Stub,
}

impl StubBackend {
    /// Bind the stub on an ephemeral port and serve it in the background.
    pub async fn spawn() -> Self {
        let state: Stub = Arc::new(Mutex::new(StubState::seeded()));
        let router = stub_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    /// Run a closure against the stub's state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut StubState) -> R) -> R {
        let mut guard = self.state.lock().unwrap();
        f(&mut guard)
    }
}

fn stub_router(state: Stub) -> Router {
    Router::new()
        .route("/sanctum/csrf-cookie", get(csrf_cookie))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/email/verification-notification", post(resend))
        .route("/api/user", get(current_user))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/api/mgt-user", get(list_users))
        .route(
            "/api/mgt-user/{selector}",
            put(update_user).delete(delete_user),
        )
        .route("/api/cart-items", get(list_cart).post(add_cart))
        .route("/api/cart-items/{id}", put(update_cart).delete(remove_cart))
        .route("/api/cart/count", get(cart_count))
        .with_state(state)
}

// =============================================================================
// Stub helpers
// =============================================================================

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

fn session_email(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE).filter(|v| !v.is_empty())
}

fn session_user(state: &StubState, headers: &HeaderMap) -> Option<StubUser> {
    let email = session_email(headers)?;
    state.users.iter().find(|u| u.email == email).cloned()
}

fn set_session(email: &str) -> [(header::HeaderName, String); 1] {
    [(
        header::SET_COOKIE,
        format!("{SESSION_COOKIE}={email}; Path=/; HttpOnly"),
    )]
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthenticated."})),
    )
        .into_response()
}

fn validation_error(message: &str, field: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "message": message,
            "errors": { field: [message] },
        })),
    )
        .into_response()
}

fn require_csrf(headers: &HeaderMap) -> Option<Response> {
    let ok = headers
        .get("x-xsrf-token")
        .and_then(|h| h.to_str().ok())
        .is_some_and(|token| token == XSRF_TOKEN);
    if ok {
        None
    } else {
        Some((StatusCode::from_u16(419).unwrap(), "CSRF token mismatch").into_response())
    }
}

// =============================================================================
// Session endpoints
// =============================================================================

async fn csrf_cookie() -> Response {
    (
        [(
            header::SET_COOKIE,
            format!("XSRF-TOKEN={XSRF_TOKEN}; Path=/"),
        )],
        StatusCode::NO_CONTENT,
    )
        .into_response()
}

async fn login(
    State(state): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(reject) = require_csrf(&headers) {
        return reject;
    }
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let found = {
        let state = state.lock().unwrap();
        state.users.iter().any(|u| u.email == email)
    };
    if !found || password != "password" {
        return validation_error("These credentials do not match our records.", "email");
    }
    (set_session(&email), StatusCode::OK).into_response()
}

async fn register(
    State(state): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(reject) = require_csrf(&headers) {
        return reject;
    }
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let mut state = state.lock().unwrap();
    if state.users.iter().any(|u| u.email == email) {
        return validation_error("The email has already been taken.", "email");
    }
    if password.len() < 8 {
        return validation_error("The password must be at least 8 characters.", "password");
    }
    let id = state.next_id();
    state.users.push(StubUser {
        id,
        name,
        email: email.clone(),
        role: "user".into(),
        status: "active".into(),
        verified: false,
    });
    (set_session(&email), StatusCode::CREATED).into_response()
}

async fn logout(headers: HeaderMap) -> Response {
    if let Some(reject) = require_csrf(&headers) {
        return reject;
    }
    (
        [(
            header::SET_COOKIE,
            format!("{SESSION_COOKIE}=; Path=/; Max-Age=0"),
        )],
        StatusCode::NO_CONTENT,
    )
        .into_response()
}

async fn resend(State(state): State<Stub>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if session_user(&state, &headers).is_none() {
        return unauthenticated();
    }
    Json(json!({"status": "verification-link-sent"})).into_response()
}

async fn current_user(State(state): State<Stub>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let Some(user) = session_user(&state, &headers) else {
        return unauthenticated();
    };
    if !user.verified && state.conflict_on_unverified {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Your email address is not verified."})),
        )
            .into_response();
    }
    Json(user.api_json()).into_response()
}

// =============================================================================
// Catalog endpoints
// =============================================================================

async fn list_products(State(state): State<Stub>) -> Response {
    let state = state.lock().unwrap();
    Json(Value::Array(state.products.clone())).into_response()
}

async fn create_product(
    State(state): State<Stub>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if session_user(&state, &headers).is_none() {
        return unauthenticated();
    }
    if state.fail_product_mutations {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if body["name"].as_str().unwrap_or_default().is_empty() {
        return validation_error("The name field is required.", "name");
    }
    let id = state.next_id();
    body["id"] = json!(id);
    if body.get("category_title").is_none() {
        body["category_title"] = Value::Null;
    }
    state.products.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_product(
    State(state): State<Stub>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if session_user(&state, &headers).is_none() {
        return unauthenticated();
    }
    if state.fail_product_mutations {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let Some(product) = state
        .products
        .iter_mut()
        .find(|p| p["id"].as_i64() == Some(id))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    body["id"] = json!(id);
    if body.get("category_title").is_none() {
        body["category_title"] = Value::Null;
    }
    *product = body.clone();
    Json(body).into_response()
}

async fn delete_product(
    State(state): State<Stub>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    if session_user(&state, &headers).is_none() {
        return unauthenticated();
    }
    if state.fail_product_mutations {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    state.products.retain(|p| p["id"].as_i64() != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

async fn list_categories(State(state): State<Stub>) -> Response {
    let state = state.lock().unwrap();
    Json(Value::Array(state.categories.clone())).into_response()
}

async fn create_category(
    State(state): State<Stub>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if session_user(&state, &headers).is_none() {
        return unauthenticated();
    }
    if body["title"].as_str().unwrap_or_default().is_empty() {
        return validation_error("The title field is required.", "title");
    }
    let id = state.next_id();
    body["id"] = json!(id);
    state.categories.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_category(
    State(state): State<Stub>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if session_user(&state, &headers).is_none() {
        return unauthenticated();
    }
    let Some(category) = state
        .categories
        .iter_mut()
        .find(|c| c["id"].as_i64() == Some(id))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    body["id"] = json!(id);
    *category = body.clone();
    Json(body).into_response()
}

async fn delete_category(
    State(state): State<Stub>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    if session_user(&state, &headers).is_none() {
        return unauthenticated();
    }
    state.categories.retain(|c| c["id"].as_i64() != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// User management endpoints
// =============================================================================

async fn list_users(State(state): State<Stub>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    match session_user(&state, &headers) {
        Some(user) if user.role == "admin" => {
            let rows: Vec<Value> = state.users.iter().map(StubUser::mgt_json).collect();
            Json(Value::Array(rows)).into_response()
        }
        Some(_) => StatusCode::FORBIDDEN.into_response(),
        None => unauthenticated(),
    }
}

fn parse_selector(selector: &str) -> Option<i64> {
    selector.strip_prefix("update-on-id=")?.parse().ok()
}

async fn update_user(
    State(state): State<Stub>,
    Path(selector): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(id) = parse_selector(&selector) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mut state = state.lock().unwrap();
    if session_user(&state, &headers).is_none_or(|u| u.role != "admin") {
        return unauthenticated();
    }
    if state.fail_user_mutations {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(role) = body["role"].as_str() {
        user.role = role.to_string();
    }
    if let Some(status) = body["status"].as_str() {
        user.status = status.to_string();
    }
    Json(user.mgt_json()).into_response()
}

async fn delete_user(
    State(state): State<Stub>,
    Path(selector): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(id) = parse_selector(&selector) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mut state = state.lock().unwrap();
    if session_user(&state, &headers).is_none_or(|u| u.role != "admin") {
        return unauthenticated();
    }
    if state.fail_user_mutations {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    state.users.retain(|u| u.id != id);
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Cart endpoints
// =============================================================================

fn cart_line_json(state: &StubState, line: &StubCartLine) -> Value {
    let product = state
        .products
        .iter()
        .find(|p| p["id"].as_i64() == Some(line.product_id));
    json!({
        "id": line.id,
        "product_id": line.product_id,
        "product_name": product.and_then(|p| p["name"].as_str()).unwrap_or("unknown"),
        "price": product.and_then(|p| p["price"].as_str()).unwrap_or("0.00"),
        "quantity": line.quantity,
        "category_name": product.and_then(|p| p["category_title"].as_str()),
    })
}

async fn list_cart(State(state): State<Stub>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let Some(user) = session_user(&state, &headers) else {
        return unauthenticated();
    };
    let rows: Vec<Value> = state
        .cart_lines
        .iter()
        .filter(|l| l.owner == user.email)
        .map(|l| cart_line_json(&state, l))
        .collect();
    Json(Value::Array(rows)).into_response()
}

async fn add_cart(
    State(state): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(user) = session_user(&state, &headers) else {
        return unauthenticated();
    };
    let product_id = body["product_id"].as_i64().unwrap_or_default();
    let quantity = u32::try_from(body["quantity"].as_i64().unwrap_or(1)).unwrap_or(1);
    if !state
        .products
        .iter()
        .any(|p| p["id"].as_i64() == Some(product_id))
    {
        return validation_error("The selected product is invalid.", "product_id");
    }
    let id = state.next_id();
    let line = StubCartLine {
        id,
        owner: user.email,
        product_id,
        quantity,
    };
    let body = cart_line_json(&state, &line);
    state.cart_lines.push(line);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_cart(
    State(state): State<Stub>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(user) = session_user(&state, &headers) else {
        return unauthenticated();
    };
    let quantity = u32::try_from(body["quantity"].as_i64().unwrap_or(1)).unwrap_or(1);
    let Some(index) = state
        .cart_lines
        .iter()
        .position(|l| l.id == id && l.owner == user.email)
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    state.cart_lines[index].quantity = quantity;
    let line = state.cart_lines[index].clone();
    Json(cart_line_json(&state, &line)).into_response()
}

async fn remove_cart(
    State(state): State<Stub>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(user) = session_user(&state, &headers) else {
        return unauthenticated();
    };
    state
        .cart_lines
        .retain(|l| !(l.id == id && l.owner == user.email));
    StatusCode::NO_CONTENT.into_response()
}

async fn cart_count(State(state): State<Stub>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if state.fail_cart_count {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let Some(user) = session_user(&state, &headers) else {
        return unauthenticated();
    };
    let count: u32 = state
        .cart_lines
        .iter()
        .filter(|l| l.owner == user.email)
        .map(|l| l.quantity)
        .sum();
    Json(json!({"count": count})).into_response()
}

// =============================================================================
// Application harness
// =============================================================================

/// The real application served against a stub backend.
pub struct TestApp {
    pub base_url: String,
    pub backend: StubBackend,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the stub backend and the application on ephemeral ports.
    pub async fn spawn() -> Self {
        let backend = StubBackend::spawn().await;

        let config = AppConfig {
            backend_base_url: format!("http://{}", backend.addr),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config).expect("backend client");
        let app = shopwright_web::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base_url: format!("http://{addr}"),
            backend,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .unwrap()
    }

    pub async fn put_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .form(fields)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }

    /// Sign in as a seeded account (password is always "password").
    pub async fn login(&self, email: &str) -> reqwest::Response {
        self.post_form("/login", &[("email", email), ("password", "password")])
            .await
    }
}

/// Header value of `Location`, panicking when absent.
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .expect("expected a redirect")
        .to_str()
        .unwrap()
}
