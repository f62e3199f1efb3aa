//! Integration tests for the Hardalum storefront.
//!
//! Tests run the real storefront library against [`MockApi`], an in-process
//! axum server that speaks the storefront API's JSON and records every
//! request it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hardalum-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use hardalum_storefront::Storefront;
use hardalum_storefront::config::StorefrontConfig;
use hardalum_storefront::storage::{KeyValueStore, MemoryStore};

/// Token the mock API accepts as valid.
pub const VALID_TOKEN: &str = "valid-token";

/// Credentials the mock API accepts on `/api/login`.
pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct horse";

/// ID of the account returned by login, signup, and profile.
pub const USER_ID: i64 = 42;

/// ID of the account returned by `find-or-create`.
pub const GUEST_USER_ID: i64 = 77;

/// ID of every order the mock API confirms.
pub const ORDER_ID: i64 = 501;

/// Requests the mock API has seen, plus switches that make it misbehave.
#[derive(Debug, Default)]
pub struct Recorded {
    pub cart_posts: Vec<Value>,
    /// `(Authorization header, body)` for each order.
    pub orders: Vec<(Option<String>, Value)>,
    pub find_or_create: Vec<Value>,
    pub contact: Vec<Value>,
    pub product_list_hits: usize,

    pub fail_cart: bool,
    pub fail_catalog: bool,
}

/// A running mock storefront API.
#[derive(Debug, Clone)]
pub struct MockApi {
    url: String,
    state: Arc<Mutex<Recorded>>,
}

impl MockApi {
    /// Start the server on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(Recorded::default()));

        let app = Router::new()
            .route("/api/products", get(list_products))
            .route("/api/products/{id}", get(get_product))
            .route("/api/search", get(search))
            .route("/api/categories", get(categories))
            .route("/api/cart", post(cart))
            .route("/api/login", post(login))
            .route("/api/signup", post(signup))
            .route("/api/profile", get(profile))
            .route("/api/users/find-or-create", post(find_or_create))
            .route("/api/orders", post(place_order))
            .route("/api/orders/user", get(order_history))
            .route("/api/contact", post(contact))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock API failed");
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL of the server.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lock the recorded state for inspection or to flip a switch.
    pub fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Storefront configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the server URL is rejected.
    #[must_use]
    pub fn config(&self, data_dir: &std::path::Path) -> StorefrontConfig {
        StorefrontConfig::local(&self.url, data_dir).expect("Mock API URL is valid")
    }

    /// Open a storefront over `storage` against this server.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be opened.
    pub async fn storefront(&self, storage: Arc<dyn KeyValueStore>) -> Storefront {
        Storefront::with_storage(self.config(std::path::Path::new(".")), storage)
            .await
            .expect("Failed to open storefront")
    }

    /// Open a storefront with fresh in-memory storage.
    pub async fn ephemeral_storefront(&self) -> (Storefront, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let storefront = self.storefront(storage.clone()).await;
        (storefront, storage)
    }
}

type Shared = State<Arc<Mutex<Recorded>>>;

fn lock(state: &Mutex<Recorded>) -> MutexGuard<'_, Recorded> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn bearer_is_valid(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {VALID_TOKEN}").as_str())
}

fn user_json(id: i64, username: &str, email: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": email,
        "created_at": "2024-05-01T12:00:00Z",
    })
}

/// Catalog served by the mock: two variant products and one flat-priced.
#[must_use]
pub fn catalog() -> Value {
    json!([
        {
            "id": 1,
            "name": "Round Aluminum Tubing",
            "description": "Telescopic tubing",
            "imageUrl": "https://img.example/1.jpg",
            "category_name": "Aluminum Pipes",
            "dimensionsOptions": [
                { "id": 1, "dimension": "3/8\" Diameter", "price": 35.5 },
                { "id": 2, "dimension": "1/2\" Diameter", "price": 40 }
            ]
        },
        {
            "id": 5,
            "name": "Telescopic Tubing Lock",
            "description": "L lever",
            "imageUrl": "https://img.example/5.jpg",
            "category_name": "Aluminum Connectors",
            "price": "15.20"
        },
        {
            "id": 9,
            "name": "Aluminum Sheet",
            "description": "Flat stock",
            "imageUrl": "https://img.example/9.jpg",
            "category_name": "Aluminum Sheets",
            "dimensionsOptions": [
                { "id": 30, "dimension": "12\" x 12\"", "price": 22 }
            ]
        }
    ])
}

async fn list_products(State(state): Shared) -> Response {
    let mut recorded = lock(&state);
    recorded.product_list_hits += 1;
    if recorded.fail_catalog {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    Json(catalog()).into_response()
}

async fn get_product(State(state): Shared, Path(id): Path<i64>) -> Response {
    if lock(&state).fail_catalog {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    catalog()
        .as_array()
        .and_then(|products| products.iter().find(|p| p["id"] == id))
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p.clone()).into_response(),
        )
}

async fn search(State(state): Shared, Query(params): Query<HashMap<String, String>>) -> Response {
    if lock(&state).fail_catalog {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    let term = params.get("q").map(|q| q.to_lowercase()).unwrap_or_default();
    let products: Vec<Value> = catalog()
        .as_array()
        .into_iter()
        .flatten()
        .filter(|p| {
            p["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&term))
        })
        .cloned()
        .collect();
    Json(json!({ "products": products })).into_response()
}

async fn categories(State(state): Shared) -> Response {
    if lock(&state).fail_catalog {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    Json(json!([
        { "id": 10, "name": "Aluminum Pipes" },
        { "id": 11, "name": "Aluminum Connectors" },
        { "id": 12, "name": "Aluminum Sheets" }
    ]))
    .into_response()
}

async fn cart(State(state): Shared, Json(body): Json<Value>) -> Response {
    let mut recorded = lock(&state);
    recorded.cart_posts.push(body);
    if recorded.fail_cart {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Cart service unavailable");
    }
    (StatusCode::CREATED, Json(json!({ "message": "Item added" }))).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        Json(json!({
            "user": user_json(USER_ID, "ada", EMAIL),
            "token": VALID_TOKEN,
        }))
        .into_response()
    } else {
        error(StatusCode::BAD_REQUEST, "Invalid credentials")
    }
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }
    let username = body["username"].as_str().unwrap_or_default();
    let email = body["email"].as_str().unwrap_or_default();
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User created",
            "user": user_json(USER_ID + 1, username, email),
            "token": VALID_TOKEN,
        })),
    )
        .into_response()
}

async fn profile(headers: HeaderMap) -> Response {
    if bearer_is_valid(&headers) {
        Json(json!({ "user": user_json(USER_ID, "ada", EMAIL) })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid token")
    }
}

async fn find_or_create(State(state): Shared, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    lock(&state).find_or_create.push(body);
    Json(json!({ "user": user_json(GUEST_USER_ID, &name, &email) })).into_response()
}

async fn place_order(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    if auth.is_some() && !bearer_is_valid(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    lock(&state).orders.push((auth, body));
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Order placed", "orderId": ORDER_ID })),
    )
        .into_response()
}

async fn order_history(headers: HeaderMap) -> Response {
    if !bearer_is_valid(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    Json(json!({
        "orders": [{
            "id": ORDER_ID,
            "order_date": "2024-06-01T09:30:00Z",
            "total_amount": "95.00",
            "status": "shipped",
            "shipping_address": "1 Main St, Springfield, 12345",
            "billing_address": "1 Main St, Springfield, 12345",
            "items": [{
                "quantity": 2,
                "price_at_purchase": "40.00",
                "product_name": "Round Aluminum Tubing",
                "imageUrl": "https://img.example/1.jpg",
                "dimension": "1/2\" Diameter"
            }]
        }]
    }))
    .into_response()
}

async fn contact(State(state): Shared, Json(body): Json<Value>) -> Response {
    lock(&state).contact.push(body);
    Json(json!({ "message": "Message received" })).into_response()
}
