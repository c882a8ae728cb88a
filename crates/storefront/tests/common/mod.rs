//! Shared fixtures: an in-process fake QKart backend and a storefront
//! served in front of it, both on ephemeral ports.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use qkart_storefront::config::{ApiConfig, StorefrontConfig, parse_api_url};
use qkart_storefront::state::AppState;

pub const USERNAME: &str = "crio.do";
pub const PASSWORD: &str = "learnbydoing";
pub const TOKEN: &str = "test-token";
pub const STARTING_BALANCE: u64 = 5000;

// =============================================================================
// Fake QKart backend
// =============================================================================

#[derive(Clone)]
pub struct FakeProduct {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub cost: u64,
    pub rating: u8,
}

pub const CATALOG: &[FakeProduct] = &[
    FakeProduct {
        id: "BW0jAAeDJmlZCF8i",
        name: "Tan Leatherette Weekender Duffle",
        category: "Fashion",
        cost: 150,
        rating: 4,
    },
    FakeProduct {
        id: "KCRwjF7lN97HnEaY",
        name: "Black Nike Sneakers",
        category: "Footwear",
        cost: 50,
        rating: 5,
    },
    FakeProduct {
        id: "upLK9JbQ4rMhTwt4",
        name: "YONEX Smash Badminton Racquet",
        category: "Sports",
        cost: 100,
        rating: 5,
    },
    FakeProduct {
        id: "v4sLtEcMpzabRyfx",
        name: "Diamond Ring",
        category: "Jewelry",
        cost: 6000,
        rating: 3,
    },
];

impl FakeProduct {
    fn to_json(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "category": self.category,
            "cost": self.cost,
            "rating": self.rating,
            "image": format!("https://crio-directus-assets.s3.ap-south-1.amazonaws.com/{}.png", self.id),
        })
    }
}

#[derive(Default)]
pub struct BackendData {
    pub users: HashMap<String, String>,
    pub balance: u64,
    pub cart: Vec<(String, u32)>,
    pub addresses: Vec<(String, String)>,
    pub next_address: u32,
    pub orders: u32,
}

/// Handle to the fake backend's data for assertions.
#[derive(Clone)]
pub struct FakeBackend {
    pub data: Arc<Mutex<BackendData>>,
    pub url: String,
}

impl FakeBackend {
    pub fn cart(&self) -> Vec<(String, u32)> {
        self.data.lock().unwrap().cart.clone()
    }

    pub fn orders(&self) -> u32 {
        self.data.lock().unwrap().orders
    }

    /// Register an account directly, bypassing storefront validation.
    pub fn add_user(&self, username: &str, password: &str) {
        self.data
            .lock()
            .unwrap()
            .users
            .insert(username.to_string(), password.to_string());
    }
}

type Shared = Arc<Mutex<BackendData>>;

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "success": false, "message": text }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    message(
        StatusCode::UNAUTHORIZED,
        "Protected route, Oauth2 Bearer token not found",
    )
}

async fn products() -> Json<Value> {
    Json(Value::Array(CATALOG.iter().map(FakeProduct::to_json).collect()))
}

#[derive(Deserialize)]
struct SearchParams {
    value: String,
}

async fn search(Query(params): Query<SearchParams>) -> Response {
    let needle = params.value.to_lowercase();
    let hits: Vec<Value> = CATALOG
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle)
        })
        .map(FakeProduct::to_json)
        .collect();

    if hits.is_empty() {
        (StatusCode::NOT_FOUND, Json(json!([]))).into_response()
    } else {
        Json(Value::Array(hits)).into_response()
    }
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn register(State(data): State<Shared>, Json(creds): Json<Credentials>) -> Response {
    let mut data = data.lock().unwrap();
    if data.users.contains_key(&creds.username) {
        return message(StatusCode::BAD_REQUEST, "Username is already taken");
    }
    data.users.insert(creds.username, creds.password);
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

async fn login(State(data): State<Shared>, Json(creds): Json<Credentials>) -> Response {
    let data = data.lock().unwrap();
    match data.users.get(&creds.username) {
        None => message(StatusCode::BAD_REQUEST, "Username does not exist"),
        Some(password) if *password != creds.password => {
            message(StatusCode::BAD_REQUEST, "Password is incorrect")
        }
        Some(_) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "token": TOKEN,
                "username": creds.username,
                "balance": data.balance,
            })),
        )
            .into_response(),
    }
}

fn cart_json(data: &BackendData) -> Json<Value> {
    Json(Value::Array(
        data.cart
            .iter()
            .map(|(id, qty)| json!({ "productId": id, "qty": qty }))
            .collect(),
    ))
}

async fn get_cart(State(data): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    cart_json(&data.lock().unwrap()).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartUpdate {
    product_id: String,
    qty: u32,
}

async fn set_cart(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(update): Json<CartUpdate>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if !CATALOG.iter().any(|p| p.id == update.product_id) {
        return message(StatusCode::NOT_FOUND, "Product doesn't exist");
    }

    let mut data = data.lock().unwrap();
    let existing = data.cart.iter().position(|(id, _)| *id == update.product_id);
    match (existing, update.qty) {
        (Some(i), 0) => {
            data.cart.remove(i);
        }
        (Some(i), qty) => data.cart[i].1 = qty,
        (None, 0) => {}
        (None, qty) => data.cart.push((update.product_id, qty)),
    }
    cart_json(&data).into_response()
}

fn addresses_json(data: &BackendData) -> Json<Value> {
    Json(Value::Array(
        data.addresses
            .iter()
            .map(|(id, address)| json!({ "_id": id, "address": address }))
            .collect(),
    ))
}

async fn get_addresses(State(data): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    addresses_json(&data.lock().unwrap()).into_response()
}

#[derive(Deserialize)]
struct NewAddress {
    address: String,
}

async fn add_address(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewAddress>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut data = data.lock().unwrap();
    data.next_address += 1;
    let id = format!("addr{}", data.next_address);
    data.addresses.push((id, body.address));
    addresses_json(&data).into_response()
}

async fn delete_address(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut data = data.lock().unwrap();
    let before = data.addresses.len();
    data.addresses.retain(|(existing, _)| *existing != id);
    if data.addresses.len() == before {
        return message(StatusCode::NOT_FOUND, "Address to delete was not found");
    }
    addresses_json(&data).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutBody {
    address_id: String,
}

async fn checkout(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut data = data.lock().unwrap();
    if data.cart.is_empty() {
        return message(StatusCode::BAD_REQUEST, "Cart is empty");
    }
    if !data.addresses.iter().any(|(id, _)| *id == body.address_id) {
        return message(StatusCode::BAD_REQUEST, "Address not set");
    }

    let total: u64 = data
        .cart
        .iter()
        .filter_map(|(id, qty)| {
            CATALOG
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.cost * u64::from(*qty))
        })
        .sum();
    if total > data.balance {
        return message(
            StatusCode::BAD_REQUEST,
            "Wallet balance not sufficient to place order",
        );
    }

    data.balance -= total;
    data.cart.clear();
    data.orders += 1;
    Json(json!({ "success": true })).into_response()
}

/// Start the fake backend with one registered user.
pub async fn spawn_backend() -> FakeBackend {
    let mut initial = BackendData {
        balance: STARTING_BALANCE,
        ..BackendData::default()
    };
    initial
        .users
        .insert(USERNAME.to_string(), PASSWORD.to_string());
    let data = Arc::new(Mutex::new(initial));

    let api = Router::new()
        .route("/products", get(products))
        .route("/products/search", get(search))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/cart", get(get_cart).post(set_cart))
        .route("/cart/checkout", post(checkout))
        .route("/user/addresses", get(get_addresses).post(add_address))
        .route("/user/addresses/{id}", delete(delete_address))
        .with_state(Arc::clone(&data));
    let router = Router::new().nest("/api/v1", api);

    let addr = serve(router).await;
    FakeBackend {
        data,
        url: format!("http://{addr}/api/v1"),
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

// =============================================================================
// Storefront under test
// =============================================================================

pub fn test_config(api_url: &str, search_debounce: Duration) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost".to_string(),
        rate_limit: false,
        api: ApiConfig {
            base_url: parse_api_url(api_url).unwrap(),
            timeout: Duration::from_secs(5),
            catalog_ttl: Duration::from_secs(60),
        },
        search_debounce,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A running storefront and a cookie-keeping client pointed at it.
pub struct Storefront {
    pub url: String,
    pub client: reqwest::Client,
}

impl Storefront {
    pub async fn start(config: StorefrontConfig) -> Self {
        let state = AppState::new(config).unwrap();
        let addr = serve(qkart_storefront::app(state)).await;
        Self {
            url: format!("http://{addr}"),
            client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .unwrap(),
        }
    }

    /// Storefront in front of a fresh fake backend, without debouncing.
    pub async fn with_backend() -> (Self, FakeBackend) {
        let backend = spawn_backend().await;
        let storefront = Self::start(test_config(&backend.url, Duration::ZERO)).await;
        (storefront, backend)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.url))
            .send()
            .await
            .unwrap()
    }

    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.url))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    pub async fn login(&self) {
        let response = self
            .post("/login", &[("username", USERNAME), ("password", PASSWORD)])
            .await;
        assert_eq!(response.url().path(), "/");
        let body = response.text().await.unwrap();
        assert!(body.contains("Logged in successfully"));
    }
}
