//! Integration tests for Rocket Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-cart-integration-tests
//! ```
//!
//! No external services are needed: [`FakeStockServer`] serves the stock and
//! product endpoints from an in-process `axum` router on an ephemeral port,
//! and tests point a real `ApiClient` at it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Shared state behind the fake service.
#[derive(Default)]
pub struct ServiceState {
    stock: Mutex<HashMap<i32, u32>>,
    products: Mutex<HashMap<i32, String>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    stock_requests: AtomicUsize,
    product_requests: AtomicUsize,
}

/// In-process stand-in for the stock/product service.
///
/// Serves `GET /stock/{id}` and `GET /products/{id}`. The server task is
/// aborted when the value is dropped.
pub struct FakeStockServer {
    addr: SocketAddr,
    state: Arc<ServiceState>,
    task: JoinHandle<()>,
}

impl FakeStockServer {
    /// Bind to an ephemeral port on localhost and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(ServiceState::default());

        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, task })
    }

    /// Base URL to configure the API client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Add a product with the given stock level.
    pub fn add_product(&self, id: i32, title: &str, price: f64, stock: u32) {
        let body = json!({
            "id": id,
            "title": title,
            "price": price,
            "image": format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
        });
        self.set_product_body(id, &body.to_string());
        self.set_stock(id, stock);
    }

    /// Replace the raw response body for a product.
    pub fn set_product_body(&self, id: i32, body: &str) {
        lock(&self.state.products).insert(id, body.to_string());
    }

    pub fn set_stock(&self, id: i32, amount: u32) {
        lock(&self.state.stock).insert(id, amount);
    }

    /// Make every endpoint answer 500.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every response.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *lock(&self.state.delay) = delay;
    }

    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.stock_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeStockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Apply the configured delay and failure mode.
async fn before_response(state: &ServiceState) -> Option<Response> {
    let delay = *lock(&state.delay);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if state.failing.load(Ordering::SeqCst) {
        return Some((StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response());
    }
    None
}

async fn stock(State(state): State<Arc<ServiceState>>, Path(id): Path<i32>) -> Response {
    state.stock_requests.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = before_response(&state).await {
        return response;
    }

    let amount = lock(&state.stock).get(&id).copied();
    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn product(State(state): State<Arc<ServiceState>>, Path(id): Path<i32>) -> Response {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = before_response(&state).await {
        return response;
    }

    let body = lock(&state.products).get(&id).cloned();
    match body {
        Some(body) => (
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

/// Parse the JSON array stored under `key` in a `FileStore` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not the expected shape.
pub fn read_stored_cart(path: &std::path::Path, key: &str) -> Result<Value, String> {
    let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let entries: HashMap<String, String> =
        serde_json::from_str(&contents).map_err(|e| e.to_string())?;
    let raw = entries
        .get(key)
        .ok_or_else(|| format!("no entry for {key}"))?;
    serde_json::from_str(raw).map_err(|e| e.to_string())
}
