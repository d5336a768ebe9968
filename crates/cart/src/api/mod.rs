//! Remote stock and product services.
//!
//! # Architecture
//!
//! - [`StockService`] and [`ProductCatalog`] are the seams the cart store
//!   depends on; tests drive the store with in-memory fakes
//! - [`ApiClient`] implements both over HTTP with `reqwest`
//! - Product metadata is cached in memory via `moka`; stock never is, since
//!   every cart change must be checked against the current level
//!
//! # Endpoints
//!
//! - `GET {base}/stock/{id}` returns `{ "id": 1, "amount": 3 }`
//! - `GET {base}/products/{id}` returns `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_cart::api::{ApiClient, StockService};
//!
//! let client = ApiClient::new(&config.api)?;
//! let stock = client.stock(ProductId::new(1)).await?;
//! ```

mod client;

use std::future::Future;
use std::sync::Arc;

use rocket_cart_core::{ProductDetails, ProductId, Stock};
use thiserror::Error;

pub use client::ApiClient;

/// Errors that can occur when talking to the stock/product service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("API error: {status} from {url}")]
    Status { status: u16, url: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not have the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Source of current stock levels.
pub trait StockService: Send + Sync {
    /// Fetch the purchasable quantity of a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, ApiError>> + Send;
}

/// Source of product metadata.
pub trait ProductCatalog: Send + Sync {
    /// Fetch title, price and image for a product.
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<ProductDetails, ApiError>> + Send;
}

impl<S: StockService + ?Sized> StockService for Arc<S> {
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, ApiError>> + Send {
        (**self).stock(id)
    }
}

impl<C: ProductCatalog + ?Sized> ProductCatalog for Arc<C> {
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<ProductDetails, ApiError>> + Send {
        (**self).product(id)
    }
}
