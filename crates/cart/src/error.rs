//! Cart operation errors.
//!
//! Every operation failure is collapsed into a shopper notification by the
//! store; `CartError` is what the store logs and what decides which message
//! the shopper sees.

use rocket_cart_core::{CartDataError, ProductId};
use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Error type for cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds the current stock.
    #[error("Product {product_id} out of stock: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Stock or product service failed.
    #[error("Stock service error: {0}")]
    Api(#[from] ApiError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The resulting cart would break a cart constraint.
    #[error("Invalid cart: {0}")]
    InvalidCart(#[from] CartDataError),

    /// Cart could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CartError {
    /// Whether this is an expected rejection rather than a failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::OutOfStock { .. } | Self::NotInCart(_))
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
