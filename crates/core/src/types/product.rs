//! Product and stock records.
//!
//! Prices travel as JSON numbers, both on the wire and in stored carts, so
//! the decimal fields use float serialization rather than the string form.
//! A price therefore passes through `f64` and survives a round trip only up
//! to about 15 significant digits, far beyond any catalog price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Catalog metadata for a product, as returned by the product service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URL.
    #[serde(alias = "imageUrl")]
    pub image: String,
}

impl ProductDetails {
    /// Turn catalog metadata into a cart line item with the given quantity.
    #[must_use]
    pub fn into_line_item(self, amount: u32) -> Product {
        Product {
            id: self.id,
            title: self.title,
            price: self.price,
            image: self.image,
            amount,
        }
    }
}

/// A cart line item: product metadata plus the quantity in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(alias = "imageUrl")]
    pub image: String,
    /// Quantity in the cart. Always at least 1 while the line is present.
    pub amount: u32,
}

impl Product {
    /// Price of this line (`price * amount`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }
}

/// Maximum purchasable quantity for a product at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be bought.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}
