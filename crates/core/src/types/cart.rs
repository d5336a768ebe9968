//! The cart: an ordered, id-unique list of line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// Errors raised when a list of line items does not form a valid cart.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartDataError {
    /// The same product appears on more than one line.
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
    /// A line carries a quantity below 1.
    #[error("product {0} has an invalid amount")]
    InvalidAmount(ProductId),
}

/// A shopping cart.
///
/// ## Constraints
///
/// - No two lines share a product ID
/// - Every line has an amount of at least 1
///
/// Lines keep insertion order, but an updated line moves to the end, so
/// order carries no meaning beyond display.
///
/// Serializes as a plain JSON array of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart(Vec<Product>);

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a cart from line items, checking the cart constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if a product ID repeats or an amount is zero.
    pub fn from_lines(lines: Vec<Product>) -> Result<Self, CartDataError> {
        for (i, line) in lines.iter().enumerate() {
            if line.amount == 0 {
                return Err(CartDataError::InvalidAmount(line.id));
            }
            if lines.iter().skip(i + 1).any(|other| other.id == line.id) {
                return Err(CartDataError::DuplicateProduct(line.id));
            }
        }
        Ok(Self(lines))
    }

    /// Parse a cart from its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error for malformed JSON or for a list that
    /// breaks the cart constraints.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the cart to its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.0.iter().find(|line| line.id == id)
    }

    /// Current quantity of a product, 0 when absent.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |line| line.amount)
    }

    /// Return a new cart with `line` replacing any existing line for the
    /// same product, placed at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the line's amount is zero.
    pub fn with_line(&self, line: Product) -> Result<Self, CartDataError> {
        if line.amount == 0 {
            return Err(CartDataError::InvalidAmount(line.id));
        }
        let mut lines = self.without_id(line.id);
        lines.push(line);
        Ok(Self(lines))
    }

    /// Return a new cart without the line for `id`, along with the removed
    /// line. `None` when the product is not in the cart.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<(Self, Product)> {
        let removed = self.get(id)?.clone();
        Some((Self(self.without_id(id)), removed))
    }

    fn without_id(&self, id: ProductId) -> Vec<Product> {
        self.0.iter().filter(|line| line.id != id).cloned().collect()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.0.iter().map(|line| u64::from(line.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.0.iter().map(Product::line_total).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let lines = Vec::<Product>::deserialize(deserializer)?;
        Self::from_lines(lines).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
