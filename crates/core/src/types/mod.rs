//! Core types for Rocket Cart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod product;

pub use cart::{Cart, CartDataError};
pub use id::*;
pub use product::{Product, ProductDetails, Stock};
