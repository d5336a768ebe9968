//! Rocket Cart Core - Shared cart types.
//!
//! This crate provides the data model used across all Rocket Cart components:
//! - `cart` - The cart store library (remote services, storage, notifications)
//! - `cli` - Command-line front-end for inspecting and editing a cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, line items, stock levels and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
