//! Rocket Cart - shopping cart state for a storefront front-end.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart and is its only write path
//! - Stock levels and product metadata come from a remote service
//!   ([`api::StockService`], [`api::ProductCatalog`])
//! - The cart is persisted as a JSON array under a fixed storage key
//!   ([`storage::PersistentStore`])
//! - Shoppers learn about outcomes through a [`notify::NotificationSink`]
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_cart::{CartConfig, CartStore};
//! use rocket_cart::api::ApiClient;
//! use rocket_cart::notify::TracingNotifier;
//! use rocket_cart::storage::FileStore;
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::with_key(
//!     ApiClient::new(&config.api)?,
//!     FileStore::new(&config.storage.path),
//!     TracingNotifier,
//!     &config.storage.key,
//! );
//!
//! store.add_product(ProductId::new(1)).await;
//! println!("{} items", store.cart().total_quantity());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use config::CartConfig;
pub use error::CartError;
pub use store::{CartStore, UpdateProductAmount};
