//! The cart store.
//!
//! `CartStore` owns the shopper's cart and is its only write path. Each
//! operation checks the remote stock level, commits the new cart to durable
//! storage and memory, and tells the shopper what happened through the
//! notification sink.
//!
//! # Concurrency
//!
//! Operations take a writer lock for their whole read-modify-write,
//! including the remote calls, so two rapid `add_product` calls for the same
//! product both land. Readers never wait on that lock: committed carts are
//! published on a `watch` channel.

use rocket_cart_core::{Cart, Product, ProductId};
use serde::Deserialize;
use tokio::sync::{Mutex, watch};
use tracing::instrument;

use crate::api::{ProductCatalog, StockService};
use crate::config::DEFAULT_STORAGE_KEY;
use crate::error::{CartError, Result};
use crate::notify::{Notification, NotificationSink, messages};
use crate::storage::PersistentStore;

/// Request to set a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// New absolute quantity. Values below 1 are ignored.
    pub amount: i32,
}

/// Shopping cart state backed by a stock service and durable storage.
pub struct CartStore<A, P, N> {
    api: A,
    storage: P,
    notifier: N,
    key: String,
    writer: Mutex<()>,
    cart: watch::Sender<Cart>,
}

impl<A, P, N> CartStore<A, P, N>
where
    A: StockService + ProductCatalog,
    P: PersistentStore,
    N: NotificationSink,
{
    /// Create a store using the default storage key.
    ///
    /// The cart is loaded from storage once, here. A missing, unreadable or
    /// invalid stored value yields an empty cart.
    pub fn new(api: A, storage: P, notifier: N) -> Self {
        Self::with_key(api, storage, notifier, DEFAULT_STORAGE_KEY)
    }

    /// Create a store that keeps its cart under `key`.
    pub fn with_key(api: A, storage: P, notifier: N, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = load_cart(&storage, &key);
        let (cart, _) = watch::channel(cart);

        Self {
            api,
            storage,
            notifier,
            key,
            writer: Mutex::new(()),
            cart,
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.cart.borrow().clone()
    }

    /// Receiver that observes every committed cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.subscribe()
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart has its quantity incremented; a new
    /// product is looked up in the catalog and added with quantity 1.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        let _guard = self.writer.lock().await;

        match self.try_add_product(product_id).await {
            Ok(line) => {
                tracing::info!(amount = line.amount, "Product added to cart");
                self.notifier
                    .notify(Notification::success(messages::PRODUCT_ADDED));
            }
            Err(e) => self.report(&e, messages::ADD_FAILED),
        }
    }

    /// Remove a product's line from the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) {
        let _guard = self.writer.lock().await;

        match self.try_remove_product(product_id) {
            Ok(removed) => {
                tracing::info!("Product removed from cart");
                // Removal confirmations use error styling in the storefront UI
                self.notifier.notify(Notification::error(
                    messages::product_removed(&removed.title),
                ));
            }
            Err(e) => self.report(&e, messages::REMOVE_FAILED),
        }
    }

    /// Set a line's quantity.
    ///
    /// An amount below 1 is ignored without notifying. Setting the amount of
    /// a product that is not in the cart is reported as an update failure.
    #[instrument(skip(self), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) {
        let Ok(requested) = u32::try_from(request.amount) else {
            return;
        };
        if requested == 0 {
            return;
        }

        let _guard = self.writer.lock().await;

        match self
            .try_update_product_amount(request.product_id, requested)
            .await
        {
            Ok(()) => tracing::info!("Product amount updated"),
            Err(e) => self.report(&e, messages::UPDATE_FAILED),
        }
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<Product> {
        let stock = self.api.stock(product_id).await?;
        let current = self.cart();

        let requested = current.amount_of(product_id).saturating_add(1);
        if !stock.covers(requested) {
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let line = match current.get(product_id) {
            Some(existing) => Product {
                amount: requested,
                ..existing.clone()
            },
            None => self.api.product(product_id).await?.into_line_item(1),
        };

        self.commit(current.with_line(line.clone())?)?;
        Ok(line)
    }

    fn try_remove_product(&self, product_id: ProductId) -> Result<Product> {
        let (updated, removed) = self
            .cart()
            .without(product_id)
            .ok_or(CartError::NotInCart(product_id))?;

        self.commit(updated)?;
        Ok(removed)
    }

    async fn try_update_product_amount(&self, product_id: ProductId, requested: u32) -> Result<()> {
        let current = self.cart();
        let existing = current
            .get(product_id)
            .ok_or(CartError::NotInCart(product_id))?;

        let stock = self.api.stock(product_id).await?;
        if !stock.covers(requested) {
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let line = Product {
            amount: requested,
            ..existing.clone()
        };
        self.commit(current.with_line(line)?)
    }

    /// Persist `cart`, then publish it.
    ///
    /// Nothing is published when the write fails, so memory never runs ahead
    /// of storage.
    fn commit(&self, cart: Cart) -> Result<()> {
        let json = cart.to_json()?;
        self.storage.set(&self.key, &json)?;
        self.cart.send_replace(cart);
        Ok(())
    }

    /// Log a failed operation and tell the shopper.
    fn report(&self, error: &CartError, fallback: &str) {
        if error.is_rejection() {
            tracing::warn!(error = %error, "Cart change rejected");
        } else {
            tracing::error!(error = %error, "Cart operation failed");
        }

        let message = match error {
            CartError::OutOfStock { .. } => messages::OUT_OF_STOCK,
            _ => fallback,
        };
        self.notifier.notify(Notification::error(message));
    }
}

/// Read the stored cart, falling back to an empty one.
fn load_cart(storage: &impl PersistentStore, key: &str) -> Cart {
    match storage.get(key) {
        Ok(Some(json)) => Cart::from_json(&json).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Ignoring invalid stored cart");
            Cart::new()
        }),
        Ok(None) => Cart::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored cart");
            Cart::new()
        }
    }
}
