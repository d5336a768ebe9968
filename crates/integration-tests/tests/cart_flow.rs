//! End-to-end cart tests against an in-process stock service.
//!
//! Each test wires a real `ApiClient` and `FileStore` into a `CartStore`
//! and checks both the in-memory cart and the file on disk.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rocket_cart::api::ApiClient;
use rocket_cart::config::{ApiConfig, DEFAULT_STORAGE_KEY};
use rocket_cart::notify::{ChannelNotifier, Notification, Severity};
use rocket_cart::storage::FileStore;
use rocket_cart::{CartStore, UpdateProductAmount};
use rocket_cart_core::ProductId;
use rocket_cart_integration_tests::{FakeStockServer, read_stored_cart};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

type Store = CartStore<ApiClient, FileStore, ChannelNotifier>;

struct Harness {
    server: FakeStockServer,
    dir: TempDir,
    api: ApiClient,
}

impl Harness {
    async fn new() -> Self {
        let server = FakeStockServer::start()
            .await
            .expect("Failed to start fake stock server");
        server.add_product(1, "Tênis de Caminhada Leve Confortável", 179.9, 3);
        server.add_product(2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 139.9, 5);
        server.add_product(3, "Tênis Adidas Duramo Lite 2.0", 219.9, 2);

        let mut config = ApiConfig::new(&server.base_url()).expect("Invalid base URL");
        config.request_timeout = Duration::from_millis(500);
        let api = ApiClient::new(&config).expect("Failed to build API client");

        Self {
            server,
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            api,
        }
    }

    fn storage_path(&self) -> PathBuf {
        self.dir.path().join("storage.json")
    }

    /// Open a store on the shared storage file, as a fresh app start would.
    fn open(&self) -> (Store, UnboundedReceiver<Notification>) {
        let (notifier, rx) = ChannelNotifier::new();
        let store = CartStore::new(
            self.api.clone(),
            FileStore::new(self.storage_path()),
            notifier,
        );
        (store, rx)
    }

    fn stored_amounts(&self) -> Vec<(i64, i64)> {
        let stored = read_stored_cart(&self.storage_path(), DEFAULT_STORAGE_KEY)
            .expect("Failed to read stored cart");
        stored
            .as_array()
            .expect("Stored cart is not an array")
            .iter()
            .map(|line| {
                (
                    line["id"].as_i64().expect("id"),
                    line["amount"].as_i64().expect("amount"),
                )
            })
            .collect()
    }
}

fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut seen = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        seen.push(notification);
    }
    seen
}

fn amounts(store: &Store) -> Vec<(i32, u32)> {
    store
        .cart()
        .iter()
        .map(|line| (line.id.as_i32(), line.amount))
        .collect()
}

// ============================================================================
// Add
// ============================================================================

#[tokio::test]
async fn test_add_new_product_persists_line() {
    let harness = Harness::new().await;
    let (store, mut rx) = harness.open();

    store.add_product(ProductId::new(2)).await;

    assert_eq!(amounts(&store), vec![(2, 1)]);
    assert_eq!(harness.stored_amounts(), vec![(2, 1)]);
    assert_eq!(
        drain(&mut rx),
        vec![Notification::success("Product added to cart")]
    );

    let stored = read_stored_cart(&harness.storage_path(), DEFAULT_STORAGE_KEY).unwrap();
    assert_eq!(
        stored[0]["title"],
        "Tênis VR Caminhada Confortável Detalhes Couro Masculino"
    );
    assert!((stored[0]["price"].as_f64().unwrap() - 139.9).abs() < 1e-9);
}

#[tokio::test]
async fn test_add_until_out_of_stock() {
    let harness = Harness::new().await;
    let (store, mut rx) = harness.open();

    for _ in 0..3 {
        store.add_product(ProductId::new(3)).await;
    }

    assert_eq!(amounts(&store), vec![(3, 2)]);
    assert_eq!(harness.stored_amounts(), vec![(3, 2)]);

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 3);
    assert_eq!(
        notifications[2],
        Notification::error("Requested quantity out of stock")
    );
    // Only the first add needed catalog metadata
    assert_eq!(harness.server.product_requests(), 1);
    assert_eq!(harness.server.stock_requests(), 3);
}

#[tokio::test]
async fn test_add_unknown_product() {
    let harness = Harness::new().await;
    let (store, mut rx) = harness.open();

    store.add_product(ProductId::new(99)).await;

    assert!(store.cart().is_empty());
    assert!(!harness.storage_path().exists());
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error("Error adding product")]
    );
}

#[tokio::test]
async fn test_add_with_malformed_product_response() {
    let harness = Harness::new().await;
    harness.server.set_product_body(1, r#"{"id": 1, "title": "No price"}"#);
    let (store, mut rx) = harness.open();

    store.add_product(ProductId::new(1)).await;

    assert!(store.cart().is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error("Error adding product")]
    );
}

#[tokio::test]
async fn test_add_when_service_fails() {
    let harness = Harness::new().await;
    let (store, mut rx) = harness.open();
    store.add_product(ProductId::new(1)).await;
    drain(&mut rx);

    harness.server.set_failing(true);
    store.add_product(ProductId::new(1)).await;

    assert_eq!(amounts(&store), vec![(1, 1)]);
    assert_eq!(harness.stored_amounts(), vec![(1, 1)]);
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error("Error adding product")]
    );
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let harness = Harness::new().await;
    harness.server.set_delay(Some(Duration::from_secs(3)));
    let (store, mut rx) = harness.open();

    store.add_product(ProductId::new(1)).await;

    assert!(store.cart().is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error("Error adding product")]
    );
}

#[tokio::test]
async fn test_concurrent_adds_from_spawned_tasks() {
    let harness = Harness::new().await;
    let (store, mut rx) = harness.open();
    let store = Arc::new(store);

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.add_product(ProductId::new(2)).await })
        })
        .collect();
    for task in tasks {
        task.await.expect("add task panicked");
    }

    assert_eq!(amounts(&store), vec![(2, 4)]);
    assert_eq!(harness.stored_amounts(), vec![(2, 4)]);
    assert!(
        drain(&mut rx)
            .iter()
            .all(|n| n.severity == Severity::Success)
    );
}

#[tokio::test]
async fn test_catalog_cache() {
    let harness = Harness::new().await;
    let (store, _rx) = harness.open();

    store.add_product(ProductId::new(1)).await;
    store.remove_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(1)).await;
    assert_eq!(harness.server.product_requests(), 1);

    harness.api.clear_cache();
    store.remove_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(1)).await;
    assert_eq!(harness.server.product_requests(), 2);
}

// ============================================================================
// Remove & Update
// ============================================================================

#[tokio::test]
async fn test_remove_is_local() {
    let harness = Harness::new().await;
    let (store, mut rx) = harness.open();
    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(2)).await;
    drain(&mut rx);
    let requests_before = harness.server.stock_requests();

    store.remove_product(ProductId::new(1)).await;

    assert_eq!(amounts(&store), vec![(2, 1)]);
    assert_eq!(harness.stored_amounts(), vec![(2, 1)]);
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error(
            "Tênis de Caminhada Leve Confortável removed from cart"
        )]
    );
    assert_eq!(harness.server.stock_requests(), requests_before);

    store.remove_product(ProductId::new(1)).await;
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error("Error removing product")]
    );
}

#[tokio::test]
async fn test_update_amount_against_live_stock() {
    let harness = Harness::new().await;
    let (store, mut rx) = harness.open();
    store.add_product(ProductId::new(1)).await;
    store.add_product(ProductId::new(2)).await;
    drain(&mut rx);

    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(2),
            amount: 5,
        })
        .await;
    assert_eq!(amounts(&store), vec![(1, 1), (2, 5)]);
    assert!(drain(&mut rx).is_empty());

    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(1),
            amount: 4,
        })
        .await;
    assert_eq!(amounts(&store), vec![(1, 1), (2, 5)]);
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error("Requested quantity out of stock")]
    );

    harness.server.set_stock(1, 10);
    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(1),
            amount: 4,
        })
        .await;
    assert_eq!(amounts(&store), vec![(2, 5), (1, 4)]);
    assert_eq!(harness.stored_amounts(), vec![(2, 5), (1, 4)]);

    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(1),
            amount: 0,
        })
        .await;
    assert_eq!(amounts(&store), vec![(2, 5), (1, 4)]);
    assert!(drain(&mut rx).is_empty());
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_cart_round_trips_across_restarts() {
    let harness = Harness::new().await;

    let (first, _rx) = harness.open();
    first.add_product(ProductId::new(1)).await;
    first.add_product(ProductId::new(2)).await;
    first.add_product(ProductId::new(1)).await;
    let before = first.cart();
    drop(first);

    let (second, _rx) = harness.open();
    assert_eq!(second.cart(), before);
    assert_eq!(amounts(&second), vec![(2, 1), (1, 2)]);
}

#[tokio::test]
async fn test_invalid_stored_cart_starts_empty() {
    let harness = Harness::new().await;
    let entries = serde_json::json!({ DEFAULT_STORAGE_KEY: "[{\"id\": 1}]", "theme": "dark" });
    std::fs::write(harness.storage_path(), entries.to_string()).unwrap();

    let (store, _rx) = harness.open();
    assert!(store.cart().is_empty());

    // The next commit replaces the bad value and keeps unrelated keys
    store.add_product(ProductId::new(3)).await;
    assert_eq!(harness.stored_amounts(), vec![(3, 1)]);
    let contents = std::fs::read_to_string(harness.storage_path()).unwrap();
    assert!(contents.contains("theme"));
}
