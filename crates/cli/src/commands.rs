//! Cart commands.
//!
//! Each invocation opens the cart stored at `CART_STORAGE_PATH`, runs one
//! operation against the stock service at `CART_API_URL`, and prints the
//! notifications the operation produced.

use rocket_cart::api::{ApiClient, ApiError};
use rocket_cart::config::ConfigError;
use rocket_cart::notify::{ChannelNotifier, Notification, TracingNotifier};
use rocket_cart::storage::FileStore;
use rocket_cart::{CartConfig, CartStore, UpdateProductAmount};
use rocket_cart_core::{Cart, ProductId};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// Errors that can occur while setting up or running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be built.
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    /// Cart could not be encoded for display.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

type CliStore = CartStore<ApiClient, FileStore, (TracingNotifier, ChannelNotifier)>;

/// A cart store plus the receiving end of its notifications.
pub struct Session {
    store: CliStore,
    notifications: UnboundedReceiver<Notification>,
}

impl Session {
    /// Open the configured cart.
    pub fn open() -> Result<Self, CommandError> {
        let config = CartConfig::from_env()?;
        let api = ApiClient::new(&config.api)?;
        let storage = FileStore::new(&config.storage.path);
        let (notifier, notifications) = ChannelNotifier::new();

        tracing::debug!(
            api = %config.api.base_url,
            storage = %config.storage.path.display(),
            "Opening cart"
        );

        Ok(Self {
            store: CartStore::with_key(
                api,
                storage,
                (TracingNotifier, notifier),
                config.storage.key,
            ),
            notifications,
        })
    }

    pub fn show(&self, json: bool) -> Result<(), CommandError> {
        let cart = self.store.cart();
        if json {
            print_line(&cart.to_json()?);
        } else {
            for line in render_table(&cart) {
                print_line(&line);
            }
        }
        Ok(())
    }

    pub async fn add(&mut self, product_id: ProductId) {
        self.store.add_product(product_id).await;
        self.print_notifications();
    }

    pub async fn remove(&mut self, product_id: ProductId) {
        self.store.remove_product(product_id).await;
        self.print_notifications();
    }

    pub async fn set(&mut self, product_id: ProductId, amount: i32) {
        self.store
            .update_product_amount(UpdateProductAmount { product_id, amount })
            .await;
        self.print_notifications();
    }

    fn print_notifications(&mut self) {
        while let Ok(notification) = self.notifications.try_recv() {
            print_line(&notification.to_string());
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_line(line: &str) {
    println!("{line}");
}

/// Render the cart as display lines.
fn render_table(cart: &Cart) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines: Vec<String> = cart
        .iter()
        .map(|line| {
            let price = format!("{:.2}", line.price);
            let total = format!("{:.2}", line.line_total());
            format!(
                "{:>5}  {:<40} {:>3} x {price:>9} = {total:>10}",
                line.id.as_i32(),
                line.title,
                line.amount,
            )
        })
        .collect();

    lines.push(format!(
        "{} item(s), subtotal {:.2}",
        cart.total_quantity(),
        cart.subtotal()
    ));
    lines
}
