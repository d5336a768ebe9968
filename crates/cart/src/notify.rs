//! User-facing notifications.
//!
//! The cart store reports every outcome a shopper should see (added, removed,
//! out of stock, failures) through a [`NotificationSink`]. Sinks are
//! fire-and-forget: nothing they return is consumed.

use std::fmt;

use tokio::sync::mpsc;

/// Messages shown to the shopper.
pub mod messages {
    pub const PRODUCT_ADDED: &str = "Product added to cart";
    pub const OUT_OF_STOCK: &str = "Requested quantity out of stock";
    pub const ADD_FAILED: &str = "Error adding product";
    pub const REMOVE_FAILED: &str = "Error removing product";
    pub const UPDATE_FAILED: &str = "Error updating product quantity";

    /// Message for a removed line, falling back to a generic name when the
    /// product has no title.
    #[must_use]
    pub fn product_removed(title: &str) -> String {
        let name = if title.is_empty() {
            "Product"
        } else {
            title
        };
        format!("{name} removed from cart")
    }
}

/// Notification styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
}

/// A transient message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Success => write!(f, "✔ {}", self.message),
            Severity::Error => write!(f, "✘ {}", self.message),
        }
    }
}

/// Destination for shopper notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that emits notifications as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => tracing::info!(text = %notification.message, "Shopper notified"),
            Severity::Error => tracing::warn!(text = %notification.message, "Shopper notified"),
        }
    }
}

/// Sink that forwards notifications into a channel for a UI to drain.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Receiver gone means nobody is displaying notifications anymore
        if self.tx.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}

impl<N: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Fan out to both sinks, in order.
impl<A: NotificationSink, B: NotificationSink> NotificationSink for (A, B) {
    fn notify(&self, notification: Notification) {
        self.0.notify(notification.clone());
        self.1.notify(notification);
    }
}
