use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    TripAssigned,
    BookingConfirmed,
    DeliveryConfirmed,
    RetryWaiting,
}

/// Delivery of the actual message (push, email, whatever the surrounding
/// system uses) is out of scope here; the engine only enqueues. Enqueued
/// notifications are only flushed to the notifier after the owning
/// transaction commits (see `store::TransactionHandle`), never on rollback.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn enqueue(&self, user_ref: &str, kind: NotificationKind, payload: Value);
}

/// Logs notifications instead of delivering them; used by the `dispatcher`
/// binary until a real notification backend is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn enqueue(&self, user_ref: &str, kind: NotificationKind, payload: Value) {
        log::info!("notify {user_ref} {kind:?}: {payload}");
    }
}
