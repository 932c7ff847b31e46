//! The relay's view of the upstream platform.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::domain::SubscriptionFilter;
use crate::error::GatewayError;

/// Operations the relay needs from the upstream platform.
///
/// Implemented by [`super::FireFlyClient`]; tests substitute an in-process
/// mock.
#[async_trait]
pub trait Upstream: Send + Sync + fmt::Debug {
    /// Opens an event subscription scoped to `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SubscriptionFailed`] if the subscription
    /// cannot be established.
    async fn listen(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<UpstreamSubscription, GatewayError>;

    /// Returns the batches anchored by the given transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the lookup fails.
    async fn batches_for_transaction(&self, tx_id: &str) -> Result<Vec<Value>, GatewayError>;
}

/// Handle to one open upstream event subscription.
///
/// Owned exclusively by the session that opened it. Events arrive through
/// [`UpstreamSubscription::next_event`] in upstream delivery order; the
/// subscription is torn down by [`UpstreamSubscription::close`] or on drop.
#[derive(Debug)]
pub struct UpstreamSubscription {
    events: mpsc::Receiver<Value>,
    close_tx: Option<oneshot::Sender<()>>,
}

impl UpstreamSubscription {
    /// Wraps an event channel and its close signal.
    #[must_use]
    pub fn new(events: mpsc::Receiver<Value>, close_tx: oneshot::Sender<()>) -> Self {
        Self {
            events,
            close_tx: Some(close_tx),
        }
    }

    /// Creates a subscription together with the producer-side halves:
    /// the event sender and the receiver that resolves on close.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Sender<Value>, oneshot::Receiver<()>) {
        let (event_tx, event_rx) = mpsc::channel(capacity.max(1));
        let (close_tx, close_rx) = oneshot::channel();
        (Self::new(event_rx, close_tx), event_tx, close_rx)
    }

    /// Waits for the next upstream event.
    ///
    /// Returns `None` once the upstream side has ended or the
    /// subscription has been closed.
    pub async fn next_event(&mut self) -> Option<Value> {
        self.events.recv().await
    }

    /// Requests closure of the upstream subscription.
    ///
    /// Only the first call signals the upstream; later calls are no-ops
    /// and return `false`. Events still in flight are dropped.
    pub fn close(&mut self) -> bool {
        let Some(close_tx) = self.close_tx.take() else {
            return false;
        };
        self.events.close();
        // The reader may already be gone if the upstream hung up first.
        let _ = close_tx.send(());
        true
    }

    /// Returns `true` until [`UpstreamSubscription::close`] has run.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.close_tx.is_some()
    }
}

impl Drop for UpstreamSubscription {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (mut sub, tx, _close_rx) = UpstreamSubscription::channel(4);
        for n in 0..3 {
            let _ = tx.send(json!({ "n": n })).await;
        }
        for n in 0..3 {
            assert_eq!(sub.next_event().await, Some(json!({ "n": n })));
        }
    }

    #[tokio::test]
    async fn close_signals_exactly_once() {
        let (mut sub, _tx, close_rx) = UpstreamSubscription::channel(4);
        assert!(sub.is_open());
        assert!(sub.close());
        assert!(!sub.close());
        assert!(!sub.is_open());
        assert!(close_rx.await.is_ok());
    }

    #[tokio::test]
    async fn events_after_close_are_rejected() {
        let (mut sub, tx, _close_rx) = UpstreamSubscription::channel(4);
        sub.close();
        assert!(tx.send(json!({ "type": "late" })).await.is_err());
        assert_eq!(sub.next_event().await, None);
    }

    #[tokio::test]
    async fn drop_closes_open_subscription() {
        let (sub, _tx, close_rx) = UpstreamSubscription::channel(4);
        drop(sub);
        assert!(close_rx.await.is_ok());
    }

    #[tokio::test]
    async fn upstream_hangup_ends_stream() {
        let (mut sub, tx, _close_rx) = UpstreamSubscription::channel(4);
        drop(tx);
        assert_eq!(sub.next_event().await, None);
    }
}
