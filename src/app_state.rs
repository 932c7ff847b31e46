//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{FireFlyClient, FireFlyClients};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Per-namespace upstream clients.
    pub clients: Arc<FireFlyClients>,
}

impl AppState {
    /// Creates state around an existing client registry.
    #[must_use]
    pub fn new(clients: Arc<FireFlyClients>) -> Self {
        Self { clients }
    }

    /// Client for the `?ns=` namespace, or the default one.
    pub async fn client(&self, namespace: Option<&str>) -> Arc<FireFlyClient> {
        self.clients.resolve(namespace).await
    }
}
