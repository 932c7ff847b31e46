//! Per-namespace upstream clients.
//!
//! [`FireFlyClients`] lazily creates one [`FireFlyClient`] per namespace
//! and memoises it for the lifetime of the process. All clients share a
//! single connection-pooled HTTP client. Entries are never evicted.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Url;
use tokio::sync::RwLock;

use super::FireFlyClient;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Process-wide registry of upstream clients keyed by namespace.
#[derive(Debug)]
pub struct FireFlyClients {
    http: reqwest::Client,
    endpoint: Url,
    default_namespace: String,
    event_buffer_capacity: usize,
    clients: RwLock<HashMap<String, Arc<FireFlyClient>>>,
}

impl FireFlyClients {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        default_namespace: impl Into<String>,
        event_buffer_capacity: usize,
    ) -> Self {
        Self {
            http,
            endpoint,
            default_namespace: default_namespace.into(),
            event_buffer_capacity,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry from the gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the HTTP client cannot
    /// be built.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = FireFlyClient::http_client(config.upstream_timeout)?;
        Ok(Self::new(
            http,
            config.upstream_endpoint.clone(),
            config.default_namespace.clone(),
            config.event_buffer_capacity,
        ))
    }

    /// Returns the namespace used when a request does not name one.
    #[must_use]
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// Returns the client for `namespace`, creating it on first use.
    pub async fn get(&self, namespace: &str) -> Arc<FireFlyClient> {
        if let Some(client) = self.clients.read().await.get(namespace) {
            return Arc::clone(client);
        }

        let mut map = self.clients.write().await;
        let client = map.entry(namespace.to_string()).or_insert_with(|| {
            tracing::debug!(namespace, "creating upstream client");
            Arc::new(FireFlyClient::new(
                self.http.clone(),
                self.endpoint.clone(),
                namespace,
                self.event_buffer_capacity,
            ))
        });
        Arc::clone(client)
    }

    /// Returns the client for `namespace`, or the default namespace when
    /// `None` or blank.
    pub async fn resolve(&self, namespace: Option<&str>) -> Arc<FireFlyClient> {
        match namespace.map(str::trim).filter(|ns| !ns.is_empty()) {
            Some(ns) => self.get(ns).await,
            None => self.default_client().await,
        }
    }

    /// Returns the client for the default namespace.
    pub async fn default_client(&self) -> Arc<FireFlyClient> {
        self.get(&self.default_namespace).await
    }

    /// Returns the number of namespaces with a live client.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Returns `true` if no client has been created yet.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn registry() -> FireFlyClients {
        let Ok(url) = Url::parse("http://localhost:5000") else {
            panic!("valid url");
        };
        FireFlyClients::new(reqwest::Client::new(), url, "default", 8)
    }

    #[tokio::test]
    async fn clients_are_created_lazily() {
        let clients = registry();
        assert!(clients.is_empty().await);
        let _ = clients.default_client().await;
        assert_eq!(clients.len().await, 1);
    }

    #[tokio::test]
    async fn same_namespace_returns_same_client() {
        let clients = registry();
        let a = clients.get("ns1").await;
        let b = clients.get("ns1").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(clients.len().await, 1);
    }

    #[tokio::test]
    async fn namespaces_get_distinct_clients() {
        let clients = registry();
        let a = clients.get("ns1").await;
        let b = clients.get("ns2").await;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.namespace(), "ns1");
        assert_eq!(b.namespace(), "ns2");
    }

    #[tokio::test]
    async fn resolve_falls_back_to_default() {
        let clients = registry();
        assert_eq!(clients.resolve(None).await.namespace(), "default");
        assert_eq!(clients.resolve(Some(" ")).await.namespace(), "default");
        assert_eq!(clients.resolve(Some("other")).await.namespace(), "other");
    }
}
