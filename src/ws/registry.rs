//! Per-path socket registry.
//!
//! [`SocketRegistry`] maps a URL path to a [`SocketServer`], the sending
//! half of a connection channel. Registering a path hands the caller the
//! matching [`ConnectionListener`], from which it accepts already-upgraded
//! sockets. The registry is filled once at startup and then shared
//! read-only behind an `Arc`; there is no unregistration.

use std::collections::HashMap;

use axum::extract::ws::WebSocket;
use axum::http::Uri;
use tokio::sync::mpsc;

use crate::error::GatewayError;

/// An accepted WebSocket together with the URI it was requested on.
///
/// The URI keeps its query string so sessions can derive their filter.
#[derive(Debug)]
pub struct IncomingConnection {
    /// The upgraded client socket.
    pub socket: WebSocket,
    /// Original request URI, including the query string.
    pub uri: Uri,
}

/// Entry point of one registered WebSocket endpoint.
///
/// Never listens on a port itself; it only receives sockets the upgrade
/// router has already upgraded.
#[derive(Debug, Clone)]
pub struct SocketServer {
    path: String,
    tx: mpsc::UnboundedSender<IncomingConnection>,
}

impl SocketServer {
    /// Returns the path this server is registered under.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Hands a new connection to the endpoint's listener.
    ///
    /// Returns `false` if the listener is gone, in which case the socket
    /// is dropped.
    pub fn emit(&self, connection: IncomingConnection) -> bool {
        self.tx.send(connection).is_ok()
    }
}

/// Receiving side of a registered endpoint.
#[derive(Debug)]
pub struct ConnectionListener {
    path: String,
    rx: mpsc::UnboundedReceiver<IncomingConnection>,
}

impl ConnectionListener {
    /// Returns the path this listener serves.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Waits for the next upgraded connection.
    ///
    /// Returns `None` once the registry holding the server has been dropped.
    pub async fn accept(&mut self) -> Option<IncomingConnection> {
        self.rx.recv().await
    }
}

/// Process-wide mapping from URL path to [`SocketServer`].
#[derive(Debug, Default)]
pub struct SocketRegistry {
    servers: HashMap<String, SocketServer>,
}

impl SocketRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a WebSocket endpoint at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicateSocketPath`] if `path` is already
    /// registered, or [`GatewayError::InvalidConfig`] if it does not start
    /// with `/`.
    pub fn add_websocket(&mut self, path: &str) -> Result<ConnectionListener, GatewayError> {
        if !path.starts_with('/') {
            return Err(GatewayError::InvalidConfig(format!(
                "websocket path must start with '/': {path}"
            )));
        }
        if self.servers.contains_key(path) {
            return Err(GatewayError::DuplicateSocketPath(path.to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.servers.insert(
            path.to_string(),
            SocketServer {
                path: path.to_string(),
                tx,
            },
        );
        tracing::debug!(path, "websocket endpoint registered");

        Ok(ConnectionListener {
            path: path.to_string(),
            rx,
        })
    }

    /// Returns the server registered for exactly `path`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&SocketServer> {
        self.servers.get(path)
    }

    /// Returns the registered paths in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    /// Returns the number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns `true` if no endpoint is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut registry = SocketRegistry::new();
        let Ok(listener) = registry.add_websocket("/api/ws") else {
            panic!("registration must succeed");
        };
        assert_eq!(listener.path(), "/api/ws");

        let Some(server) = registry.lookup("/api/ws") else {
            panic!("registered path must resolve");
        };
        assert_eq!(server.path(), "/api/ws");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_is_exact() {
        let mut registry = SocketRegistry::new();
        let _listener = registry.add_websocket("/api/ws");
        assert!(registry.lookup("/api/ws/").is_none());
        assert!(registry.lookup("/api").is_none());
        assert!(registry.lookup("/api/simple/ws").is_none());
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut registry = SocketRegistry::new();
        let _first = registry.add_websocket("/api/simple/ws");
        let second = registry.add_websocket("/api/simple/ws");
        assert!(matches!(second, Err(GatewayError::DuplicateSocketPath(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn relative_path_is_rejected() {
        let mut registry = SocketRegistry::new();
        assert!(matches!(
            registry.add_websocket("api/ws"),
            Err(GatewayError::InvalidConfig(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn paths_lists_every_endpoint() {
        let mut registry = SocketRegistry::new();
        let _a = registry.add_websocket("/api/ws");
        let _b = registry.add_websocket("/api/simple/ws");
        let mut paths: Vec<&str> = registry.paths().collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["/api/simple/ws", "/api/ws"]);
    }

    #[tokio::test]
    async fn listener_ends_when_registry_dropped() {
        let mut registry = SocketRegistry::new();
        let Ok(mut listener) = registry.add_websocket("/api/ws") else {
            panic!("registration must succeed");
        };
        drop(registry);
        assert!(listener.accept().await.is_none());
    }
}
