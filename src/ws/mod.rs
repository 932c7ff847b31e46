//! WebSocket layer: the real-time event relay.
//!
//! Browsers connect to one of the relay paths. The [`upgrade`] middleware
//! resolves the path in the [`SocketRegistry`] and completes the
//! handshake; the endpoint's listener then runs a [`session`] that opens
//! an upstream subscription for that client and forwards its events,
//! enriched by [`enrichment`], until the browser disconnects.

pub mod enrichment;
pub mod registry;
pub mod session;
pub mod upgrade;

use std::sync::Arc;

pub use registry::{ConnectionListener, IncomingConnection, SocketRegistry, SocketServer};

use crate::error::GatewayError;
use crate::service::Upstream;

/// Relay endpoint used by the sandbox's simple event feed.
pub const SIMPLE_RELAY_PATH: &str = "/api/simple/ws";

/// General relay endpoint.
pub const RELAY_PATH: &str = "/api/ws";

/// Registers every relay endpoint and starts serving its sessions.
///
/// Both paths run the same enriching relay against `upstream`.
///
/// # Errors
///
/// Returns [`GatewayError::DuplicateSocketPath`] if a relay path is
/// already registered.
pub fn register_relays(
    sockets: &mut SocketRegistry,
    upstream: &Arc<dyn Upstream>,
) -> Result<(), GatewayError> {
    for path in [SIMPLE_RELAY_PATH, RELAY_PATH] {
        let listener = sockets.add_websocket(path)?;
        session::serve_sessions(listener, Arc::clone(upstream));
    }
    Ok(())
}
