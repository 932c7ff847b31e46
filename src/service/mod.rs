//! Service layer: the upstream platform client.
//!
//! Gateway handlers call [`FireFlyClient`] for one-shot REST operations.
//! The relay only sees the [`Upstream`] trait, which opens per-session
//! event subscriptions and performs the batch lookup used for enrichment.

pub mod client_registry;
pub mod event_stream;
pub mod firefly_client;
pub mod upstream;

pub use client_registry::FireFlyClients;
pub use firefly_client::{BlobUpload, FireFlyClient};
pub use upstream::{Upstream, UpstreamSubscription};
