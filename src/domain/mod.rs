//! Domain layer: session identity, subscription filters, and the small
//! amount of upstream event structure the relay inspects.
//!
//! Upstream events are opaque JSON records; only the fields needed for
//! enrichment are interpreted here.

pub mod session_id;
pub mod subscription_filter;
pub mod upstream_event;

pub use session_id::SessionId;
pub use subscription_filter::SubscriptionFilter;
