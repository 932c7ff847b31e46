//! # sandbox-gateway
//!
//! REST and WebSocket gateway behind a browser sandbox for a
//! distributed-ledger messaging platform.
//!
//! The REST side turns sandbox actions into upstream calls and answers
//! `202 Accepted` with the id of the asynchronous operation. The
//! WebSocket side relays the upstream event stream to each browser,
//! attaching the pinned batch to transaction-submitted events so the UI
//! can show what was written on chain.
//!
//! ## Architecture
//!
//! ```text
//! Browser (HTTP, WebSocket)
//!     │
//!     ├── Upgrade Router (ws/upgrade) ──► SocketRegistry (ws/registry)
//!     │                                        │
//!     │                                   Session Manager (ws/session)
//!     │                                        │
//!     │                                   Event Enrichment (ws/enrichment)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── FireFlyClients (service/) ── one client per namespace
//!     │
//!     └── Upstream platform (REST /api/v1, events /ws)
//! ```

pub mod api;
pub mod app;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
