//! Opaque identifier for a relay client session.
//!
//! [`SessionId`] is a newtype wrapper around [`uuid::Uuid`] (v4). It only
//! appears in logs and is never sent to the client or the upstream.

use std::fmt;

use serde::Serialize;

/// Unique identifier for one browser WebSocket session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    /// Creates a new random `SessionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let id = SessionId::new();
        let s = id.to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(s.parse::<uuid::Uuid>().ok(), Some(*id.as_uuid()));
    }
}
