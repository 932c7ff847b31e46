//! Subscription filter derived from a relay connection URL.
//!
//! The only criterion today is an event-type filter string taken from the
//! `filter.events` query parameter. Its value is upstream-defined and is
//! passed through untouched; the relay never filters events itself.

use axum::extract::Query;
use axum::http::Uri;
use serde::Deserialize;
use serde_json::{Value, json};

/// Matching criteria for one client session's upstream subscription.
///
/// Immutable for the lifetime of the session that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubscriptionFilter {
    #[serde(rename = "filter.events", default)]
    events: Option<String>,
}

impl SubscriptionFilter {
    /// Creates a filter for the given event-type expression.
    ///
    /// An empty string means "no filter".
    #[must_use]
    pub fn new(events: Option<String>) -> Self {
        Self {
            events: events.filter(|e| !e.is_empty()),
        }
    }

    /// Builds the filter from a connection URI's query string.
    ///
    /// Unknown parameters are ignored. A query string that cannot be
    /// decoded yields an unfiltered subscription.
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        match Query::<Self>::try_from_uri(uri) {
            Ok(Query(filter)) => Self::new(filter.events),
            Err(err) => {
                tracing::debug!(%uri, %err, "undecodable relay query; subscribing unfiltered");
                Self::default()
            }
        }
    }

    /// Returns the event-type filter, if one was supplied.
    #[must_use]
    pub fn events(&self) -> Option<&str> {
        self.events.as_deref()
    }

    /// Returns `true` if no criteria are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_none()
    }

    /// Renders the subscription options sent upstream.
    ///
    /// `{}` when unfiltered, otherwise `{"filter":{"events":"..."}}`.
    #[must_use]
    pub fn subscription_options(&self) -> Value {
        match &self.events {
            Some(events) => json!({ "filter": { "events": events } }),
            None => json!({}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap_or_default()
    }

    #[test]
    fn no_query_is_unfiltered() {
        let filter = SubscriptionFilter::from_uri(&uri("/api/simple/ws"));
        assert!(filter.is_empty());
        assert_eq!(filter.subscription_options(), json!({}));
    }

    #[test]
    fn events_parameter_is_passed_through() {
        let filter =
            SubscriptionFilter::from_uri(&uri("/api/simple/ws?filter.events=message_confirmed"));
        assert_eq!(filter.events(), Some("message_confirmed"));
        assert_eq!(
            filter.subscription_options(),
            json!({ "filter": { "events": "message_confirmed" } })
        );
    }

    #[test]
    fn regex_style_filters_are_not_rewritten() {
        let filter = SubscriptionFilter::from_uri(&uri(
            "/api/ws?filter.events=message_.%2A%7Ctoken_pool_confirmed",
        ));
        assert_eq!(filter.events(), Some("message_.*|token_pool_confirmed"));
    }

    #[test]
    fn empty_value_is_unfiltered() {
        let filter = SubscriptionFilter::from_uri(&uri("/api/ws?filter.events="));
        assert!(filter.is_empty());
    }

    #[test]
    fn unrelated_parameters_are_ignored() {
        let filter = SubscriptionFilter::from_uri(&uri("/api/ws?foo=bar&filter.events=x"));
        assert_eq!(filter.events(), Some("x"));
    }
}
