//! Accessors for the few upstream event fields the relay interprets.
//!
//! Upstream events stay as [`serde_json::Value`] so they are forwarded
//! field-for-field; these helpers only read from them.

use serde_json::Value;

/// Event type emitted when a transaction has been submitted.
pub const TRANSACTION_SUBMITTED: &str = "transaction_submitted";

/// Transaction type that anchors a batch of messages.
pub const BATCH_PIN: &str = "batch_pin";

/// Field under which enrichment attaches the batch record.
pub const BATCH_FIELD: &str = "batch";

/// Returns the event's `type` field.
#[must_use]
pub fn event_type(event: &Value) -> Option<&str> {
    event.get("type").and_then(Value::as_str)
}

/// Returns the type of the nested `transaction` record.
#[must_use]
pub fn transaction_type(event: &Value) -> Option<&str> {
    event
        .get("transaction")
        .and_then(|tx| tx.get("type"))
        .and_then(Value::as_str)
}

/// Returns the correlating transaction identifier.
///
/// The upstream sends `tx` as a bare id; an object with an `id` field is
/// accepted as well.
#[must_use]
pub fn transaction_id(event: &Value) -> Option<&str> {
    match event.get("tx")? {
        Value::String(id) => Some(id.as_str()),
        Value::Object(obj) => obj.get("id").and_then(Value::as_str),
        _ => None,
    }
}

/// Returns `true` for a transaction-submitted event whose transaction is a
/// batch pin.
#[must_use]
pub fn is_batch_pin_submission(event: &Value) -> bool {
    event_type(event) == Some(TRANSACTION_SUBMITTED) && transaction_type(event) == Some(BATCH_PIN)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn batch_pin_submission_is_detected() {
        let event = json!({
            "type": "transaction_submitted",
            "tx": "tx1",
            "transaction": { "type": "batch_pin" }
        });
        assert!(is_batch_pin_submission(&event));
        assert_eq!(transaction_id(&event), Some("tx1"));
    }

    #[test]
    fn other_transaction_types_are_not_batch_pins() {
        let event = json!({
            "type": "transaction_submitted",
            "tx": "tx2",
            "transaction": { "type": "token_transfer" }
        });
        assert!(!is_batch_pin_submission(&event));
    }

    #[test]
    fn other_event_types_are_not_batch_pins() {
        let event = json!({ "type": "message_confirmed", "transaction": { "type": "batch_pin" } });
        assert!(!is_batch_pin_submission(&event));
        assert_eq!(event_type(&event), Some("message_confirmed"));
    }

    #[test]
    fn transaction_id_accepts_object_form() {
        let event = json!({ "tx": { "id": "tx3" } });
        assert_eq!(transaction_id(&event), Some("tx3"));
        assert_eq!(transaction_id(&json!({ "tx": 7 })), None);
        assert_eq!(transaction_id(&json!({})), None);
    }
}
