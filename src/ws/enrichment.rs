//! Batch enrichment for batch-pin transaction events.
//!
//! A `transaction_submitted` event whose transaction is a `batch_pin`
//! gets the batch it anchors attached under `batch`. Every other event
//! passes through untouched. The lookup fails open: on error or an empty
//! result the event is forwarded without the field.

use serde_json::Value;

use crate::domain::upstream_event::{self, BATCH_FIELD};
use crate::service::Upstream;

/// Returns the event, enriched with its batch when applicable.
pub async fn enrich_event(mut event: Value, upstream: &dyn Upstream) -> Value {
    if !upstream_event::is_batch_pin_submission(&event) {
        return event;
    }
    let Some(tx_id) = upstream_event::transaction_id(&event).map(str::to_string) else {
        tracing::debug!("batch pin event without transaction id; forwarding as-is");
        return event;
    };

    match upstream.batches_for_transaction(&tx_id).await {
        Ok(batches) => {
            if let Some(batch) = batches.into_iter().next()
                && let Some(fields) = event.as_object_mut()
            {
                fields.insert(BATCH_FIELD.to_string(), batch);
            } else {
                tracing::debug!(tx = %tx_id, "no batch found for transaction");
            }
        }
        Err(err) => {
            tracing::warn!(tx = %tx_id, %err, "batch lookup failed; forwarding without batch");
        }
    }
    event
}
