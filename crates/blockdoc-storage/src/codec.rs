//! JSON encoding of recovery records.
//!
//! Decoding is strict about structure: a record must be a JSON object with
//! both `blocks` and `blockIds`, and the decoded document must satisfy the
//! block map / order invariant. Anything else is [`StorageError::Malformed`].

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use blockdoc_core::DocumentState;

use crate::error::StorageError;
use crate::types::RecoveryRecord;

/// Serializes `state` as a recovery record stamped with `saved_at`.
pub fn encode_record<C: Clone + Serialize>(
    state: &DocumentState<C>,
    saved_at: DateTime<Utc>,
) -> Result<String, StorageError> {
    let record = RecoveryRecord::from_state(state, saved_at);
    Ok(serde_json::to_string(&record)?)
}

/// Parses and validates a stored recovery record.
pub fn decode_record<C: Clone + DeserializeOwned>(
    raw: &str,
) -> Result<RecoveryRecord<C>, StorageError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let object = value.as_object().ok_or_else(|| StorageError::Malformed {
        reason: "record is not a JSON object".to_string(),
    })?;
    for field in ["blocks", "blockIds"] {
        if object.get(field).map_or(true, |v| v.is_null()) {
            return Err(StorageError::Malformed {
                reason: format!("missing field '{}'", field),
            });
        }
    }

    let record: RecoveryRecord<C> = serde_json::from_value(value)?;
    let state = record.clone().into_state();
    state.validate().map_err(|e| StorageError::Malformed {
        reason: e.to_string(),
    })?;

    Ok(record)
}
