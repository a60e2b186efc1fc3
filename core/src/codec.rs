//! Generic codec between save aggregates and record bytes.
//!
//! Works for any serde type without per-type boilerplate. The engine only
//! ever feeds it a SaveDirectory, but tests and tooling can round-trip
//! their own aggregates through the same two functions.

use crate::error::{SaveError, SaveResult};
use serde::{de::DeserializeOwned, Serialize};

/// Encode a save aggregate to record bytes.
pub fn encode<T: Serialize>(value: &T) -> SaveResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(SaveError::Encode)
}

/// Decode record bytes back into a save aggregate.
///
/// Callers must treat a `Decode` failure like a missing record and fall
/// back to defaults; corrupt bytes never end a session.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> SaveResult<T> {
    serde_json::from_slice(bytes).map_err(SaveError::Decode)
}
