// Lenient field deserializers
//
// Optional attributes of an event element never abort loading: a value of
// the wrong shape is replaced by the field's unset sentinel.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `T`, falling back to `T::default()` on a malformed value
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    or_else(deserializer, T::default())
}

/// Deserialize `T`, falling back to `fallback` on a malformed value
pub(crate) fn or_else<'de, D, T>(deserializer: D, fallback: T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed optional attribute, using default");
            Ok(fallback)
        }
    }
}
