use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::utils::AsEpoch;

/// Lenient epoch deserializer: numbers and numeric strings become seconds, anything else `None`
///
/// Export files mix `1700000000.123`, `"1700000000"` and `null` for the same field, so a bad
/// value is treated as missing rather than failing the whole record.
pub fn deserialize_epoch<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(AsEpoch::as_epoch))
}

/// Lenient text deserializer for free-form columns
///
/// Strings pass through, `null` becomes `None`, and any other JSON (numbers, nested objects)
/// is kept as its compact JSON text.
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
