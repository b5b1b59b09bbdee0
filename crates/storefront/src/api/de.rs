//! Lenient deserializers for backend JSON.
//!
//! The backend is loosely typed: counts sometimes arrive as strings, ids as
//! numbers, and populated arrays may contain `null` where a referenced
//! document was deleted.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
    Null(()),
}

/// Accept `3`, `3.0`, `"3"` or `null` as a `u32`. Negative values clamp to 0.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => n,
        #[allow(clippy::cast_possible_truncation)]
        NumberOrString::Float(f) => f.trunc() as i64,
        #[allow(clippy::cast_possible_truncation)]
        NumberOrString::Text(s) => s.trim().parse::<f64>().map_or(0, |f| f.trunc() as i64),
        NumberOrString::Null(()) => 0,
    };
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

/// Accept a number, numeric string or `null` as an `f64`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberOrString::deserialize(deserializer)? {
        #[allow(clippy::cast_precision_loss)]
        NumberOrString::Int(n) => n as f64,
        NumberOrString::Float(f) => f,
        NumberOrString::Text(s) => s.trim().parse().unwrap_or_default(),
        NumberOrString::Null(()) => 0.0,
    })
}

/// Accept a string or a number as a `String`. `null` becomes empty.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => n.to_string(),
        NumberOrString::Float(f) => f.to_string(),
        NumberOrString::Text(s) => s,
        NumberOrString::Null(()) => String::new(),
    })
}

/// Treat `null` like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a list, dropping `null` entries and entries that do not parse.
pub fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter(|v| !v.is_null())
        .filter_map(|v| match serde_json::from_value(v) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed list entry");
                None
            }
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Counts {
        #[serde(deserialize_with = "lenient_u32")]
        count: u32,
        #[serde(default, deserialize_with = "lenient_f64")]
        rating: f64,
        #[serde(deserialize_with = "string_or_number")]
        id: String,
    }

    #[derive(Deserialize)]
    struct Items {
        #[serde(default, deserialize_with = "skip_invalid")]
        items: Vec<Counts>,
    }

    #[test]
    fn test_lenient_numbers() {
        let c: Counts = serde_json::from_str(r#"{"count":"7","rating":"4.5","id":12}"#).unwrap();
        assert_eq!(c.count, 7);
        assert!((c.rating - 4.5).abs() < f64::EPSILON);
        assert_eq!(c.id, "12");

        let c: Counts = serde_json::from_str(r#"{"count":-2,"id":"x"}"#).unwrap();
        assert_eq!(c.count, 0);
        assert!(c.rating.abs() < f64::EPSILON);

        let c: Counts = serde_json::from_str(r#"{"count":null,"id":null}"#).unwrap();
        assert_eq!(c.count, 0);
        assert_eq!(c.id, "");
    }

    #[test]
    fn test_skip_invalid_drops_nulls() {
        let items: Items =
            serde_json::from_str(r#"{"items":[null,{"count":1,"id":"a"},{"oops":true}]}"#)
                .unwrap();
        assert_eq!(items.items.len(), 1);

        let items: Items = serde_json::from_str(r#"{"items":null}"#).unwrap();
        assert!(items.items.is_empty());
    }
}
