//! Forgiving field decoding for terminal documents.
//!
//! Terminals send `null` for unset fields and mix integer and float
//! encodings. A field that cannot be read as its type takes its default
//! instead of failing the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A value that can be recovered from arbitrary JSON.
pub trait Lenient: Sized + Default {
    fn from_value(value: Value) -> Option<Self>;
}

/// `deserialize_with` entry point: unreadable values become the default.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Lenient,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::from_value(value).unwrap_or_default())
}

/// For nested record lists: `null` is read as empty.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

impl Lenient for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl Lenient for bool {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Lenient for f64 {
    fn from_value(value: Value) -> Option<Self> {
        number(&value)
    }
}

// Float-to-int `as` casts truncate and saturate, so 87.5 reads as 87 and
// negative counts as 0.
macro_rules! lenient_integer {
    ($($t:ty),*) => {
        $(impl Lenient for $t {
            fn from_value(value: Value) -> Option<Self> {
                number(&value).map(|n| n as $t)
            }
        })*
    };
}

lenient_integer!(u16, u32, i64);

impl<T: Lenient> Lenient for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => Some(T::from_value(other)),
        }
    }
}

impl<T: Lenient> Lenient for Vec<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .map(|item| T::from_value(item).unwrap_or_default())
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl<T: Lenient> Lenient for BTreeMap<String, T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(
                map.into_iter()
                    .map(|(key, item)| (key, T::from_value(item).unwrap_or_default()))
                    .collect(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_wrong_types_fall_back_to_default() {
        assert_eq!(String::from_value(Value::Null), None);
        assert_eq!(u32::from_value(json!("not a number")), None);
        assert_eq!(bool::from_value(json!([1])), None);
    }

    #[test]
    fn test_numbers_cross_integer_and_float() {
        assert_eq!(i64::from_value(json!(87.5)), Some(87));
        assert_eq!(u32::from_value(json!(-3)), Some(0));
        assert_eq!(f64::from_value(json!(12)), Some(12.0));
        assert_eq!(u16::from_value(json!("59613")), Some(59613));
    }

    #[test]
    fn test_bool_from_flags() {
        assert_eq!(bool::from_value(json!(1)), Some(true));
        assert_eq!(bool::from_value(json!("0")), Some(false));
    }

    #[test]
    fn test_containers_keep_readable_items() {
        let times = Vec::<f64>::from_value(json!([1.5, null, "2"])).unwrap();
        let hits = BTreeMap::<String, u32>::from_value(json!({"A": 2, "B": null})).unwrap();

        assert_eq!(times, vec![1.5, 0.0, 2.0]);
        assert_eq!(hits.get("A"), Some(&2));
        assert_eq!(hits.get("B"), Some(&0));
        assert_eq!(Option::<i64>::from_value(Value::Null), Some(None));
    }
}
