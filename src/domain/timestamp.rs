use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const FORMAT_FRACTIONAL: &str = "%Y-%m-%d %H:%M:%S%.f";
const FORMAT_SECONDS: &str = "%Y-%m-%d %H:%M:%S";

/// Modification timestamp carried by every mutable entity.
///
/// Terminals emit one of two textual forms (with or without fractional
/// seconds). Both are parsed once into a `NaiveDateTime` so ordering is
/// chronological rather than lexical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModifiedAt(NaiveDateTime);

impl ModifiedAt {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if let Ok(dt) = NaiveDateTime::parse_from_str(text, FORMAT_FRACTIONAL) {
            return Some(Self(dt));
        }

        if let Ok(dt) = NaiveDateTime::parse_from_str(text, FORMAT_SECONDS) {
            return Some(Self(dt));
        }

        None
    }
}

impl fmt::Display for ModifiedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

impl Serialize for ModifiedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Returns true when `incoming` should replace `stored`.
///
/// Only a strictly later stamp wins. A missing stamp sorts before every
/// present one, so an unstamped record never overwrites a stamped one.
pub fn is_newer(incoming: Option<ModifiedAt>, stored: Option<ModifiedAt>) -> bool {
    incoming > stored
}

/// Serde helper for optional stamp fields. `null`, non-string values and
/// unparseable text are all treated as absent rather than failing the
/// whole document.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<ModifiedAt>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(ModifiedAt::parse))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_both_formats() {
        let with_fraction = ModifiedAt::parse("2024-05-01 10:00:00.250").unwrap();
        let without_fraction = ModifiedAt::parse("2024-05-01 10:00:00").unwrap();

        assert!(with_fraction > without_fraction);
        assert_eq!(without_fraction.to_string(), "2024-05-01 10:00:00.000");
    }

    #[test]
    fn test_non_string_stamp_is_absent() {
        #[derive(serde::Deserialize)]
        struct Stamped {
            #[serde(default, deserialize_with = "deserialize_optional")]
            modified: Option<ModifiedAt>,
        }

        let number: Stamped = serde_json::from_str(r#"{"modified": 1714557600}"#).unwrap();
        let null: Stamped = serde_json::from_str(r#"{"modified": null}"#).unwrap();

        assert!(number.modified.is_none());
        assert!(null.modified.is_none());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(ModifiedAt::parse("yesterday").is_none());
        assert!(ModifiedAt::parse("").is_none());
    }

    #[test]
    fn test_ordering_is_chronological_not_lexical() {
        let early = ModifiedAt::parse("2024-05-01 09:59:59.999").unwrap();
        let late = ModifiedAt::parse("2024-05-01 10:00:00").unwrap();
        // "10:00:00" is shorter than "09:59:59.999" but still later.
        assert!(is_newer(Some(late), Some(early)));
        assert!(!is_newer(Some(early), Some(late)));
    }

    #[test]
    fn test_equal_and_missing_stamps_are_not_newer() {
        let stamp = ModifiedAt::parse("2024-05-01 10:00:00").unwrap();

        assert!(!is_newer(Some(stamp), Some(stamp)));
        assert!(!is_newer(None, Some(stamp)));
        assert!(!is_newer(None, None));
        assert!(is_newer(Some(stamp), None));
    }
}
