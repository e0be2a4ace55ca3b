//! Lenient field parsing.
//!
//! Stored documents were written by several generations of clients, so numbers
//! sometimes arrive as strings and list fields sometimes arrive as one
//! delimited string. These helpers accept both shapes.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Deserialize an optional number that may be encoded as a string.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, got {:?}", s)))
        }
    }
}

/// Deserialize an optional integer that may be encoded as a string.
///
/// Fractions are truncated, so `"4.5"` becomes `4`.
pub fn opt_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_number(deserializer)?.map(|n| n.trunc() as i64))
}

/// A list of strings stored either as an array or as one string joined by `SEP`.
///
/// Always serializes as an array. Blank entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StringList<const SEP: char>(pub Vec<String>);

/// Features, inclusions and exclusions: comma separated.
pub type CommaList = StringList<','>;
/// Itinerary days and terms: one entry per line.
pub type LineList = StringList<'\n'>;

impl<const SEP: char> StringList<SEP> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_items<I: IntoIterator<Item = String>>(items: I) -> Self {
        Self(
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

impl<'de, const SEP: char> Deserialize<'de> for StringList<SEP> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Text(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => Self::default(),
            Some(Raw::List(items)) => Self::from_items(items),
            Some(Raw::Text(text)) => Self::from_items(text.split(SEP).map(str::to_string)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Priced {
        #[serde(default, deserialize_with = "opt_number")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "opt_integer")]
        rating: Option<i64>,
    }

    #[test]
    fn test_number_from_string_or_number() {
        let p: Priced = serde_json::from_value(json!({"price": "36500", "rating": 4})).unwrap();
        assert_eq!(p.price, Some(36500.0));
        assert_eq!(p.rating, Some(4));

        let p: Priced = serde_json::from_value(json!({"price": 2000, "rating": "4.5"})).unwrap();
        assert_eq!(p.price, Some(2000.0));
        assert_eq!(p.rating, Some(4));
    }

    #[test]
    fn test_missing_and_blank_numbers() {
        let p: Priced = serde_json::from_value(json!({"price": " "})).unwrap();
        assert_eq!(p.price, None);
        assert_eq!(p.rating, None);

        let p: Priced = serde_json::from_value(json!({"price": null})).unwrap();
        assert_eq!(p.price, None);
    }

    #[test]
    fn test_non_numeric_string_rejected() {
        let result: Result<Priced, _> = serde_json::from_value(json!({"price": "cheap"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_comma_list_from_string() {
        let list: CommaList = serde_json::from_value(json!("AC, GPS,, Music System ")).unwrap();
        assert_eq!(list.0, vec!["AC", "GPS", "Music System"]);
    }

    #[test]
    fn test_line_list_from_string_and_array() {
        let list: LineList = serde_json::from_value(json!("Day 1: Arrive\n\nDay 2: Depart")).unwrap();
        assert_eq!(list.0, vec!["Day 1: Arrive", "Day 2: Depart"]);

        let list: LineList = serde_json::from_value(json!(["Shimla", " ", "Manali"])).unwrap();
        assert_eq!(list.0, vec!["Shimla", "Manali"]);
    }

    #[test]
    fn test_list_serializes_as_array() {
        let list: CommaList = serde_json::from_value(json!("a,b")).unwrap();
        assert_eq!(serde_json::to_value(&list).unwrap(), json!(["a", "b"]));
    }
}
