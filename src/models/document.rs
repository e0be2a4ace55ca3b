//! Stored document wrapper shared by every collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collections of the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Cars,
    Tours,
    Offers,
    Reviews,
    Bookings,
    Contacts,
    Newsletter,
    Settings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Cars => "cars",
            Collection::Tours => "tours",
            Collection::Offers => "offers",
            Collection::Reviews => "reviews",
            Collection::Bookings => "bookings",
            Collection::Contacts => "contacts",
            Collection::Newsletter => "newsletter",
            Collection::Settings => "settings",
        }
    }
}

/// A document with its id and server-stamped timestamps.
///
/// The entity's own fields are flattened next to `id`, so clients see the
/// same `{ id, ...data }` shape for every collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
    pub created_at: String,
    pub updated_at: String,
}

/// Keys owned by the store that clients may not overwrite.
pub const RESERVED_KEYS: &[&str] = &["id", "createdAt", "updatedAt"];

/// Drop store-owned keys from a client-supplied object.
pub fn strip_reserved(mut object: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        object.remove(*key);
    }
    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_flattens_data() {
        #[derive(Debug, Serialize, Deserialize)]
        struct Named {
            name: String,
        }

        let doc = Document {
            id: "abc".to_string(),
            data: Named {
                name: "Swift".to_string(),
            },
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        };

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["name"], "Swift");
        assert_eq!(value["createdAt"], "2026-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_strip_reserved() {
        let object = json!({"id": "x", "createdAt": "t", "name": "n"});
        let stripped = strip_reserved(object.as_object().unwrap().clone());
        assert_eq!(Value::Object(stripped), json!({"name": "n"}));
    }
}
