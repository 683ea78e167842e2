//! Schemaless documents as returned by the backing store.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::id::DocumentId;

/// Field map of a document, as stored.
pub type Fields = serde_json::Map<String, Value>;

/// A stored record: store-assigned identifier plus arbitrary fields.
///
/// No schema is imposed. Serializes flat as `{ "id": ..., ...fields }`; when the
/// stored fields carry their own `id` key, that value is what clients see.
/// [`Document::id`] stays the store-assigned identifier either way.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    fields: Fields,
}

impl Document {
    pub fn new(id: DocumentId, fields: Fields) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String value of a field, `None` when missing or not a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = match self.fields.get("id") {
            Some(stored) => {
                let mut map = serializer.serialize_map(Some(self.fields.len()))?;
                map.serialize_entry("id", stored)?;
                map
            }
            None => {
                let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
                map.serialize_entry("id", &self.id)?;
                map
            }
        };
        for (key, value) in &self.fields {
            if key != "id" {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn serializes_flat_with_id() {
        let doc = Document::new(
            DocumentId::new("abc").unwrap(),
            fields(json!({ "title": "Lamp", "price": 12.5 })),
        );

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({ "id": "abc", "title": "Lamp", "price": 12.5 }));
    }

    #[test]
    fn stored_id_field_overrides_store_id_in_output() {
        let doc = Document::new(
            DocumentId::new("store-id").unwrap(),
            fields(json!({ "id": "legacy", "name": "Books" })),
        );

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({ "id": "legacy", "name": "Books" }));
        assert_eq!(doc.id().as_str(), "store-id");
        assert_eq!(doc.field("id"), Some(&json!("legacy")));
    }

    #[test]
    fn stored_id_field_keeps_its_type() {
        let doc = Document::new(DocumentId::new("c1").unwrap(), fields(json!({ "id": 7 })));

        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(text, r#"{"id":7}"#);
    }

    #[test]
    fn str_field_ignores_non_strings() {
        let doc = Document::new(
            DocumentId::new("p1").unwrap(),
            fields(json!({ "title": 42, "category": "toys" })),
        );

        assert_eq!(doc.str_field("title"), None);
        assert_eq!(doc.str_field("category"), Some("toys"));
        assert_eq!(doc.str_field("missing"), None);
    }
}
