use serde_json::{Map, Value as JsonValue};

use super::{ObjectId, Result, StoreError};

/// Field holding the store-assigned identifier.
pub const ID_FIELD: &str = "_id";

/// A stored document: key-ordered field map, `_id` included.
pub type Document = Map<String, JsonValue>;

/// Accept a request body as a document. Only JSON objects qualify.
pub fn document_from_json(value: JsonValue) -> Result<Document> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            kind_name(&other)
        ))),
    }
}

/// Read `_id` if present. A present but unparsable identifier is an error.
pub fn document_id(document: &Document) -> Result<Option<ObjectId>> {
    match document.get(ID_FIELD) {
        None => Ok(None),
        Some(JsonValue::String(raw)) => ObjectId::parse(raw).map(Some),
        Some(other) => Err(StoreError::InvalidObjectId(format!(
            "_id must be a hex string, got {}",
            kind_name(other)
        ))),
    }
}

pub fn set_document_id(document: &mut Document, id: ObjectId) {
    document.insert(ID_FIELD.to_string(), JsonValue::String(id.to_hex()));
}

pub(crate) fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
