//! Typed views over the two documents the reservation protocol touches.
//!
//! Both collections stay schemaless for the generic CRUD surface; these views
//! only narrow the fields the protocol reads and ignore everything else.

use serde_json::{Number, Value as JsonValue};

use super::{COURSE_ID_FIELD, NAME_FIELD, QUANTITY_FIELD, SPACE_FIELD};
use crate::core::{Document, ObjectId, Result, StoreError, document_id};

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: ObjectId,
    pub name: Option<String>,
    pub space: Number,
}

impl Course {
    pub fn from_document(document: &Document) -> Result<Self> {
        let id = document_id(document)?
            .ok_or_else(|| StoreError::InvalidDocument("course has no _id".to_string()))?;
        let space = match document.get(SPACE_FIELD) {
            Some(JsonValue::Number(n)) => n.clone(),
            _ => {
                return Err(StoreError::InvalidDocument(format!(
                    "course {id} has no numeric '{SPACE_FIELD}'"
                )));
            }
        };
        Ok(Self {
            id,
            name: text_field(document, NAME_FIELD),
            space,
        })
    }

    pub fn space_i64(&self) -> Option<i64> {
        self.space.as_i64()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartEntry {
    pub course_id: ObjectId,
    pub name: Option<String>,
    pub quantity: i64,
}

impl CartEntry {
    pub fn from_document(document: &Document) -> Result<Self> {
        let course_id = match document.get(COURSE_ID_FIELD) {
            Some(JsonValue::String(raw)) => ObjectId::parse(raw)?,
            _ => {
                return Err(StoreError::InvalidDocument(format!(
                    "cart entry has no '{COURSE_ID_FIELD}'"
                )));
            }
        };
        // Fractional quantities only appear if someone wrote them through the
        // generic surface; truncate rather than refuse.
        let quantity = document
            .get(QUANTITY_FIELD)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(0);
        Ok(Self {
            course_id,
            name: text_field(document, NAME_FIELD),
            quantity,
        })
    }
}

fn text_field(document: &Document, field: &str) -> Option<String> {
    document.get(field).and_then(JsonValue::as_str).map(str::to_string)
}
