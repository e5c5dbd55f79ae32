//! `$set` / `$inc` style updates applied to a single document.

use serde_json::{Map, Number, Value as JsonValue};

use crate::core::{Document, ID_FIELD, ObjectId, Result, StoreError, add_numbers};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Document,
    inc: Map<String, JsonValue>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partial merge of every top-level field in `fields`.
    pub fn set_all(fields: Document) -> Self {
        Self {
            set: fields,
            inc: Map::new(),
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    pub fn inc(mut self, field: impl Into<String>, delta: impl Into<Number>) -> Self {
        self.inc.insert(field.into(), JsonValue::Number(delta.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty()
    }

    /// Apply to `document` in place. Returns whether any field changed.
    ///
    /// Validation runs before the first write, so a failed update leaves the
    /// document untouched.
    pub fn apply(&self, document: &mut Document) -> Result<bool> {
        self.check_immutable_id(document)?;

        let mut increments = Vec::with_capacity(self.inc.len());
        for (field, delta) in &self.inc {
            let JsonValue::Number(delta) = delta else {
                return Err(StoreError::InvalidUpdate(format!(
                    "increment for '{field}' is not a number"
                )));
            };
            increments.push((field, add_numbers(field, document.get(field), delta)?));
        }

        let mut modified = false;
        for (field, value) in &self.set {
            // An existing `_id` already passed `check_immutable_id`; keep its stored form.
            if field == ID_FIELD && document.contains_key(ID_FIELD) {
                continue;
            }
            if document.get(field) != Some(value) {
                document.insert(field.clone(), value.clone());
                modified = true;
            }
        }
        for (field, value) in increments {
            if document.get(field) != Some(&value) {
                document.insert(field.clone(), value);
                modified = true;
            }
        }
        Ok(modified)
    }

    fn check_immutable_id(&self, document: &Document) -> Result<()> {
        if self.inc.contains_key(ID_FIELD) {
            return Err(StoreError::ImmutableField(ID_FIELD.to_string()));
        }
        let Some(new_id) = self.set.get(ID_FIELD) else {
            return Ok(());
        };
        let Some(current) = document.get(ID_FIELD) else {
            return Ok(());
        };
        if same_id(new_id, current) {
            Ok(())
        } else {
            Err(StoreError::ImmutableField(ID_FIELD.to_string()))
        }
    }
}

/// Identifiers compare by value, so hex case does not matter.
fn same_id(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::String(a), JsonValue::String(b)) => match (ObjectId::parse(a), ObjectId::parse(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        },
        _ => a == b,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Create the document from the filter's equality clauses when nothing matches.
    pub upsert: bool,
}

impl UpdateOptions {
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}
