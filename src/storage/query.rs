//! Filters and find options understood by every [`DocumentStore`](super::DocumentStore).

use serde_json::Value as JsonValue;

use crate::core::{Document, ID_FIELD, ObjectId, as_f64, compare_values};

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(JsonValue),
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
}

impl Condition {
    fn matches(&self, value: Option<&JsonValue>) -> bool {
        match self {
            Condition::Eq(expected) => value.is_some_and(|v| values_equal(v, expected)),
            // Range conditions never match missing or non-numeric fields
            Condition::Gt(bound) => as_f64(value).is_some_and(|v| v > *bound),
            Condition::Gte(bound) => as_f64(value).is_some_and(|v| v >= *bound),
            Condition::Lt(bound) => as_f64(value).is_some_and(|v| v < *bound),
            Condition::Lte(bound) => as_f64(value).is_some_and(|v| v <= *bound),
        }
    }
}

fn values_equal(actual: &JsonValue, expected: &JsonValue) -> bool {
    match (actual, expected) {
        (JsonValue::Number(_), JsonValue::Number(_)) => {
            compare_values(Some(actual), Some(expected)).is_eq()
        }
        _ => actual == expected,
    }
}

/// Conjunction of per-field conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: ObjectId) -> Self {
        Self::new().eq(ID_FIELD, id.to_hex())
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.clauses.push((field.into(), Condition::Eq(value.into())));
        self
    }

    pub fn gt(mut self, field: impl Into<String>, bound: f64) -> Self {
        self.clauses.push((field.into(), Condition::Gt(bound)));
        self
    }

    pub fn gte(mut self, field: impl Into<String>, bound: f64) -> Self {
        self.clauses.push((field.into(), Condition::Gte(bound)));
        self
    }

    pub fn lt(mut self, field: impl Into<String>, bound: f64) -> Self {
        self.clauses.push((field.into(), Condition::Lt(bound)));
        self
    }

    pub fn lte(mut self, field: impl Into<String>, bound: f64) -> Self {
        self.clauses.push((field.into(), Condition::Lte(bound)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, condition)| condition.matches(document.get(field)))
    }

    /// Identifier pinned by an `_id` equality clause, if any.
    ///
    /// Lets stores jump straight to the document instead of scanning.
    pub fn pinned_id(&self) -> Option<ObjectId> {
        self.clauses.iter().find_map(|(field, condition)| match condition {
            Condition::Eq(JsonValue::String(raw)) if field == ID_FIELD => ObjectId::parse(raw).ok(),
            _ => None,
        })
    }

    /// Equality clauses, used to seed the document created by an upsert.
    pub fn equalities(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.clauses.iter().filter_map(|(field, condition)| match condition {
            Condition::Eq(value) => Some((field.as_str(), value)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// `"desc"` sorts descending; every other token sorts ascending.
    pub fn from_token(token: &str) -> Self {
        if token == "desc" {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub limit: Option<usize>,
    pub sort: Option<SortSpec>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec {
            field: field.into(),
            direction,
        });
        self
    }

    /// Sort (stable, so ties keep their incoming order) and truncate.
    pub fn apply(&self, mut documents: Vec<Document>) -> Vec<Document> {
        if let Some(spec) = &self.sort {
            documents.sort_by(|a, b| {
                let ord = compare_values(a.get(&spec.field), b.get(&spec.field));
                match spec.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
        documents
    }
}
