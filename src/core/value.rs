use std::cmp::Ordering;

use serde_json::{Number, Value as JsonValue};

use super::{Result, StoreError};

/// Total order over optional JSON field values, used for sorting.
///
/// Missing fields and `null` are "greater" than all values (NULL LAST), the
/// same place SQL engines put them for ascending sorts. Across kinds the order
/// is number < string < object < array < boolean.
pub fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

fn compare_present(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::Number(a), JsonValue::Number(b)) => compare_numbers(a, b),
        (JsonValue::String(a), JsonValue::String(b)) => a.cmp(b),
        (JsonValue::Bool(a), JsonValue::Bool(b)) => a.cmp(b),
        (JsonValue::Array(a), JsonValue::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ord = compare_present(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        (JsonValue::Object(a), JsonValue::Object(b)) => {
            for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                let ord = ka.cmp(kb).then_with(|| compare_values(Some(va), Some(vb)));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &JsonValue) -> u8 {
    match value {
        JsonValue::Number(_) => 0,
        JsonValue::String(_) => 1,
        JsonValue::Object(_) => 2,
        JsonValue::Array(_) => 3,
        JsonValue::Bool(_) => 4,
        JsonValue::Null => 5,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }

    let a = a.as_f64().unwrap_or(f64::NAN);
    let b = b.as_f64().unwrap_or(f64::NAN);
    // NaN is considered equal to NaN, greater than all other values
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Numeric view of a field, `None` for anything that is not a JSON number.
pub fn as_f64(value: Option<&JsonValue>) -> Option<f64> {
    value.and_then(JsonValue::as_f64)
}

/// Add `delta` to `current`, keeping integers integral.
///
/// A missing field counts as zero. Non-numeric fields cannot be incremented.
pub fn add_numbers(field: &str, current: Option<&JsonValue>, delta: &Number) -> Result<JsonValue> {
    let current = match current {
        None | Some(JsonValue::Null) => return Ok(JsonValue::Number(delta.clone())),
        Some(JsonValue::Number(n)) => n,
        Some(other) => {
            return Err(StoreError::InvalidUpdate(format!(
                "cannot increment non-numeric field '{field}' of type {}",
                super::document::kind_name(other)
            )));
        }
    };

    if let (Some(a), Some(b)) = (current.as_i64(), delta.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Ok(JsonValue::from(sum));
        }
    }

    let sum = current.as_f64().unwrap_or(0.0) + delta.as_f64().unwrap_or(0.0);
    Number::from_f64(sum)
        .map(JsonValue::Number)
        .ok_or_else(|| StoreError::InvalidUpdate(format!("increment of '{field}' is not finite")))
}
