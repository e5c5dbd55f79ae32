pub mod document;
pub mod error;
pub mod object_id;
pub mod value;

pub use document::{Document, ID_FIELD, document_from_json, document_id, set_document_id};
pub use error::{Result, StoreError};
pub use object_id::ObjectId;
pub use value::{add_numbers, as_f64, compare_values};
