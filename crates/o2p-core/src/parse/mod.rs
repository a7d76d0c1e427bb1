pub mod deref;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod server;
pub mod spec;

use crate::error::DereferenceError;
use spec::ApiDocument;

/// Interpret an already-dereferenced JSON value as an OpenAPI document.
pub fn from_value(value: serde_json::Value) -> Result<ApiDocument, DereferenceError> {
    serde_json::from_value(value).map_err(DereferenceError::Document)
}

