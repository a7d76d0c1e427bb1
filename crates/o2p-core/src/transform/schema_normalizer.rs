use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::spec::ApiDocument;

/// Return a copy of `document` whose request-body schemas carry no composition
/// keyword next to a `type`. Response and parameter schemas are left as they are.
pub fn normalize_request_bodies(document: &ApiDocument) -> ApiDocument {
    let mut normalized = document.clone();
    for item in normalized.paths.values_mut() {
        for operation in item.operations_mut() {
            let Some(body) = operation.request_body.as_mut() else {
                continue;
            };
            for media in body.content.values_mut() {
                if let Some(schema) = media.schema.as_ref() {
                    media.schema = Some(normalize_schema_or_ref(schema));
                }
            }
        }
    }
    normalized
}

pub fn normalize_schema_or_ref(schema: &SchemaOrRef) -> SchemaOrRef {
    match schema {
        SchemaOrRef::Ref { .. } => schema.clone(),
        SchemaOrRef::Schema(inner) => SchemaOrRef::Schema(Box::new(normalize_schema(inner))),
    }
}

/// Drop `allOf`/`anyOf`/`oneOf`/`not` from a typed schema. An untyped schema
/// keeps its composition lists with every member normalized; its `not` is kept
/// without being descended into.
pub fn normalize_schema(schema: &Schema) -> Schema {
    let mut normalized = schema.clone();
    if schema.schema_type.is_some() {
        normalized.all_of.clear();
        normalized.any_of.clear();
        normalized.one_of.clear();
        normalized.not = None;
    } else {
        normalized.all_of = schema.all_of.iter().map(normalize_schema_or_ref).collect();
        normalized.any_of = schema.any_of.iter().map(normalize_schema_or_ref).collect();
        normalized.one_of = schema.one_of.iter().map(normalize_schema_or_ref).collect();
    }
    normalized
}
