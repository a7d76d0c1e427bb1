use indexmap::IndexMap;
use o2p_core::parse::media_type::MediaType;
use o2p_core::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType, TypeSet};
use serde_json::{Map, Value};

/// Nesting limit for generated samples. Deeper nodes become `null`.
const MAX_DEPTH: usize = 8;

/// Which side of the exchange a sample is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    /// Skips `readOnly` properties.
    Request,
    /// Skips `writeOnly` properties.
    Response,
}

/// Sample payload for a media type: an explicit example first, then one
/// generated from the schema.
pub fn media_example(media: &MediaType, mode: SampleMode) -> Option<Value> {
    if let Some(example) = &media.example {
        return Some(example.clone());
    }
    if let Some(value) = media.examples.values().find_map(|e| e.get("value")) {
        return Some(value.clone());
    }
    media.schema.as_ref().map(|schema| sample(schema, mode))
}

/// Generate a placeholder value for a schema.
pub fn sample(schema: &SchemaOrRef, mode: SampleMode) -> Value {
    sample_at(schema, mode, 0)
}

/// Placeholder text for a scalar schema, e.g. `<string>` or `<dateTime>`.
pub fn placeholder(schema: &Schema) -> String {
    let name = match (primary_type(schema), schema.format.as_deref()) {
        (Some(SchemaType::String), Some("date-time")) => "dateTime",
        (Some(SchemaType::String), Some(format)) => format,
        (Some(SchemaType::String), None) => "string",
        (Some(SchemaType::Integer), Some("int64")) => "long",
        (Some(SchemaType::Integer), _) => "integer",
        (Some(SchemaType::Number), _) => "number",
        (Some(SchemaType::Boolean), _) => "boolean",
        (Some(SchemaType::Array), _) => "array",
        (Some(SchemaType::Object), _) => "object",
        (Some(SchemaType::Null), _) => "null",
        (None, _) => "string",
    };
    format!("<{name}>")
}

fn sample_at(schema: &SchemaOrRef, mode: SampleMode, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    match schema {
        // Only circular references survive dereferencing.
        SchemaOrRef::Ref { .. } => Value::Object(Map::new()),
        SchemaOrRef::Schema(schema) => sample_schema(schema, mode, depth),
    }
}

fn sample_schema(schema: &Schema, mode: SampleMode, depth: usize) -> Value {
    if let Some(value) = declared_value(schema) {
        return value;
    }

    if schema.schema_type.is_none() {
        if !schema.all_of.is_empty() {
            return merge_all_of(&schema.all_of, mode, depth);
        }
        if let Some(first) = schema.one_of.first().or_else(|| schema.any_of.first()) {
            return sample_at(first, mode, depth + 1);
        }
    }

    match primary_type(schema) {
        Some(SchemaType::Object) => sample_object(schema, mode, depth),
        Some(SchemaType::Array) => match &schema.items {
            Some(items) => Value::Array(vec![sample_at(items, mode, depth + 1)]),
            None => Value::Array(Vec::new()),
        },
        Some(SchemaType::Null) => Value::Null,
        None if !schema.properties.is_empty() => sample_object(schema, mode, depth),
        _ => Value::String(placeholder(schema)),
    }
}

/// `example`, `default`, `const`, or the first `enum` value, in that order.
fn declared_value(schema: &Schema) -> Option<Value> {
    schema
        .example
        .clone()
        .or_else(|| schema.default_value.clone())
        .or_else(|| schema.const_value.clone())
        .or_else(|| schema.enum_values.first().cloned())
}

fn sample_object(schema: &Schema, mode: SampleMode, depth: usize) -> Value {
    let mut object = Map::new();
    for (name, property) in &schema.properties {
        if skipped(property, mode) {
            continue;
        }
        object.insert(name.clone(), sample_at(property, mode, depth + 1));
    }
    if let Some(AdditionalProperties::Schema(extra)) = &schema.additional_properties {
        if object.is_empty() {
            object.insert("key".to_string(), sample_at(extra, mode, depth + 1));
        }
    }
    Value::Object(object)
}

fn merge_all_of(members: &[SchemaOrRef], mode: SampleMode, depth: usize) -> Value {
    let mut merged: IndexMap<String, Value> = IndexMap::new();
    let mut last = Value::Object(Map::new());
    for member in members {
        match sample_at(member, mode, depth + 1) {
            Value::Object(map) => merged.extend(map),
            other => last = other,
        }
    }
    if merged.is_empty() {
        last
    } else {
        Value::Object(merged.into_iter().collect())
    }
}

fn skipped(property: &SchemaOrRef, mode: SampleMode) -> bool {
    let SchemaOrRef::Schema(schema) = property else {
        return false;
    };
    match mode {
        SampleMode::Request => schema.read_only == Some(true),
        SampleMode::Response => schema.write_only == Some(true),
    }
}

/// First non-null type of a schema.
fn primary_type(schema: &Schema) -> Option<SchemaType> {
    match schema.schema_type.as_ref()? {
        TypeSet::Single(t) => Some(t.clone()),
        TypeSet::Multiple(types) => types
            .iter()
            .find(|t| **t != SchemaType::Null)
            .or_else(|| types.first())
            .cloned(),
    }
}
