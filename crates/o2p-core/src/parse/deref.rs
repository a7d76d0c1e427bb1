use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value};

use super::spec::ApiDocument;
use crate::Dereferencer;
use crate::error::DereferenceError;

/// Dereferences OpenAPI documents stored on the local filesystem.
///
/// Every file reachable through `$ref` is loaded up front, then all
/// references are inlined. Circular references are left as `$ref` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDereferencer;

impl Dereferencer for FileDereferencer {
    fn dereference(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<ApiDocument, DereferenceError>> + Send {
        let root = normalize_path(path);
        async move {
            let value = dereference_file(&root).await?;
            super::from_value(value)
        }
    }
}

/// Load `root` and every file it references, returning a single inlined JSON value.
pub async fn dereference_file(root: &Path) -> Result<Value, DereferenceError> {
    let root = normalize_path(root);
    let documents = load_documents(&root).await?;
    log::debug!(
        "loaded {} document(s) while dereferencing {}",
        documents.len(),
        root.display()
    );
    let mut resolver = RefResolver::new(&documents);
    resolver.resolve_document(&root)
}

async fn load_documents(root: &Path) -> Result<HashMap<PathBuf, Value>, DereferenceError> {
    let mut documents: HashMap<PathBuf, Value> = HashMap::new();
    let mut queue = VecDeque::from([root.to_path_buf()]);

    while let Some(path) = queue.pop_front() {
        if documents.contains_key(&path) {
            continue;
        }
        let value = read_document(&path).await?;

        let mut refs = Vec::new();
        collect_refs(&value, &mut refs);
        for reference in refs {
            let (file, _) = split_ref(reference);
            if file.is_empty() {
                continue;
            }
            if is_remote(file) {
                return Err(DereferenceError::InvalidRefFormat(reference.to_string()));
            }
            let target = resolve_file(&path, file);
            if !documents.contains_key(&target) {
                queue.push_back(target);
            }
        }

        documents.insert(path, value);
    }

    Ok(documents)
}

async fn read_document(path: &Path) -> Result<Value, DereferenceError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DereferenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    match ext {
        "yaml" | "yml" => {
            serde_yaml_ng::from_str(&content).map_err(|source| DereferenceError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => serde_json::from_str(&content).map_err(|source| DereferenceError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn collect_refs<'v>(value: &'v Value, refs: &mut Vec<&'v str>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                refs.push(reference);
            }
            for v in map.values() {
                collect_refs(v, refs);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_refs(v, refs);
            }
        }
        _ => {}
    }
}

/// Inlines `$ref` nodes against a set of preloaded documents.
struct RefResolver<'a> {
    documents: &'a HashMap<PathBuf, Value>,
    /// References currently being expanded, as (file, pointer).
    stack: Vec<(PathBuf, String)>,
}

impl<'a> RefResolver<'a> {
    fn new(documents: &'a HashMap<PathBuf, Value>) -> Self {
        Self {
            documents,
            stack: Vec::new(),
        }
    }

    fn resolve_document(&mut self, path: &Path) -> Result<Value, DereferenceError> {
        let documents = self.documents;
        let document = documents
            .get(path)
            .ok_or_else(|| DereferenceError::RefTargetNotFound(path.display().to_string()))?;
        self.resolve_value(document, path)
    }

    fn resolve_value(&mut self, value: &Value, current: &Path) -> Result<Value, DereferenceError> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.resolve_ref(reference, map, current);
                }
                let mut resolved = Map::with_capacity(map.len());
                for (key, v) in map {
                    resolved.insert(key.clone(), self.resolve_value(v, current)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|v| self.resolve_value(v, current))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_ref(
        &mut self,
        reference: &str,
        node: &Map<String, Value>,
        current: &Path,
    ) -> Result<Value, DereferenceError> {
        let (file, pointer) = split_ref(reference);
        if is_remote(file) {
            return Err(DereferenceError::InvalidRefFormat(reference.to_string()));
        }
        let target_path = if file.is_empty() {
            current.to_path_buf()
        } else {
            resolve_file(current, file)
        };

        let key = (target_path.clone(), pointer.to_string());
        if self.stack.contains(&key) {
            log::debug!("leaving circular reference {reference} in place");
            return Ok(Value::Object(node.clone()));
        }

        let documents = self.documents;
        let document = documents
            .get(&target_path)
            .ok_or_else(|| DereferenceError::RefTargetNotFound(reference.to_string()))?;
        let target = lookup_pointer(document, pointer, reference)?;

        self.stack.push(key);
        let resolved = self.resolve_value(target, &target_path);
        self.stack.pop();
        let mut resolved = resolved?;

        // Keys written next to `$ref` override the target's.
        if let Value::Object(ref mut map) = resolved {
            for (k, v) in node {
                if k != "$ref" {
                    let v = self.resolve_value(v, current)?;
                    map.insert(k.clone(), v);
                }
            }
        }

        Ok(resolved)
    }
}

fn lookup_pointer<'v>(
    document: &'v Value,
    pointer: &str,
    reference: &str,
) -> Result<&'v Value, DereferenceError> {
    if pointer.is_empty() {
        return Ok(document);
    }
    if !pointer.starts_with('/') {
        return Err(DereferenceError::InvalidRefFormat(reference.to_string()));
    }
    let pointer = percent_decode(pointer)
        .ok_or_else(|| DereferenceError::InvalidRefFormat(reference.to_string()))?;
    document
        .pointer(&pointer)
        .ok_or_else(|| DereferenceError::RefTargetNotFound(reference.to_string()))
}

/// Decode `%XX` escapes in a URI fragment. `None` on a malformed escape or non-UTF-8 result.
fn percent_decode(fragment: &str) -> Option<String> {
    let bytes = fragment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = fragment.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

/// Split `other.json#/a/b` into (`other.json`, `/a/b`).
fn split_ref(reference: &str) -> (&str, &str) {
    reference.split_once('#').unwrap_or((reference, ""))
}

fn is_remote(file: &str) -> bool {
    file.starts_with("http://") || file.starts_with("https://")
}

/// Resolve `file` relative to the directory of the document that references it.
fn resolve_file(referrer: &Path, file: &str) -> PathBuf {
    let base = referrer.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(file))
}

/// Lexically remove `.` and `..` components so the same file always maps to one key.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(documents: &HashMap<PathBuf, Value>, root: &str) -> Result<Value, DereferenceError> {
        RefResolver::new(documents).resolve_document(Path::new(root))
    }

    #[test]
    fn test_split_ref() {
        assert_eq!(
            split_ref("#/components/schemas/Pet"),
            ("", "/components/schemas/Pet")
        );
        assert_eq!(split_ref("pet.json"), ("pet.json", ""));
        assert_eq!(split_ref("./a/pet.json#/Pet"), ("./a/pet.json", "/Pet"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("specs/./schemas/../entry.json")),
            PathBuf::from("specs/entry.json")
        );
        assert_eq!(
            normalize_path(Path::new("../shared/x.json")),
            PathBuf::from("../shared/x.json")
        );
    }

    #[test]
    fn test_resolve_file_is_relative_to_referrer() {
        assert_eq!(
            resolve_file(Path::new("specs/paths/events.json"), "../schemas/event.json"),
            PathBuf::from("specs/schemas/event.json")
        );
    }

    #[test]
    fn test_local_reference_is_inlined() {
        let documents = HashMap::from([(
            PathBuf::from("entry.json"),
            json!({
                "a": { "$ref": "#/definitions/B" },
                "definitions": { "B": { "type": "string" } }
            }),
        )]);
        let resolved = resolve(&documents, "entry.json").unwrap();
        assert_eq!(resolved["a"], json!({ "type": "string" }));
    }

    #[test]
    fn test_cross_file_reference_uses_target_file_as_base() {
        let documents = HashMap::from([
            (
                PathBuf::from("entry.json"),
                json!({ "a": { "$ref": "schemas/b.json#/B" } }),
            ),
            (
                PathBuf::from("schemas/b.json"),
                json!({
                    "B": { "type": "object", "properties": { "c": { "$ref": "#/C" } } },
                    "C": { "type": "integer" }
                }),
            ),
        ]);
        let resolved = resolve(&documents, "entry.json").unwrap();
        assert_eq!(
            resolved["a"]["properties"]["c"],
            json!({ "type": "integer" })
        );
    }

    #[test]
    fn test_sibling_keys_override_target() {
        let documents = HashMap::from([(
            PathBuf::from("entry.json"),
            json!({
                "a": { "$ref": "#/B", "description": "overridden" },
                "B": { "type": "string", "description": "original" }
            }),
        )]);
        let resolved = resolve(&documents, "entry.json").unwrap();
        assert_eq!(resolved["a"]["description"], "overridden");
        assert_eq!(resolved["a"]["type"], "string");
    }

    #[test]
    fn test_circular_reference_is_left_in_place() {
        let documents = HashMap::from([(
            PathBuf::from("entry.json"),
            json!({
                "Node": {
                    "type": "object",
                    "properties": { "next": { "$ref": "#/Node" } }
                }
            }),
        )]);
        let resolved = resolve(&documents, "entry.json").unwrap();
        assert_eq!(
            resolved["Node"]["properties"]["next"]["properties"]["next"],
            json!({ "$ref": "#/Node" })
        );
    }

    #[test]
    fn test_percent_encoded_pointer_is_decoded() {
        let documents = HashMap::from([(
            PathBuf::from("entry.json"),
            json!({
                "a": { "$ref": "#/definitions/%7Bid%7D" },
                "b": { "$ref": "#/paths/~1events~1%7BeventId%7D/get" },
                "definitions": { "{id}": { "type": "string" } },
                "paths": { "/events/{eventId}": { "get": { "summary": "Get event" } } }
            }),
        )]);
        let resolved = resolve(&documents, "entry.json").unwrap();
        assert_eq!(resolved["a"], json!({ "type": "string" }));
        assert_eq!(resolved["b"], json!({ "summary": "Get event" }));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(
            percent_decode("/a%20b/%7Bid%7D").as_deref(),
            Some("/a b/{id}")
        );
        assert_eq!(percent_decode("/caf%C3%A9").as_deref(), Some("/café"));
        assert_eq!(percent_decode("/plain").as_deref(), Some("/plain"));
        assert_eq!(percent_decode("/bad%7"), None);
        assert_eq!(percent_decode("/bad%zz"), None);
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let documents = HashMap::from([(
            PathBuf::from("entry.json"),
            json!({ "a": { "$ref": "#/nope" } }),
        )]);
        let err = resolve(&documents, "entry.json").unwrap_err();
        assert!(matches!(err, DereferenceError::RefTargetNotFound(r) if r == "#/nope"));
    }

    #[test]
    fn test_remote_reference_is_rejected() {
        let documents = HashMap::from([(
            PathBuf::from("entry.json"),
            json!({ "a": { "$ref": "https://example.com/x.json" } }),
        )]);
        let err = resolve(&documents, "entry.json").unwrap_err();
        assert!(matches!(err, DereferenceError::InvalidRefFormat(_)));
    }
}
