use std::path::{Path, PathBuf};

use o2p_core::Dereferencer;
use o2p_core::error::DereferenceError;
use o2p_core::parse::deref::{FileDereferencer, dereference_file};
use o2p_core::parse::schema::SchemaOrRef;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[tokio::test]
async fn dereference_multi_file_document() {
    let value = dereference_file(&fixture("events-api/openapi.json"))
        .await
        .expect("should dereference");

    let body_schema =
        &value["paths"]["/events"]["post"]["requestBody"]["content"]["application/json"]["schema"];
    assert_eq!(body_schema["type"], "object");
    assert_eq!(body_schema["properties"]["name"]["type"], "string");

    // event.json -> place.yaml#/Place -> #/Address inside place.yaml
    let location = &body_schema["properties"]["location"];
    assert_eq!(location["description"], "Venue where an event takes place");
    assert_eq!(
        location["properties"]["address"]["properties"]["postalCode"]["type"],
        "string"
    );

    let parameter = &value["paths"]["/events"]["get"]["parameters"][0];
    assert_eq!(parameter["name"], "page");
    assert!(!value.to_string().contains("$ref"));
}

#[tokio::test]
async fn dereferencer_returns_typed_document() {
    let document = FileDereferencer
        .dereference(&fixture("events-api/openapi.json"))
        .await
        .expect("should dereference");

    assert_eq!(document.info.title, "Events API");
    assert_eq!(document.servers.len(), 2);
    assert_eq!(document.tags.len(), 2);

    let post = document.paths["/events"].post.as_ref().expect("POST /events");
    let schema = post.request_body.as_ref().unwrap().content["application/json"]
        .schema
        .as_ref()
        .unwrap();
    match schema {
        SchemaOrRef::Schema(s) => {
            assert_eq!(s.required, vec!["name".to_string()]);
            assert_eq!(s.all_of.len(), 1);
        }
        SchemaOrRef::Ref { ref_path } => panic!("unresolved ref {ref_path}"),
    }
}

#[tokio::test]
async fn dereference_yaml_root_with_relative_sibling() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("components")).unwrap();
    std::fs::write(
        dir.path().join("openapi.yaml"),
        r#"
openapi: 3.0.0
info:
  title: Places
  version: "1"
paths:
  /places:
    get:
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema:
                $ref: ./components/place.json
"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("components/place.json"),
        r#"{ "type": "object", "properties": { "name": { "type": "string" } } }"#,
    )
    .unwrap();

    let value = dereference_file(&dir.path().join("openapi.yaml"))
        .await
        .unwrap();
    let schema = &value["paths"]["/places"]["get"]["responses"]["200"]["content"]
        ["application/json"]["schema"];
    assert_eq!(schema["properties"]["name"]["type"], "string");
}

#[tokio::test]
async fn missing_root_is_io_error() {
    let err = dereference_file(&fixture("does-not-exist.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, DereferenceError::Io { .. }));
}

#[tokio::test]
async fn missing_sibling_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("openapi.json"),
        r#"{ "openapi": "3.0.0", "paths": { "/x": { "$ref": "paths/x.json" } } }"#,
    )
    .unwrap();

    let err = dereference_file(&dir.path().join("openapi.json"))
        .await
        .unwrap_err();
    match err {
        DereferenceError::Io { path, .. } => assert!(path.ends_with("paths/x.json")),
        other => panic!("expected I/O error, got {other}"),
    }
}

#[tokio::test]
async fn malformed_json_is_reported_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("openapi.json");
    std::fs::write(&root, "{ \"openapi\": ").unwrap();

    let err = dereference_file(&root).await.unwrap_err();
    assert!(matches!(err, DereferenceError::Json { .. }));
    assert!(err.to_string().contains("openapi.json"));
}
