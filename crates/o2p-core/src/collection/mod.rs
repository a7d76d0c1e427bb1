//! Postman collection (format v2.1) document model.

pub mod auth;
pub mod url;

use serde::{Deserialize, Serialize};

pub use auth::{AuthParam, AuthScheme, OAuth2Flow, OAuth2Scheme, StaticIdentifier};
pub use url::{PathVariable, QueryParam, Url};

/// JSON schema URL identifying the v2.1 collection format.
pub const COLLECTION_SCHEMA_V21: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Collection metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(rename = "_postman_id", skip_serializing_if = "Option::is_none")]
    pub postman_id: Option<String>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub schema: String,
}

impl Info {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            postman_id: None,
            name: name.into(),
            description: None,
            schema: COLLECTION_SCHEMA_V21.to_string(),
        }
    }
}

/// A collection-level variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,

    #[serde(default)]
    pub value: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            var_type: None,
        }
    }
}

/// Root of a Postman collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub info: Info,

    #[serde(default)]
    pub item: Vec<CollectionNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthScheme>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<Variable>,
}

impl Collection {
    pub fn new(info: Info) -> Self {
        Self {
            info,
            item: Vec::new(),
            auth: None,
            variable: Vec::new(),
        }
    }

    /// Value of a variable. When a key occurs more than once the last entry wins.
    pub fn variable(&self, key: &str) -> Option<&str> {
        self.variable
            .iter()
            .rev()
            .find(|v| v.key == key)
            .map(|v| v.value.as_str())
    }

    /// Drop every variable with this key.
    pub fn remove_variable(&mut self, key: &str) {
        self.variable.retain(|v| v.key != key);
    }

    /// Replace any existing variable with this key and append the new value.
    pub fn set_variable(&mut self, key: &str, value: impl Into<String>) {
        self.remove_variable(key);
        self.variable.push(Variable::new(key, value));
    }

    /// All request nodes in depth-first order.
    pub fn requests(&self) -> Vec<&RequestItem> {
        fn walk<'a>(nodes: &'a [CollectionNode], out: &mut Vec<&'a RequestItem>) {
            for node in nodes {
                match node {
                    CollectionNode::Folder(folder) => walk(&folder.item, out),
                    CollectionNode::Request(request) => out.push(request),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.item, &mut out);
        out
    }
}

/// A node of the collection tree: either a folder or a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionNode {
    Folder(Folder),
    Request(RequestItem),
}

impl CollectionNode {
    pub fn name(&self) -> &str {
        match self {
            CollectionNode::Folder(folder) => &folder.name,
            CollectionNode::Request(request) => &request.name,
        }
    }
}

/// A folder grouping further nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub item: Vec<CollectionNode>,
}

/// A request node with its generated example responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    pub request: Request,

    #[serde(default)]
    pub response: Vec<ExampleResponse>,
}

/// An HTTP request definition.
///
/// `auth` is always serialized: `null` means "inherit from parent".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<Header>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,

    pub url: Url,

    #[serde(default)]
    pub auth: Option<AuthScheme>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A request or response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,

    #[serde(default)]
    pub value: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            description: None,
        }
    }
}

/// A request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,

    #[serde(default)]
    pub raw: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

impl Body {
    /// A raw JSON body.
    pub fn json(raw: impl Into<String>) -> Self {
        Self {
            mode: "raw".to_string(),
            raw: raw.into(),
            options: Some(serde_json::json!({ "raw": { "language": "json" } })),
        }
    }
}

/// A generated example response attached to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleResponse {
    pub name: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub code: u16,

    #[serde(
        rename = "_postman_previewlanguage",
        skip_serializing_if = "Option::is_none"
    )]
    pub preview_language: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<Header>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}
