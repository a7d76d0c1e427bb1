use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DereferenceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),

    #[error("dereferenced document is not a usable OpenAPI document: {0}")]
    Document(#[source] serde_json::Error),
}

/// Failure reported by the converter. The reason is carried verbatim.
#[derive(Debug, Error)]
#[error("conversion failed: {reason}")]
pub struct ConversionError {
    pub reason: String,
}

impl ConversionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Dereference(#[from] DereferenceError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("unknown environment: {0} (expected acc, test or prod)")]
    UnknownEnvironment(String),

    #[error("unknown grant type: {0} (expected client_credentials or authorization_code)")]
    UnknownGrantType(String),

    #[error("unknown auth method: {0} (expected none, x-client-id or token)")]
    UnknownAuthMethod(String),

    #[error("missing required auth option: {0}")]
    MissingAuthOption(&'static str),
}
