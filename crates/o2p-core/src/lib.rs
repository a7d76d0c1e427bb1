pub mod collection;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod orchestrator;
pub mod parse;
pub mod transform;

use std::future::Future;
use std::path::Path;

use collection::Collection;
use error::{ConversionError, DereferenceError};
use parse::spec::ApiDocument;
use serde::Deserialize;

pub use orchestrator::{Conversion, Orchestrator};

/// How the converter groups generated requests into folders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderStrategy {
    /// One folder per OpenAPI operation tag.
    #[default]
    Tags,
    /// One folder per leading path segment.
    Paths,
}

/// Options handed to the converter alongside the dereferenced document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    pub folder_strategy: FolderStrategy,
    pub collapse_folders: bool,
}

/// Resolves a root OpenAPI file and everything it references into a single document.
pub trait Dereferencer {
    fn dereference(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<ApiDocument, DereferenceError>> + Send;
}

/// Turns a dereferenced OpenAPI document into an initial Postman collection.
pub trait Converter {
    fn convert(
        &self,
        document: &ApiDocument,
        options: &ConversionOptions,
    ) -> impl Future<Output = Result<Collection, ConversionError>> + Send;
}
