use std::future::Future;

use o2p_core::collection::{Collection, Info, Variable};
use o2p_core::error::ConversionError;
use o2p_core::parse::spec::ApiDocument;
use o2p_core::transform::BASE_URL_VAR;
use o2p_core::{ConversionOptions, Converter};

use crate::folders::{build_items, collapse_folders};

/// Value of `baseUrl` when the document declares no server.
const FALLBACK_BASE_URL: &str = "/";

/// Converts OpenAPI 3.x documents into Postman v2.1 collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostmanConverter;

impl Converter for PostmanConverter {
    fn convert(
        &self,
        document: &ApiDocument,
        options: &ConversionOptions,
    ) -> impl Future<Output = Result<Collection, ConversionError>> + Send {
        let result = convert_document(document, options);
        async move { result }
    }
}

/// Synchronous conversion used by [`PostmanConverter`].
pub fn convert_document(
    document: &ApiDocument,
    options: &ConversionOptions,
) -> Result<Collection, ConversionError> {
    validate_version(document)?;

    let mut info = Info::new(collection_name(document));
    info.description = document.info.description.clone();

    let mut items = build_items(document, options.folder_strategy);
    if options.collapse_folders {
        items = collapse_folders(items);
    }

    let base_url = document
        .servers
        .first()
        .map(|server| server.expanded_url())
        .unwrap_or_else(|| FALLBACK_BASE_URL.to_string());

    let mut collection = Collection::new(info);
    collection.item = items;
    collection.variable.push(Variable {
        key: BASE_URL_VAR.to_string(),
        value: base_url,
        var_type: Some("string".to_string()),
    });

    log::debug!(
        "converted {} path(s) into {} request(s)",
        document.paths.len(),
        collection.requests().len()
    );
    Ok(collection)
}

fn validate_version(document: &ApiDocument) -> Result<(), ConversionError> {
    if !document.openapi.starts_with("3.") {
        let version = if document.openapi.is_empty() {
            "(missing)"
        } else {
            document.openapi.as_str()
        };
        return Err(ConversionError::new(format!(
            "unsupported OpenAPI version {version}, expected 3.x"
        )));
    }
    Ok(())
}

fn collection_name(document: &ApiDocument) -> String {
    if document.info.title.is_empty() {
        "OpenAPI collection".to_string()
    } else {
        document.info.title.clone()
    }
}
