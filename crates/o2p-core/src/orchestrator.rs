use std::path::Path;

use crate::collection::Collection;
use crate::config::{EnvironmentConfig, IdentityConfig, IdentityProvider};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ConvertError;
use crate::parse::server::Server;
use crate::transform::{
    BaseUrlResolution, apply_auth, apply_base_url, materialize_urls, normalize_request_bodies,
    prune_empty_folders, resolve_base_url, strip_examples, synthesize_auth,
};
use crate::{ConversionOptions, Converter, Dereferencer};

/// Result of one conversion run.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub collection: Collection,
    pub diagnostics: Vec<Diagnostic>,
    pub base_url: BaseUrlResolution,
}

/// Runs the dereferencer and converter once each, then the post-conversion pipeline.
///
/// Holds no per-run state, so one instance can serve concurrent conversions.
pub struct Orchestrator<D, C> {
    dereferencer: D,
    converter: C,
    options: ConversionOptions,
    identity: IdentityConfig,
}

impl<D, C> Orchestrator<D, C> {
    pub fn converter(&self) -> &C {
        &self.converter
    }
}

impl<D: Dereferencer, C: Converter> Orchestrator<D, C> {
    pub fn new(dereferencer: D, converter: C) -> Self {
        Self {
            dereferencer,
            converter,
            options: ConversionOptions::default(),
            identity: IdentityConfig::default(),
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_identity(mut self, identity: IdentityConfig) -> Self {
        self.identity = identity;
        self
    }

    pub async fn convert(
        &self,
        schema_path: &Path,
        config: &EnvironmentConfig,
        verbose: bool,
    ) -> Result<Conversion, ConvertError> {
        let mut diagnostics = Diagnostics::new(verbose);

        diagnostics.progress("Dereferencing OpenAPI schema...");
        let document = self.dereferencer.dereference(schema_path).await?;
        diagnostics.progress("Dereferenced OpenAPI schema!");

        let normalized = normalize_request_bodies(&document);

        diagnostics.progress("Converting OpenAPI schema to Postman v2.1 collection...");
        let collection = self.converter.convert(&normalized, &self.options).await?;
        diagnostics.progress("Converted OpenAPI schema to Postman v2.1 collection!");

        let identity = self.identity.resolve(config.environment);
        let (collection, base_url) = postprocess(
            collection,
            &document.servers,
            config,
            &identity,
            &mut diagnostics,
        );

        Ok(Conversion {
            collection,
            diagnostics: diagnostics.into_entries(),
            base_url,
        })
    }
}

/// The synchronous part of the pipeline: prune, strip examples, materialize URLs,
/// install auth and resolve the base URL, in that order.
pub fn postprocess(
    collection: Collection,
    servers: &[Server],
    config: &EnvironmentConfig,
    identity: &IdentityProvider,
    diagnostics: &mut Diagnostics,
) -> (Collection, BaseUrlResolution) {
    let collection = prune_empty_folders(collection);
    let collection = strip_examples(collection);
    let collection = materialize_urls(collection);

    diagnostics.progress("Adding authentication configuration...");
    let setup = synthesize_auth(&config.auth, identity);
    let collection = apply_auth(collection, setup.as_ref());
    diagnostics.progress("Added authentication configuration!");

    diagnostics.progress("Configuring base url...");
    let resolution = resolve_base_url(
        servers,
        config.environment,
        config.custom_base_url.as_deref(),
    );
    if let Some(warning) = resolution.warning(config.environment) {
        diagnostics.warn(warning);
    }
    let collection = apply_base_url(collection, &resolution);
    diagnostics.progress("Configured base url!");

    (collection, resolution)
}
