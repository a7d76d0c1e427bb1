pub mod auth_synthesizer;
pub mod base_url_resolver;
pub mod example_stripper;
pub mod pruner;
pub mod schema_normalizer;
pub mod url_materializer;

pub use auth_synthesizer::{AuthPlacement, AuthSetup, apply_auth, synthesize_auth};
pub use base_url_resolver::{
    BASE_URL_VAR, BaseUrlResolution, BaseUrlSource, apply_base_url, resolve_base_url,
};
pub use example_stripper::strip_examples;
pub use pruner::prune_empty_folders;
pub use schema_normalizer::{normalize_request_bodies, normalize_schema};
pub use url_materializer::{materialize_urls, raw_url};

use crate::collection::{CollectionNode, RequestItem};

/// Rebuild a node list depth-first, passing every request through `f`.
/// Folder shape and order are preserved.
pub(crate) fn map_requests<F>(nodes: Vec<CollectionNode>, f: &mut F) -> Vec<CollectionNode>
where
    F: FnMut(RequestItem) -> RequestItem,
{
    nodes
        .into_iter()
        .map(|node| match node {
            CollectionNode::Folder(mut folder) => {
                folder.item = map_requests(folder.item, f);
                CollectionNode::Folder(folder)
            }
            CollectionNode::Request(request) => CollectionNode::Request(f(request)),
        })
        .collect()
}
