use indexmap::IndexMap;
use o2p_core::FolderStrategy;
use o2p_core::collection::{CollectionNode, Folder};
use o2p_core::parse::spec::ApiDocument;

use crate::request::build_request;

/// Folder name used for paths without a literal first segment, e.g. `/` or `/{id}`.
const DEFAULT_FOLDER: &str = "default";

/// Build the collection tree for every operation in `document`.
pub fn build_items(document: &ApiDocument, strategy: FolderStrategy) -> Vec<CollectionNode> {
    match strategy {
        FolderStrategy::Tags => group_by_tag(document),
        FolderStrategy::Paths => group_by_path(document),
    }
}

/// One folder per declared tag (kept even when empty), then one per undeclared
/// first tag. Untagged operations stay at the root after the folders.
fn group_by_tag(document: &ApiDocument) -> Vec<CollectionNode> {
    let mut folders: IndexMap<String, Folder> = document
        .tags
        .iter()
        .map(|tag| {
            (
                tag.name.clone(),
                Folder {
                    name: tag.name.clone(),
                    description: tag.description.clone(),
                    item: Vec::new(),
                },
            )
        })
        .collect();
    let mut root = Vec::new();

    for (path, item) in &document.paths {
        for (method, operation) in item.operations() {
            let node = CollectionNode::Request(build_request(path, method, item, operation));
            match operation.tags.first() {
                Some(tag) => folders
                    .entry(tag.clone())
                    .or_insert_with(|| Folder {
                        name: tag.clone(),
                        description: None,
                        item: Vec::new(),
                    })
                    .item
                    .push(node),
                None => root.push(node),
            }
        }
    }

    folders
        .into_values()
        .map(CollectionNode::Folder)
        .chain(root)
        .collect()
}

/// One folder per first literal path segment.
fn group_by_path(document: &ApiDocument) -> Vec<CollectionNode> {
    let mut folders: IndexMap<String, Vec<CollectionNode>> = IndexMap::new();

    for (path, item) in &document.paths {
        for (method, operation) in item.operations() {
            let node = CollectionNode::Request(build_request(path, method, item, operation));
            folders.entry(extract_path_prefix(path)).or_default().push(node);
        }
    }

    folders
        .into_iter()
        .map(|(name, item)| {
            CollectionNode::Folder(Folder {
                name,
                description: None,
                item,
            })
        })
        .collect()
}

/// Extract the first literal path segment as a folder name.
/// e.g. "/events/{eventId}" → "events", "/places/search" → "places"
fn extract_path_prefix(path: &str) -> String {
    path.split('/')
        .find(|s| !s.is_empty() && !s.starts_with('{'))
        .unwrap_or(DEFAULT_FOLDER)
        .to_string()
}

/// Replace every folder holding exactly one node with that node, at any depth.
pub fn collapse_folders(nodes: Vec<CollectionNode>) -> Vec<CollectionNode> {
    nodes
        .into_iter()
        .map(|node| match node {
            CollectionNode::Folder(mut folder) => {
                folder.item = collapse_folders(folder.item);
                if folder.item.len() == 1 {
                    folder.item.remove(0)
                } else {
                    CollectionNode::Folder(folder)
                }
            }
            request => request,
        })
        .collect()
}
