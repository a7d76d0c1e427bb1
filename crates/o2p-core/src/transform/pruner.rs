use crate::collection::{Collection, CollectionNode};

/// Remove top-level folders that ended up without any item.
///
/// Only the first level is pruned; an empty folder nested inside another
/// folder is kept.
pub fn prune_empty_folders(mut collection: Collection) -> Collection {
    let before = collection.item.len();
    collection
        .item
        .retain(|node| !matches!(node, CollectionNode::Folder(folder) if folder.item.is_empty()));
    let removed = before - collection.item.len();
    if removed > 0 {
        log::debug!("pruned {removed} empty top-level folder(s)");
    }
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::fixtures::{collection, folder};

    #[test]
    fn test_empty_top_level_folder_is_removed() {
        let pruned = prune_empty_folders(collection());
        let names: Vec<&str> = pruned.item.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["Events", "Health"]);
    }

    #[test]
    fn test_pruning_is_idempotent() {
        let once = prune_empty_folders(collection());
        let twice = prune_empty_folders(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nested_empty_folder_is_kept() {
        let mut input = collection();
        input.item = vec![folder("Outer", vec![folder("Inner", vec![])])];
        let pruned = prune_empty_folders(input.clone());
        assert_eq!(pruned, input);
    }
}
