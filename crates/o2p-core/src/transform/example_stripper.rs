use crate::collection::{Collection, RequestItem};

use super::map_requests;

/// Clear the generated example responses of every request in the tree.
pub fn strip_examples(mut collection: Collection) -> Collection {
    collection.item = map_requests(collection.item, &mut strip_request);
    collection
}

pub fn strip_request(mut item: RequestItem) -> RequestItem {
    item.response.clear();
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionNode;
    use crate::transform::fixtures::collection;

    fn shape(nodes: &[CollectionNode]) -> Vec<(String, usize)> {
        nodes
            .iter()
            .map(|node| match node {
                CollectionNode::Folder(f) => (f.name.clone(), f.item.len()),
                CollectionNode::Request(r) => (r.name.clone(), 0),
            })
            .collect()
    }

    #[test]
    fn test_every_request_has_no_responses() {
        let input = collection();
        assert!(input.requests().iter().all(|r| !r.response.is_empty()));

        let stripped = strip_examples(input);
        assert_eq!(stripped.requests().len(), 3);
        assert!(stripped.requests().iter().all(|r| r.response.is_empty()));
    }

    #[test]
    fn test_folder_shape_is_unchanged() {
        let input = collection();
        let stripped = strip_examples(input.clone());
        assert_eq!(shape(&stripped.item), shape(&input.item));
        match (&stripped.item[0], &input.item[0]) {
            (CollectionNode::Folder(a), CollectionNode::Folder(b)) => {
                assert_eq!(shape(&a.item), shape(&b.item));
            }
            _ => panic!("expected folders"),
        }
    }
}
