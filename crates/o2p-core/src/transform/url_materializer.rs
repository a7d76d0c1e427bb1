use crate::collection::{Collection, RequestItem, Url};

use super::map_requests;

/// Fill `url.raw` of every request from its host, path and query parts.
pub fn materialize_urls(mut collection: Collection) -> Collection {
    collection.item = map_requests(collection.item, &mut materialize_request);
    collection
}

pub fn materialize_request(mut item: RequestItem) -> RequestItem {
    item.request.url.raw = Some(raw_url(&item.request.url));
    item
}

/// `host.joined.by.dots/path/joined/by/slashes?key=value&key=value`
pub fn raw_url(url: &Url) -> String {
    let mut raw = url.host.join(".");
    raw.push('/');
    raw.push_str(&url.path.join("/"));
    if !url.query.is_empty() {
        let query: Vec<String> = url
            .query
            .iter()
            .map(|q| format!("{}={}", q.key, q.value.as_deref().unwrap_or_default()))
            .collect();
        raw.push('?');
        raw.push_str(&query.join("&"));
    }
    raw
}
