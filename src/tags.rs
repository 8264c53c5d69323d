use std::{
    collections::{HashMap, HashSet, hash_map::Entry},
    sync::Arc,
};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::posts::PostIndex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub tag: Arc<str>,
    pub count: usize,
    /// Date of the newest post with this tag, as it was authored.
    pub latest: Arc<str>,
    #[serde(skip)]
    pub latest_published: DateTime<FixedOffset>,
}

/// Counts posts per tag and remembers the newest one. Ordered by count, then by recency, then
/// by name.
pub fn aggregate(index: &PostIndex) -> Vec<TagRecord> {
    let mut tags: HashMap<Arc<str>, TagRecord> = HashMap::new();

    for post in index.iter() {
        let mut seen: HashSet<&str> = HashSet::with_capacity(post.tags.len());
        for tag in post.tags.iter() {
            if !seen.insert(tag.as_ref()) {
                continue;
            }
            match tags.entry(tag.clone()) {
                Entry::Vacant(e) => {
                    e.insert(TagRecord {
                        tag: tag.clone(),
                        count: 1,
                        latest: post.date.clone(),
                        latest_published: post.published,
                    });
                }
                Entry::Occupied(mut e) => {
                    let record = e.get_mut();
                    record.count += 1;
                    if post.published > record.latest_published {
                        record.latest = post.date.clone();
                        record.latest_published = post.published;
                    }
                }
            }
        }
    }

    let mut records: Vec<TagRecord> = tags.into_values().collect();
    records.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.latest_published.cmp(&a.latest_published))
            .then_with(|| a.tag.cmp(&b.tag))
    });
    records
}
