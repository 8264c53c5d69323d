use std::{cmp::Ordering, collections::HashSet};

use crate::{error::BarErr, metadata::PostRecord};

/// Every post of the site, most recent first. Posts published at the same instant are ordered
/// by path so the order is the same on every build.
pub struct PostIndex {
    posts: Vec<PostRecord>,
}

fn recency(a: &PostRecord, b: &PostRecord) -> Ordering {
    b.published
        .cmp(&a.published)
        .then_with(|| a.path.cmp(&b.path))
}

impl PostIndex {
    pub fn new(mut posts: Vec<PostRecord>) -> Result<Self, BarErr> {
        posts.sort_by(recency);

        let mut seen = HashSet::with_capacity(posts.len());
        for post in posts.iter() {
            if !seen.insert(post.path.as_ref()) {
                return Err(BarErr::extraction(
                    post.path.as_ref(),
                    "more than one content item resolves to this path",
                ));
            }
        }

        Ok(Self { posts })
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostRecord> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn with_tag(&self, tag: &str) -> Vec<&PostRecord> {
        self.posts.iter().filter(|post| post.has_tag(tag)).collect()
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{test_support::post, *};

    fn paths(index: &PostIndex) -> Vec<&str> {
        index.iter().map(|p| p.path.as_ref()).collect()
    }

    #[test]
    fn sorts_most_recent_first() {
        let index = PostIndex::new(vec![
            post("/posts/a", "2023-01-01", &["x"]),
            post("/posts/b", "2023-06-01", &["x", "y"]),
        ])
        .unwrap();
        assert_eq!(paths(&index), vec!["/posts/b", "/posts/a"]);
    }

    #[test]
    fn adjacent_posts_are_ordered() {
        let index = PostIndex::new(vec![
            post("/posts/c", "2021-3-9", &[]),
            post("/posts/a", "2021-10-01", &[]),
            post("/posts/d", "2022-01-01T08:00:00+05:00", &[]),
            post("/posts/b", "2021-12-31", &[]),
        ])
        .unwrap();
        let ordered: Vec<&PostRecord> = index.iter().collect();
        for pair in ordered.windows(2) {
            assert!(pair[0].published >= pair[1].published);
        }
        assert_eq!(
            paths(&index),
            vec!["/posts/d", "/posts/b", "/posts/a", "/posts/c"]
        );
    }

    #[test]
    fn equal_dates_are_ordered_by_path() {
        let forward = PostIndex::new(vec![
            post("/posts/b", "2023-01-01", &[]),
            post("/posts/a", "2023-01-01", &[]),
            post("/posts/c", "2023-01-01", &[]),
        ])
        .unwrap();
        let backward = PostIndex::new(vec![
            post("/posts/c", "2023-01-01", &[]),
            post("/posts/a", "2023-01-01", &[]),
            post("/posts/b", "2023-01-01", &[]),
        ])
        .unwrap();
        assert_eq!(paths(&forward), vec!["/posts/a", "/posts/b", "/posts/c"]);
        assert_eq!(paths(&forward), paths(&backward));
    }

    #[test]
    fn rejects_duplicate_paths() {
        let result = PostIndex::new(vec![
            post("/posts/a", "2023-01-01", &[]),
            post("/posts/a", "2023-02-01", &[]),
        ]);
        assert!(matches!(result, Err(BarErr::Extraction { .. })));
    }

    #[test]
    fn tag_filter_keeps_index_order() {
        let index = PostIndex::new(vec![
            post("/posts/a", "2023-01-01", &["x"]),
            post("/posts/b", "2023-06-01", &["x", "y"]),
            post("/posts/c", "2023-03-01", &[]),
        ])
        .unwrap();
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());

        let x: Vec<&str> = index.with_tag("x").iter().map(|p| p.path.as_ref()).collect();
        assert_eq!(x, vec!["/posts/b", "/posts/a"]);
        assert!(index.with_tag("X").is_empty());
    }
}
