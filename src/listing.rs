//! JSON documents read by the page templates: the home listing, the tag index and the listing
//! of each tag page.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::{error::BarErr, metadata::PostRecord, tags::TagRecord};

/// Date as shown to readers, e.g. `June 1, 2023`.
pub fn human_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PostSummary<'a> {
    pub path: &'a str,
    pub title: &'a str,
    pub date: &'a str,
    pub human_date: String,
    pub tags: &'a [Arc<str>],
    pub desc: &'a str,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'a str>,
}

impl<'a> PostSummary<'a> {
    pub fn new(post: &'a PostRecord, default_image: Option<&'a str>) -> Self {
        Self {
            path: &post.path,
            title: &post.title,
            date: &post.date,
            human_date: human_date(&post.published),
            tags: &post.tags,
            desc: &post.desc,
            image_url: post.image_url.as_deref().or(default_image),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TagSummary<'a> {
    pub tag: &'a str,
    pub count: usize,
    pub latest: &'a str,
    pub human_date: String,
    pub posts_label: String,
}

impl<'a> From<&'a TagRecord> for TagSummary<'a> {
    fn from(record: &'a TagRecord) -> Self {
        Self {
            tag: &record.tag,
            count: record.count,
            latest: &record.latest,
            human_date: human_date(&record.latest_published),
            posts_label: match record.count {
                1 => "1 post".to_string(),
                n => format!("{n} posts"),
            },
        }
    }
}

pub fn posts_document<'a, I>(posts: I, default_image: Option<&str>) -> Result<String, BarErr>
where
    I: IntoIterator<Item = &'a PostRecord>,
{
    let summaries: Vec<PostSummary> = posts
        .into_iter()
        .map(|post| PostSummary::new(post, default_image))
        .collect();
    Ok(serde_json::to_string_pretty(&summaries)?)
}

pub fn tags_document(tags: &[TagRecord]) -> Result<String, BarErr> {
    let summaries: Vec<TagSummary> = tags.iter().map(TagSummary::from).collect();
    Ok(serde_json::to_string_pretty(&summaries)?)
}
