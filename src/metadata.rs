use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::BarErr,
    r#async::try_map,
    source::{ContentSource, ItemId, RawMetadata},
};

const POSTS_PREFIX: &str = "/posts/";

const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, PartialEq, Serialize, Clone, Eq)]
pub struct PostRecord {
    pub path: Arc<str>,
    pub title: Arc<str>,
    pub date: Arc<str>,
    #[serde(skip)]
    pub published: DateTime<FixedOffset>,
    pub tags: Vec<Arc<str>>,
    pub desc: Arc<str>,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Arc<str>>,
}

impl PostRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.as_ref() == tag)
    }
}

/// Normalises an authored date. Plain dates and naive date-times are taken as UTC.
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>, String> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date);
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset());
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Ok(date);
    }
    Err(format!("date {value:?} can not be parsed"))
}

/// Item name without the content file suffix. Bundles keep their directory name.
pub fn stem<'a>(id: &'a ItemId, extension: &str) -> &'a str {
    if id.is_bundle() {
        return id.as_str();
    }
    id.as_str()
        .strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(id.as_str())
}

pub fn extract(id: &ItemId, raw: RawMetadata, extension: &str) -> Result<PostRecord, BarErr> {
    let title = raw
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| BarErr::extraction(id.as_str(), "missing required field `title`"))?;
    let date = raw
        .date
        .map(|date| date.trim().to_string())
        .filter(|date| !date.is_empty())
        .ok_or_else(|| BarErr::extraction(id.as_str(), "missing required field `date`"))?;
    let published = parse_date(&date).map_err(|reason| BarErr::extraction(id.as_str(), reason))?;

    Ok(PostRecord {
        path: format!("{POSTS_PREFIX}{}", stem(id, extension)).into(),
        title: title.into(),
        date: date.into(),
        published,
        tags: raw.tags.into_iter().map(Arc::from).collect(),
        desc: raw.desc.into(),
        image_url: raw.image_url.filter(|url| !url.is_empty()).map(Arc::from),
    })
}

/// Loads and validates every item of `source`. Items are processed concurrently; the result
/// keeps the order in which the source listed them.
pub async fn extract_all<S: ContentSource>(
    source: Arc<S>,
    extension: Arc<str>,
) -> Result<Vec<PostRecord>, BarErr> {
    let ids = source.list().await?;
    info!("extract metadata from {} items", ids.len());
    try_map(ids, move |id: ItemId| {
        let source = source.clone();
        let extension = extension.clone();
        async move {
            let raw = source.load(&id).await?;
            let record = extract(&id, raw, &extension)?;
            debug!("extracted {} from {}", record.path, id);
            Ok(record)
        }
    })
    .await
}
