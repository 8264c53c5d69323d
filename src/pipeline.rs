//! One build: extract every post, derive the indexes, render all feeds and listings and only
//! then write them out.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::Config,
    error::BarErr,
    feed::{FeedChannel, synthesize},
    fs::{tag_dir, write_file},
    listing::{posts_document, tags_document},
    metadata::{PostRecord, extract_all},
    posts::PostIndex,
    r#async::try_for_each,
    source::ContentSource,
    tags::{TagRecord, aggregate},
};

pub const ROOT_FEED: &str = "index.xml";
pub const POSTS_LISTING: &str = "posts.json";
pub const TAGS_LISTING: &str = "tags.json";

#[derive(Debug, PartialEq, Eq)]
pub struct BuildReport {
    pub posts: usize,
    pub tags: usize,
    pub files: usize,
}

pub struct Site {
    pub posts: PostIndex,
    pub tags: Vec<TagRecord>,
}

pub async fn index<S: ContentSource>(source: Arc<S>, extension: Arc<str>) -> Result<Site, BarErr> {
    let posts = PostIndex::new(extract_all(source, extension).await?)?;
    if posts.is_empty() {
        warn!("no posts found");
    }
    let tags = aggregate(&posts);
    info!("indexed {} posts with {} tags", posts.len(), tags.len());
    Ok(Site { posts, tags })
}

fn tag_feed_url(domain: &Url, tag: &str) -> Result<Url, BarErr> {
    let mut url = domain.join("tags/")?;
    url.path_segments_mut()
        .map_err(|_| BarErr::from(format!("{domain} can not be used as a base url")))?
        .pop_if_empty()
        .push(tag)
        .push(ROOT_FEED);
    Ok(url)
}

fn root_channel(config: &Config) -> Result<FeedChannel, BarErr> {
    Ok(FeedChannel {
        title: config.title.clone(),
        link: config.domain.clone(),
        description: config.description.clone(),
        language: config.language.clone(),
        self_url: config.feed_url(ROOT_FEED)?,
    })
}

fn tag_channel(root: &FeedChannel, config: &Config, tag: &str) -> Result<FeedChannel, BarErr> {
    Ok(FeedChannel {
        title: format!("#{tag} - {}", config.title).into(),
        self_url: tag_feed_url(&config.domain, tag)?,
        ..root.clone()
    })
}

/// Renders every document of the site in memory. Nothing touches the disk, so a failure here
/// leaves the previous output untouched.
pub fn render(
    config: &Config,
    site: &Site,
    dist_path: &Path,
) -> Result<Vec<(PathBuf, String)>, BarErr> {
    let default_image = config.default_image.as_deref();
    let root = root_channel(config)?;
    let all: Vec<&PostRecord> = site.posts.iter().collect();

    let mut documents = vec![
        (dist_path.join(ROOT_FEED), synthesize(&root, &all)?),
        (
            dist_path.join(POSTS_LISTING),
            posts_document(all.iter().copied(), default_image)?,
        ),
        (dist_path.join(TAGS_LISTING), tags_document(&site.tags)?),
    ];

    for tag in site.tags.iter() {
        let dir = tag_dir(dist_path, &tag.tag)?;
        let posts = site.posts.with_tag(&tag.tag);
        debug!("render feed for #{} with {} posts", tag.tag, posts.len());
        documents.push((
            dir.join(ROOT_FEED),
            synthesize(&tag_channel(&root, config, &tag.tag)?, &posts)?,
        ));
        documents.push((
            dir.join(POSTS_LISTING),
            posts_document(posts.iter().copied(), default_image)?,
        ));
    }

    Ok(documents)
}

pub async fn build<S: ContentSource>(
    config: &Config,
    source: Arc<S>,
    dist_path: &Path,
) -> Result<BuildReport, BarErr> {
    let site = index(source, config.extension.clone()).await?;
    let documents = render(config, &site, dist_path)?;
    let files = documents.len();

    info!("write {} files to {}", files, dist_path.display());
    try_for_each(documents, |(path, document)| async move {
        write_file(&path, document.as_bytes()).await
    })
    .await?;

    Ok(BuildReport {
        posts: site.posts.len(),
        tags: site.tags.len(),
        files,
    })
}
