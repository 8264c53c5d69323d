use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, FixedOffset, Utc};
use rss::{
    Category, ChannelBuilder, Guid, Item, ItemBuilder,
    extension::{Extension, ExtensionMap},
};
use url::Url;

use crate::{error::BarErr, metadata::PostRecord};

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
const RSS_MIME_TYPE: &str = "application/rss+xml";
const RFC1123: &str = "%a, %d %b %Y %H:%M:%S GMT";
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>"#;

/// Channel level data of a feed.
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: Arc<str>,
    /// Site root; post links are resolved below it, keeping any base path.
    pub link: Arc<Url>,
    pub description: Arc<str>,
    pub language: Arc<str>,
    /// Where the feed itself is published.
    pub self_url: Url,
}

pub fn rfc1123(date: &DateTime<FixedOffset>) -> String {
    date.with_timezone(&Utc).format(RFC1123).to_string()
}

fn to_rss_item(post: &PostRecord, origin: &Url) -> Result<Item, BarErr> {
    let url = origin.join(post.path.trim_start_matches('/'))?;
    Ok(ItemBuilder::default()
        .guid(Some(Guid {
            value: url.to_string(),
            permalink: true,
        }))
        .title(Some(post.title.to_string()))
        .description(Some(post.desc.to_string()))
        .link(Some(url.to_string()))
        .pub_date(Some(rfc1123(&post.published)))
        .categories(
            post.tags
                .iter()
                .map(|tag| Category {
                    name: tag.to_string(),
                    domain: None,
                })
                .collect::<Vec<Category>>(),
        )
        .build())
}

fn atom_self_link(self_url: &Url) -> ExtensionMap {
    let attrs = BTreeMap::from([
        ("href".to_string(), self_url.to_string()),
        ("rel".to_string(), "self".to_string()),
        ("type".to_string(), RSS_MIME_TYPE.to_string()),
    ]);
    let link = Extension {
        name: "atom:link".to_string(),
        attrs,
        ..Default::default()
    };
    BTreeMap::from([(
        "atom".to_string(),
        BTreeMap::from([("link".to_string(), vec![link])]),
    )])
}

/// Renders `posts` as an RSS 2.0 document, keeping their order. The newest post is expected
/// first: its date becomes the build date of the whole document.
pub fn synthesize(channel: &FeedChannel, posts: &[&PostRecord]) -> Result<String, BarErr> {
    let Some(newest) = posts.first() else {
        return Err(BarErr::EmptyFeed {
            feed: channel.self_url.to_string(),
        });
    };

    let items = posts
        .iter()
        .map(|post| to_rss_item(post, &channel.link))
        .collect::<Result<Vec<Item>, BarErr>>()?;

    let rss = ChannelBuilder::default()
        .title(channel.title.to_string())
        .link(channel.link.to_string())
        .description(channel.description.to_string())
        .language(Some(channel.language.to_string()))
        .last_build_date(Some(rfc1123(&newest.published)))
        .namespaces(BTreeMap::from([(
            "atom".to_string(),
            ATOM_NAMESPACE.to_string(),
        )]))
        .extensions(atom_self_link(&channel.self_url))
        .items(items)
        .build();

    Ok(with_declaration(&rss.to_string()))
}

/// Replaces the declaration written by the rss crate with one marked standalone.
fn with_declaration(doc: &str) -> String {
    let body = doc
        .strip_prefix("<?xml")
        .and_then(|rest| rest.split_once("?>"))
        .map(|(_, body)| body)
        .unwrap_or(doc);
    format!("{XML_DECLARATION}{body}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{metadata::parse_date, posts::test_support::post};

    fn channel() -> FeedChannel {
        FeedChannel {
            title: "Example".into(),
            link: Arc::new(Url::parse("https://example.com/").unwrap()),
            description: "Ramblings".into(),
            language: "en".into(),
            self_url: Url::parse("https://example.com/index.xml").unwrap(),
        }
    }

    fn parse(doc: &str) -> rss::Channel {
        rss::Channel::read_from(doc.as_bytes()).unwrap()
    }

    #[test]
    fn rfc1123_is_utc() {
        let date = parse_date("2023-06-01T10:00:00+02:00").unwrap();
        assert_eq!(rfc1123(&date), "Thu, 01 Jun 2023 08:00:00 GMT");
    }

    #[test]
    fn empty_feed_is_an_error() {
        let err = synthesize(&channel(), &[]).unwrap_err();
        assert!(matches!(err, BarErr::EmptyFeed { .. }));
    }

    #[test]
    fn renders_channel_and_items_in_order() {
        let b = post("/posts/b", "2023-06-01", &["x", "y"]);
        let a = post("/posts/a", "2023-01-01", &["x"]);
        let doc = synthesize(&channel(), &[&b, &a]).unwrap();

        assert!(doc.starts_with(XML_DECLARATION));
        assert_eq!(doc.matches("<?xml").count(), 1);
        assert!(doc.contains(&format!("xmlns:atom=\"{ATOM_NAMESPACE}\"")));
        assert!(doc.contains("href=\"https://example.com/index.xml\""));
        assert!(doc.contains("rel=\"self\""));

        let parsed = parse(&doc);
        assert_eq!(parsed.title(), "Example");
        assert_eq!(parsed.link(), "https://example.com/");
        assert_eq!(parsed.description(), "Ramblings");
        assert_eq!(parsed.language(), Some("en"));
        assert_eq!(
            parsed.last_build_date(),
            Some("Thu, 01 Jun 2023 00:00:00 GMT")
        );

        let links: Vec<&str> = parsed.items().iter().filter_map(|i| i.link()).collect();
        assert_eq!(
            links,
            vec!["https://example.com/posts/b", "https://example.com/posts/a"]
        );
        let first = &parsed.items()[0];
        assert_eq!(first.guid().unwrap().value(), "https://example.com/posts/b");
        assert_eq!(first.pub_date(), Some("Thu, 01 Jun 2023 00:00:00 GMT"));
        assert_eq!(first.categories().len(), 2);
    }

    #[test]
    fn item_links_keep_base_path() {
        let mut channel = channel();
        channel.link = Arc::new(Url::parse("https://example.com/blog/").unwrap());
        channel.self_url = Url::parse("https://example.com/blog/index.xml").unwrap();
        let a = post("/posts/a", "2023-01-01", &[]);
        let parsed = parse(&synthesize(&channel, &[&a]).unwrap());

        let item = &parsed.items()[0];
        assert_eq!(item.link(), Some("https://example.com/blog/posts/a"));
        assert_eq!(
            item.guid().unwrap().value(),
            "https://example.com/blog/posts/a"
        );
    }

    #[test]
    fn declaration_is_replaced_once() {
        assert_eq!(
            with_declaration("<?xml version=\"1.0\" encoding=\"utf-8\"?><rss/>"),
            format!("{XML_DECLARATION}<rss/>")
        );
        assert_eq!(
            with_declaration("<rss/>"),
            format!("{XML_DECLARATION}<rss/>")
        );
    }

    #[test]
    fn does_not_reorder_input() {
        let a = post("/posts/a", "2023-01-01", &[]);
        let b = post("/posts/b", "2023-06-01", &[]);
        let doc = synthesize(&channel(), &[&a, &b]).unwrap();
        let parsed = parse(&doc);
        assert_eq!(
            parsed.last_build_date(),
            Some("Sun, 01 Jan 2023 00:00:00 GMT")
        );
        assert_eq!(parsed.items()[0].link(), Some("https://example.com/posts/a"));
    }

    #[test]
    fn escapes_title_and_description() {
        let mut p = post("/posts/a", "2023-01-01", &[]);
        p.title = "A & B <C>".into();
        p.desc = "x < y && y > z".into();
        let doc = synthesize(&channel(), &[&p]).unwrap();

        assert!(doc.contains("A &amp; B &lt;C"));
        assert!(!doc.contains("A & B <C>"));

        let parsed = parse(&doc);
        assert_eq!(parsed.items()[0].title(), Some("A & B <C>"));
        assert_eq!(parsed.items()[0].description(), Some("x < y && y > z"));
    }

    #[test]
    fn same_input_same_document() {
        let a = post("/posts/a", "2023-01-01", &["x"]);
        let first = synthesize(&channel(), &[&a]).unwrap();
        let second = synthesize(&channel(), &[&a]).unwrap();
        assert_eq!(first, second);
    }
}
