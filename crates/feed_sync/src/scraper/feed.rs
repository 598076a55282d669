//! RSS 2.0 / Atom parsing into [`VideoRecord`]s.

use chrono::{DateTime, NaiveDateTime};
use reqwest::StatusCode;
use reqwest::header;
use serde::Deserialize;
use url::Url;

use crate::error::ScrapeError;
use crate::scraper::{ScrapeClient, VideoRecord};
use crate::utils::text::unescape;

/// File extensions we are willing to treat as media when an enclosure comes
/// without a MIME type.
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "avi", "mkv", "webm", "ogv", "ogg", "mp3", "flv", "wmv",
];

#[derive(Debug, Default)]
pub struct RemoteFeed {
    pub title: Option<String>,
    pub link: Option<String>,
    pub etag: Option<String>,
    pub entries: Vec<VideoRecord>,
}

pub enum FetchedFeed {
    /// The server honored `If-None-Match`; there is nothing new to import.
    NotModified,
    Fetched(RemoteFeed),
}

pub async fn fetch_feed(
    client: &ScrapeClient,
    feed_url: &str,
    etag: Option<&str>,
) -> Result<FetchedFeed, ScrapeError> {
    let mut request = client.get(feed_url).await;
    if let Some(etag) = etag {
        request = request.header(header::IF_NONE_MATCH, etag);
    }
    let resp = request.send().await?;
    if resp.status() == StatusCode::NOT_MODIFIED {
        return Ok(FetchedFeed::NotModified);
    }
    if !resp.status().is_success() {
        return Err(ScrapeError::Status(resp.status()));
    }
    let etag = resp
        .headers()
        .get(header::ETAG)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    let body = resp.text().await?;
    let mut feed = parse_feed(&body)?;
    feed.etag = etag;
    Ok(FetchedFeed::Fetched(feed))
}

/// Sniff the document root and parse either dialect. Entries come back in
/// document order, which is the order the import preserves.
pub fn parse_feed(xml: &str) -> Result<RemoteFeed, ScrapeError> {
    let head = xml.trim_start();
    if head.contains("<rss") || head.starts_with("<rdf:RDF") {
        let rss: Rss = quick_xml::de::from_str(xml)?;
        Ok(rss.into_remote_feed())
    } else if head.contains("<feed") {
        let atom: AtomFeed = quick_xml::de::from_str(xml)?;
        Ok(atom.into_remote_feed())
    } else {
        Err(ScrapeError::Parse("document is neither RSS nor Atom".into()))
    }
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DateTime::parse_from_rfc2822(text)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .map(|dt| dt.naive_utc())
        .ok()
}

/// Resolve an href that may be relative against the feed's own link.
fn resolve_url(base: Option<&str>, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    if let Some(base) = base {
        if let Ok(base) = Url::parse(base) {
            if let Ok(joined) = base.join(href) {
                return joined.to_string();
            }
        }
    }
    href.to_string()
}

#[derive(Debug, Deserialize)]
struct TextValue {
    #[serde(rename = "$text")]
    value: Option<String>,
}

impl TextValue {
    fn into_inner(self) -> Option<String> {
        self.value.filter(|v| !v.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// RSS 2.0

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    guid: Option<RssGuid>,
    description: Option<String>,
    // quick-xml's serde support matches local names, so `content:encoded`,
    // `media:thumbnail`, `media:group` and `dc:creator` arrive without their
    // prefixes
    #[serde(rename = "encoded")]
    content_encoded: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "enclosure", default)]
    enclosures: Vec<RssEnclosure>,
    #[serde(rename = "category", default)]
    categories: Vec<TextValue>,
    #[serde(rename = "thumbnail", default)]
    media_thumbnails: Vec<MediaThumbnail>,
    #[serde(rename = "group")]
    media_group: Option<MediaGroup>,
    creator: Option<String>,
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RssGuid {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RssEnclosure {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@length")]
    length: Option<String>,
    #[serde(rename = "@type")]
    mimetype: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaThumbnail {
    #[serde(rename = "@url")]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaGroup {
    #[serde(rename = "thumbnail", default)]
    thumbnails: Vec<MediaThumbnail>,
}

impl Rss {
    fn into_remote_feed(self) -> RemoteFeed {
        let base = self.channel.link.clone();
        let entries = self
            .channel
            .items
            .into_iter()
            .map(|item| item.into_record(base.as_deref()))
            .collect();
        RemoteFeed {
            title: self.channel.title,
            link: self.channel.link,
            etag: None,
            entries,
        }
    }
}

impl RssItem {
    fn into_record(self, base: Option<&str>) -> VideoRecord {
        let enclosure = pick_media_enclosure(&self.enclosures);
        let thumbnail_url = self
            .media_thumbnails
            .into_iter()
            .chain(self.media_group.into_iter().flat_map(|g| g.thumbnails))
            .find_map(|t| t.url)
            .map(|u| resolve_url(base, &u));
        let description = self
            .content_encoded
            .or(self.description)
            .filter(|d| !d.trim().is_empty());
        VideoRecord {
            guid: self.guid.and_then(|g| g.value).filter(|g| !g.is_empty()),
            title: self.title.map(|t| unescape(&t)).unwrap_or_default(),
            link: self.link.filter(|l| !l.is_empty()).map(|l| resolve_url(base, &l)),
            description,
            publish_date: self.pub_date.as_deref().and_then(parse_date),
            file_url: enclosure
                .as_ref()
                .and_then(|e| e.url.clone())
                .map(|u| resolve_url(base, &unescape(&u))),
            file_url_length: enclosure
                .as_ref()
                .and_then(|e| e.length.as_deref())
                .and_then(|l| l.parse().ok()),
            file_url_mimetype: enclosure.and_then(|e| e.mimetype),
            thumbnail_url,
            tags: self.categories.into_iter().filter_map(TextValue::into_inner).collect(),
            author: self.creator.or(self.author).filter(|a| !a.trim().is_empty()),
        }
    }
}

/// First enclosure that looks like playable media: a video/audio MIME type,
/// or a known media file extension when the type is missing.
fn pick_media_enclosure(enclosures: &[RssEnclosure]) -> Option<RssEnclosure> {
    enclosures
        .iter()
        .find(|e| {
            if let Some(mime) = &e.mimetype {
                return mime.starts_with("video/") || mime.starts_with("audio/");
            }
            e.url
                .as_deref()
                .and_then(|u| u.rsplit('.').next())
                .is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .cloned()
}

// ---------------------------------------------------------------------------
// Atom

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<TextValue>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@rel")]
    rel: Option<String>,
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@type")]
    mimetype: Option<String>,
    #[serde(rename = "@length")]
    length: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<String>,
    title: Option<TextValue>,
    summary: Option<TextValue>,
    content: Option<TextValue>,
    published: Option<String>,
    updated: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(rename = "category", default)]
    categories: Vec<AtomCategory>,
    author: Option<AtomAuthor>,
    #[serde(rename = "thumbnail", default)]
    media_thumbnails: Vec<MediaThumbnail>,
    #[serde(rename = "group")]
    media_group: Option<MediaGroup>,
}

#[derive(Debug, Deserialize)]
struct AtomCategory {
    #[serde(rename = "@term")]
    term: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: Option<String>,
}

impl AtomFeed {
    fn into_remote_feed(self) -> RemoteFeed {
        let link = pick_link(&self.links);
        let base = link.clone();
        let entries = self
            .entries
            .into_iter()
            .map(|entry| entry.into_record(base.as_deref()))
            .collect();
        RemoteFeed {
            title: self.title.and_then(TextValue::into_inner),
            link,
            etag: None,
            entries,
        }
    }
}

/// A `via` link points at the original source and wins over the alternate;
/// otherwise prefer the alternate, then any unqualified link.
fn pick_link(links: &[AtomLink]) -> Option<String> {
    for wanted in [Some("via"), Some("alternate"), None] {
        if let Some(href) = links
            .iter()
            .find(|l| l.rel.as_deref() == wanted)
            .and_then(|l| l.href.clone())
        {
            return Some(href);
        }
    }
    None
}

impl AtomEntry {
    fn into_record(self, base: Option<&str>) -> VideoRecord {
        let enclosure = self.links.iter().find(|l| l.rel.as_deref() == Some("enclosure"));
        let thumbnail_url = self
            .media_thumbnails
            .into_iter()
            .chain(self.media_group.into_iter().flat_map(|g| g.thumbnails))
            .find_map(|t| t.url)
            .map(|u| resolve_url(base, &u));
        VideoRecord {
            guid: self.id.filter(|i| !i.is_empty()),
            title: self
                .title
                .and_then(TextValue::into_inner)
                .map(|t| unescape(&t))
                .unwrap_or_default(),
            link: pick_link(&self.links).map(|l| resolve_url(base, &l)),
            description: self
                .content
                .and_then(TextValue::into_inner)
                .or(self.summary.and_then(TextValue::into_inner)),
            publish_date: self
                .published
                .as_deref()
                .or(self.updated.as_deref())
                .and_then(parse_date),
            file_url: enclosure
                .and_then(|e| e.href.clone())
                .map(|u| resolve_url(base, &u)),
            file_url_length: enclosure
                .and_then(|e| e.length.as_deref())
                .and_then(|l| l.parse().ok()),
            file_url_mimetype: enclosure.and_then(|e| e.mimetype.clone()),
            thumbnail_url,
            tags: self.categories.into_iter().filter_map(|c| c.term).collect(),
            author: self.author.and_then(|a| a.name).filter(|n| !n.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Community Channel</title>
    <link>http://example.com/videos/</link>
    <item>
      <title>Dave Glassco Interview</title>
      <link>http://example.com/file/779122</link>
      <guid isPermaLink="false">23C59362-FC55-11DC-AF3F-9C4011C4A055</guid>
      <description>&lt;p&gt;Dave is a great advocate.&lt;/p&gt;</description>
      <pubDate>Thu, 27 Mar 2008 23:25:51 +0000</pubDate>
      <enclosure url="http://example.com/get/Dave942.mp4" length="16018279" type="video/mp4"/>
      <media:thumbnail url="/thumbs/Dave959.jpg"/>
      <category>Default Category</category>
      <dc:creator>dave</dc:creator>
    </item>
    <item>
      <title>No Enclosure</title>
      <link>relative/page</link>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <title>Example Uploads</title>
  <link rel="alternate" href="http://example.org/uploads"/>
  <entry>
    <id>tag:example.org,2009:clip7981161</id>
    <title>Tishana - Pro-Choicers on Stupak</title>
    <summary>Talking about the right to choose</summary>
    <published>2009-12-04T08:23:47Z</published>
    <link rel="alternate" href="http://example.org/7981161"/>
    <link rel="enclosure" href="http://example.org/7981161.mp4" type="video/mp4" length="1024"/>
    <category term="Pro-Choice"/>
    <category term="Stupak-Pitts"/>
    <author><name>Latoya Peterson</name></author>
    <media:thumbnail url="http://example.org/7981161.jpg"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let feed = parse_feed(RSS_SAMPLE).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Community Channel"));
        assert_eq!(feed.link.as_deref(), Some("http://example.com/videos/"));
        assert_eq!(feed.entries.len(), 2);

        let entry = &feed.entries[0];
        assert_eq!(entry.guid.as_deref(), Some("23C59362-FC55-11DC-AF3F-9C4011C4A055"));
        assert_eq!(entry.title, "Dave Glassco Interview");
        assert_eq!(entry.link.as_deref(), Some("http://example.com/file/779122"));
        assert_eq!(entry.file_url.as_deref(), Some("http://example.com/get/Dave942.mp4"));
        assert_eq!(entry.file_url_length, Some(16018279));
        assert_eq!(entry.file_url_mimetype.as_deref(), Some("video/mp4"));
        assert_eq!(
            entry.thumbnail_url.as_deref(),
            Some("http://example.com/thumbs/Dave959.jpg")
        );
        assert_eq!(entry.tags, vec!["Default Category"]);
        assert_eq!(entry.author.as_deref(), Some("dave"));
        assert_eq!(
            entry.publish_date,
            NaiveDate::from_ymd_opt(2008, 3, 27).unwrap().and_hms_opt(23, 25, 51)
        );
    }

    #[test]
    fn test_parse_rss_relative_link_and_missing_enclosure() {
        let feed = parse_feed(RSS_SAMPLE).unwrap();
        let entry = &feed.entries[1];
        assert_eq!(entry.link.as_deref(), Some("http://example.com/videos/relative/page"));
        assert_eq!(entry.file_url, None);
        assert_eq!(entry.guid, None);
        // still importable via its website link
        assert!(entry.is_importable());
    }

    #[test]
    fn test_rss_namespaced_fields_survive_parsing() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Uploads</title>
    <link>http://example.com/</link>
    <item>
      <title>Grouped</title>
      <link>http://example.com/grouped</link>
      <description>plain</description>
      <content:encoded>&lt;p&gt;rich&lt;/p&gt;</content:encoded>
      <dc:creator>poster</dc:creator>
      <media:group>
        <media:thumbnail url="http://example.com/grouped.jpg"/>
      </media:group>
    </item>
  </channel>
</rss>"#;
        let feed = parse_feed(xml).unwrap();
        let entry = &feed.entries[0];
        // the rich body wins over the bare description
        assert_eq!(entry.description.as_deref(), Some("<p>rich</p>"));
        assert_eq!(entry.author.as_deref(), Some("poster"));
        assert_eq!(entry.thumbnail_url.as_deref(), Some("http://example.com/grouped.jpg"));
    }

    #[test]
    fn test_parse_atom() {
        let feed = parse_feed(ATOM_SAMPLE).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Example Uploads"));
        assert_eq!(feed.entries.len(), 1);

        let entry = &feed.entries[0];
        assert_eq!(entry.guid.as_deref(), Some("tag:example.org,2009:clip7981161"));
        assert_eq!(entry.link.as_deref(), Some("http://example.org/7981161"));
        assert_eq!(entry.file_url.as_deref(), Some("http://example.org/7981161.mp4"));
        assert_eq!(entry.file_url_length, Some(1024));
        assert_eq!(entry.tags, vec!["Pro-Choice", "Stupak-Pitts"]);
        assert_eq!(entry.author.as_deref(), Some("Latoya Peterson"));
        assert_eq!(
            entry.publish_date,
            NaiveDate::from_ymd_opt(2009, 12, 4).unwrap().and_hms_opt(8, 23, 47)
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_feed("<html></html>").is_err());
        assert!(parse_feed("not xml at all").is_err());
    }

    #[test]
    fn test_enclosure_without_mime_type() {
        let encs = vec![RssEnclosure {
            url: Some("http://example.com/movie.MP4".into()),
            length: None,
            mimetype: None,
        }];
        assert!(pick_media_enclosure(&encs).is_some());
        let encs = vec![RssEnclosure {
            url: Some("http://example.com/page.html".into()),
            length: None,
            mimetype: None,
        }];
        assert!(pick_media_enclosure(&encs).is_none());
    }
}
