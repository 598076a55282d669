pub mod feed;
pub mod search;
pub mod video;

use std::time::Duration;

use chrono::NaiveDateTime;
use leaky_bucket::RateLimiter;
use reqwest::header;

use crate::config::{CONFIG, RateLimit};
use crate::error::ScrapeError;

/// The uniform record shape every source is scraped into, whether it came
/// from an RSS/Atom feed or a search provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoRecord {
    pub guid: Option<String>,
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    pub publish_date: Option<NaiveDateTime>,
    pub file_url: Option<String>,
    pub file_url_length: Option<i64>,
    pub file_url_mimetype: Option<String>,
    pub thumbnail_url: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
}

impl VideoRecord {
    /// Identity key used for deduplication: GUID preferred, canonical link
    /// as the fallback. Records with neither cannot be deduplicated.
    pub fn identity(&self) -> Option<RecordKey<'_>> {
        if let Some(guid) = self.guid.as_deref().filter(|g| !g.is_empty()) {
            return Some(RecordKey::Guid(guid));
        }
        self.link
            .as_deref()
            .filter(|l| !l.is_empty())
            .map(RecordKey::Link)
    }

    /// A record that carries neither a playable file nor a website link has
    /// nothing for us to show; the import counts it as an error and moves on.
    pub fn is_importable(&self) -> bool {
        self.file_url.is_some() || self.link.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey<'a> {
    Guid(&'a str),
    Link(&'a str),
}

// A thin wrapper over reqwest::Client with the default headers every remote
// fetch wants, plus an optional rate limiter so polling stays polite.
pub struct ScrapeClient {
    pub client: reqwest::Client,
    limiter: Option<RateLimiter>,
}

impl ScrapeClient {
    pub fn new() -> Self {
        Self::with_rate_limit(CONFIG.concurrent_limit.rate_limit.as_ref())
    }

    pub fn with_rate_limit(rate_limit: Option<&RateLimit>) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("feed-sync/", env!("CARGO_PKG_VERSION"))),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .gzip(true)
            .connect_timeout(Duration::from_secs(10))
            .read_timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build reqwest client");
        let limiter = rate_limit.map(|RateLimit { limit, duration }| {
            RateLimiter::builder()
                .initial(*limit)
                .refill(*limit)
                .max(*limit)
                .interval(Duration::from_millis(*duration))
                .build()
        });
        Self { client, limiter }
    }

    /// Get a prebuilt request; waits on the rate limiter first when one is
    /// configured.
    pub async fn get(&self, url: &str) -> reqwest::RequestBuilder {
        if let Some(limiter) = &self.limiter {
            limiter.acquire_one().await;
        }
        self.client.get(url)
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let resp = self.get(url).await.send().await?;
        if !resp.status().is_success() {
            return Err(ScrapeError::Status(resp.status()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

impl Default for ScrapeClient {
    fn default() -> Self {
        Self::new()
    }
}
