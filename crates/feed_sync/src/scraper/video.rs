//! Per-video re-scrape used by the drift checker.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::{CONFIG, TEMPLATE};
use crate::error::ScrapeError;
use crate::scraper::ScrapeClient;

/// Fresh metadata for a single hosted video. All fields empty means the
/// remote host no longer knows the video.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteVideo {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
}

impl RemoteVideo {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_none() && self.tags.is_empty() && self.thumbnail_url.is_none()
    }
}

/// Ask the configured metadata endpoint about a video's website url.
/// Returns None when no endpoint is configured, and an empty RemoteVideo
/// when the host reports the video gone.
pub async fn scrape_video(client: &ScrapeClient, link: &str) -> Result<Option<RemoteVideo>, ScrapeError> {
    if CONFIG.oembed_endpoint.is_none() {
        return Ok(None);
    }
    let url = TEMPLATE
        .render("oembed", &serde_json::json!({ "link": link }))
        .map_err(|e| ScrapeError::Parse(e.to_string()))?;
    let resp = client.get(&url).await.send().await?;
    match resp.status() {
        StatusCode::NOT_FOUND | StatusCode::GONE | StatusCode::FORBIDDEN => {
            return Ok(Some(RemoteVideo::default()));
        }
        status if !status.is_success() => return Err(ScrapeError::Status(status)),
        _ => {}
    }
    Ok(Some(resp.json().await?))
}

/// Hash of the remote thumbnail bytes, used to detect thumbnail swaps that
/// keep the same url.
pub async fn thumbnail_hash(client: &ScrapeClient, url: &str) -> Result<String, ScrapeError> {
    let bytes = client.fetch_bytes(url).await?;
    Ok(format!("{:x}", md5::compute(&bytes)))
}
