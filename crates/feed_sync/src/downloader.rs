use std::path::Path;

use anyhow::Result;
use async_tempfile::TempFile;
use futures::TryStreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::scraper::ScrapeClient;

pub struct Downloader<'a> {
    client: &'a ScrapeClient,
}

impl<'a> Downloader<'a> {
    pub fn new(client: &'a ScrapeClient) -> Self {
        Self { client }
    }

    /// Stream a thumbnail to disk, hashing it on the way. The download goes
    /// through a temp file so a half-written image never lands at the final
    /// path. Returns the md5 of the fetched bytes.
    pub async fn fetch_thumbnail(&self, url: &str, path: &Path) -> Result<String> {
        let mut temp_file = TempFile::new().await?;
        let resp = self.client.get(url).await.send().await?.error_for_status()?;
        let mut context = md5::Context::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.try_next().await? {
            context.consume(&chunk);
            temp_file.write_all(&chunk).await?;
        }
        temp_file.flush().await?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(temp_file.file_path(), path).await?;
        // drop_async keeps the blocking file removal off the async threads
        temp_file.drop_async().await;
        Ok(format!("{:x}", context.compute()))
    }
}

/// Thumbnails are stored per video id, keeping whatever extension the remote
/// url carried and falling back to jpg.
pub fn thumbnail_file_name(video_id: i32, url: &str) -> String {
    let ext = url
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("jpg");
    format!("{}.{}", video_id, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_file_name() {
        assert_eq!(thumbnail_file_name(7, "http://example.com/thumbs/a.png"), "7.png");
        assert_eq!(thumbnail_file_name(7, "http://example.com/thumbs/a"), "7.jpg");
        assert_eq!(
            thumbnail_file_name(7, "http://example.com/thumb?id=1.weird-ext"),
            "7.jpg"
        );
    }
}
