//! Search sources poll every configured provider and merge the results.

use crate::config::{CONFIG, TEMPLATE, search_template_key};
use crate::error::ScrapeError;
use crate::scraper::feed::{FetchedFeed, fetch_feed};
use crate::scraper::{ScrapeClient, VideoRecord};

/// Run a query against every configured provider. Providers are queried in
/// name order and their results interleaved round-robin, so one prolific
/// provider cannot crowd the others out of the import.
pub async fn fetch_search(client: &ScrapeClient, query: &str) -> Result<Vec<VideoRecord>, ScrapeError> {
    let mut per_provider = Vec::with_capacity(CONFIG.search_providers.len());
    for name in CONFIG.search_providers.keys() {
        let url = TEMPLATE
            .render(&search_template_key(name), &serde_json::json!({ "query": query }))
            .map_err(|e| ScrapeError::Parse(e.to_string()))?;
        match fetch_feed(client, &url, None).await? {
            FetchedFeed::Fetched(feed) => per_provider.push(feed.entries),
            FetchedFeed::NotModified => per_provider.push(Vec::new()),
        }
    }
    Ok(intersperse(per_provider))
}

fn intersperse(mut lists: Vec<Vec<VideoRecord>>) -> Vec<VideoRecord> {
    let total = lists.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);
    let mut iters: Vec<_> = lists.drain(..).map(Vec::into_iter).collect();
    while merged.len() < total {
        for iter in &mut iters {
            if let Some(record) = iter.next() {
                merged.push(record);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> VideoRecord {
        VideoRecord {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_intersperse_round_robin() {
        let merged = intersperse(vec![
            vec![record("a1"), record("a2"), record("a3")],
            vec![record("b1")],
            vec![record("c1"), record("c2")],
        ]);
        let titles: Vec<_> = merged.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "b1", "c1", "a2", "c2", "a3"]);
    }

    #[test]
    fn test_intersperse_empty() {
        assert!(intersperse(Vec::new()).is_empty());
        assert!(intersperse(vec![Vec::new(), Vec::new()]).is_empty());
    }
}
