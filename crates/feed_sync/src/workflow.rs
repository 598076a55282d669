use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use feed_sync_entity::*;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use sea_orm::ActiveValue::Set;
use sea_orm::Unchanged;
use sea_orm::entity::prelude::*;
use tokio::sync::Semaphore;

use crate::adapter::{FetchedRecords, VideoSource, VideoSourceEnum, fetch_records};
use crate::config::{ARGS, CONFIG};
use crate::downloader::{Downloader, thumbnail_file_name};
use crate::error::ScrapeError;
use crate::notifier::NotifierAllExt;
use crate::original::apply_remote_state;
use crate::scraper::video::{scrape_video, thumbnail_hash};
use crate::scraper::{RecordKey, ScrapeClient, VideoRecord};
use crate::utils::model::{
    approve_import_videos, create_source_import, create_video, delete_import_videos, fail_import, find_video_by_guid,
    find_video_by_link, finish_import, update_import_total,
};

/// Poll every enabled source, a few at a time; a failing source is logged
/// and the rest of the pass keeps going.
pub async fn process_sources(sources: &[VideoSourceEnum], client: &ScrapeClient, connection: &DatabaseConnection) {
    let semaphore = Semaphore::new(CONFIG.concurrent_limit.source);
    let mut tasks = sources
        .iter()
        .map(|source| process_one_source(source, &semaphore, client, connection))
        .collect::<FuturesUnordered<_>>();
    while let Some((source, result)) = tasks.next().await {
        if let Err(e) = result {
            error!("processing {} failed: {e:#}", source.display_name());
        }
    }
}

async fn process_one_source<'a>(
    source: &'a VideoSourceEnum,
    semaphore: &Semaphore,
    client: &ScrapeClient,
    connection: &DatabaseConnection,
) -> (&'a VideoSourceEnum, Result<()>) {
    let result = match semaphore.acquire().await {
        Ok(_permit) => process_video_source(source, client, connection).await,
        Err(e) => Err(anyhow::anyhow!("semaphore closed: {e}")),
    };
    (source, result)
}

/// Poll one source end to end: fetch, dedup, approve, snapshot, thumbnails.
pub async fn process_video_source(
    video_source: &VideoSourceEnum,
    client: &ScrapeClient,
    connection: &DatabaseConnection,
) -> Result<()> {
    video_source.log_refresh_start();
    let import = create_source_import(video_source, None, connection).await?;
    let fetched = match fetch_records(video_source, client).await {
        Ok(fetched) => fetched,
        Err(e) => {
            fail_import(&import, &e.to_string(), connection).await?;
            notify_failure(client, &format!("fetching {} failed: {e}", video_source.display_name())).await;
            return Err(e).with_context(|| format!("fetching {} failed", video_source.display_name()));
        }
    };
    run_fetched(video_source, &import, fetched, client, connection).await
}

/// Drive one fetch result through import, approval, snapshots and
/// thumbnails. A `NotModified` fetch completes the run immediately with zero
/// counts.
async fn run_fetched(
    video_source: &VideoSourceEnum,
    import: &source_import::Model,
    fetched: FetchedRecords,
    client: &ScrapeClient,
    connection: &DatabaseConnection,
) -> Result<()> {
    let (entries, etag) = match fetched {
        FetchedRecords::NotModified => {
            info!("{} is unchanged, nothing to import", video_source.display_name());
            finish_import(import, 0, 0, 0, connection).await?;
            return Ok(());
        }
        FetchedRecords::Records { entries, etag } => (entries, etag),
    };
    update_import_total(import, entries.len() as i32, connection).await?;
    let records = entries.into_iter().map(Ok).collect();
    let (imported, skipped, errored) = match run_import(video_source, import, records, connection).await {
        Ok(counts) => counts,
        Err(e) => {
            notify_failure(
                client,
                &format!("import of {} failed and was rolled back: {e:#}", video_source.display_name()),
            )
            .await;
            return Err(e);
        }
    };
    video_source
        .after_update(etag, Utc::now().naive_utc())
        .save(connection)
        .await?;
    snapshot_originals(import.id, connection).await?;
    if ARGS.scan_only {
        warn!("scan-only mode, skipping thumbnail downloads...");
    } else {
        fetch_thumbnails(import.id, client, connection).await?;
    }
    video_source.log_refresh_end(imported, skipped, errored);
    Ok(())
}

/// A notifier that cannot deliver must not eat the error it was reporting.
async fn notify_failure(client: &ScrapeClient, message: &str) {
    if let Err(e) = CONFIG.notifiers.notify_all(&client.client, message).await {
        warn!("sending failure notification failed: {e:#}");
    }
}

/// The all-or-nothing core of a run. Any error rolls back every row the run
/// created and marks the import failed; success hands the new videos to the
/// approval pass.
pub async fn run_import(
    video_source: &VideoSourceEnum,
    import: &source_import::Model,
    records: Vec<Result<VideoRecord, ScrapeError>>,
    connection: &DatabaseConnection,
) -> Result<(i32, i32, i32)> {
    match update_source(video_source, import, &records, connection).await {
        Ok((imported, skipped, errored)) => {
            let (approved, unapproved) = approve_import_videos(import, CONFIG.video_limit, connection).await?;
            debug!(
                "{}: approved {} videos, queued {}",
                video_source.display_name(),
                approved,
                unapproved
            );
            finish_import(import, imported, skipped, errored, connection).await?;
            Ok((imported, skipped, errored))
        }
        Err(e) => {
            let deleted = delete_import_videos(import.id, connection).await?;
            fail_import(import, &e.to_string(), connection).await?;
            warn!(
                "import of {} failed, rolled back {} videos: {e:#}",
                video_source.display_name(),
                deleted
            );
            Err(e)
        }
    }
}

/// Walk the scraped records in feed order, skipping anything already known.
/// Dedup happens per guid first (scoped to the source) and per website link
/// second (site-wide), with duplicates inside the batch caught along the way.
async fn update_source(
    video_source: &VideoSourceEnum,
    import: &source_import::Model,
    records: &[Result<VideoRecord, ScrapeError>],
    connection: &DatabaseConnection,
) -> Result<(i32, i32, i32)> {
    let mut seen = HashSet::new();
    let (mut imported, mut skipped, mut errored) = (0, 0, 0);
    for record in records {
        let record = match record {
            Ok(record) => record,
            Err(e) => bail!("scrape failed mid-import: {e}"),
        };
        if !record.is_importable() {
            errored += 1;
            continue;
        }
        if let Some(key) = record.identity() {
            if !seen.insert(key) {
                skipped += 1;
                continue;
            }
            let existing = match key {
                RecordKey::Guid(guid) => match find_video_by_guid(video_source, guid, connection).await? {
                    Some(video_model) => Some(video_model),
                    None => match record.link.as_deref() {
                        Some(link) => find_video_by_link(link, connection).await?,
                        None => None,
                    },
                },
                RecordKey::Link(link) => find_video_by_link(link, connection).await?,
            };
            if existing.is_some() {
                skipped += 1;
                continue;
            }
        }
        create_video(record, video_source, import, imported, connection).await?;
        imported += 1;
    }
    Ok((imported, skipped, errored))
}

/// Record what each freshly imported video looked like at import time; the
/// drift checker diffs against these snapshots later.
pub async fn snapshot_originals(import_id: i32, connection: &DatabaseConnection) -> Result<()> {
    let videos = video::Entity::find()
        .filter(
            video::Column::ImportId
                .eq(import_id)
                .and(video::Column::WebsiteUrl.is_not_null()),
        )
        .all(connection)
        .await?;
    let now = Utc::now().naive_utc();
    for video_model in videos {
        let exists = original_video::Entity::find()
            .filter(original_video::Column::VideoId.eq(video_model.id))
            .one(connection)
            .await?
            .is_some();
        if exists {
            continue;
        }
        original_video::ActiveModel {
            video_id: Set(video_model.id),
            name: Set(video_model.name),
            description: Set(video_model.description),
            tags: Set(video_model.tags),
            thumbnail_url: Set(video_model.thumbnail_url),
            remote_video_was_deleted: Set(original_video::REMOTE_ALIVE),
            last_checked: Set(now),
            ..Default::default()
        }
        .insert(connection)
        .await?;
    }
    Ok(())
}

/// Download the thumbnails a run brought in, a few at a time.
pub async fn fetch_thumbnails(import_id: i32, client: &ScrapeClient, connection: &DatabaseConnection) -> Result<()> {
    let videos = video::Entity::find()
        .filter(
            video::Column::ImportId
                .eq(import_id)
                .and(video::Column::ThumbnailUrl.is_not_null()),
        )
        .all(connection)
        .await?;
    let semaphore = Semaphore::new(CONFIG.concurrent_limit.thumbnail);
    let downloader = Downloader::new(client);
    let mut tasks = videos
        .iter()
        .map(|video_model| download_one_thumbnail(video_model, &semaphore, &downloader))
        .collect::<FuturesUnordered<_>>();
    while let Some(res) = tasks.next().await {
        match res {
            Ok((video_id, path, hash)) => {
                store_thumbnail(video_id, path, hash, connection).await?;
            }
            Err(e) => {
                warn!("thumbnail download failed: {e:#}");
            }
        }
    }
    Ok(())
}

async fn download_one_thumbnail(
    video_model: &video::Model,
    semaphore: &Semaphore,
    downloader: &Downloader<'_>,
) -> Result<(i32, String, String)> {
    let _permit = semaphore.acquire().await.context("semaphore closed")?;
    let url = video_model
        .thumbnail_url
        .as_deref()
        .context("video has no thumbnail url")?;
    let path = CONFIG.thumbnail_path.join(thumbnail_file_name(video_model.id, url));
    let hash = downloader
        .fetch_thumbnail(url, &path)
        .await
        .with_context(|| format!("fetching thumbnail for video {} failed", video_model.id))?;
    Ok((video_model.id, path.to_string_lossy().to_string(), hash))
}

async fn store_thumbnail(video_id: i32, path: String, hash: String, connection: &DatabaseConnection) -> Result<()> {
    video::ActiveModel {
        id: Unchanged(video_id),
        thumbnail_path: Set(Some(path)),
        ..Default::default()
    }
    .update(connection)
    .await?;
    if let Some(original_model) = original_video::Entity::find()
        .filter(original_video::Column::VideoId.eq(video_id))
        .one(connection)
        .await?
    {
        original_video::ActiveModel {
            id: Unchanged(original_model.id),
            remote_thumbnail_hash: Set(Some(hash)),
            ..Default::default()
        }
        .update(connection)
        .await?;
    }
    Ok(())
}

/// Rejected videos are out of the pool; everything else, the moderation
/// queue included, keeps tracking its host.
fn tracks_remote(video_model: &video::Model) -> bool {
    video_model.status != video::VideoStatus::Rejected && video_model.website_url.is_some()
}

/// Re-scrape every non-rejected video against its host and fold the results
/// into the local rows. Network errors on a single video are treated as
/// "no news" rather than failing the pass.
pub async fn refresh_originals(client: &ScrapeClient, connection: &DatabaseConnection) -> Result<()> {
    if CONFIG.oembed_endpoint.is_none() {
        return Ok(());
    }
    let pairs = original_video::Entity::find()
        .find_also_related(video::Entity)
        .all(connection)
        .await?;
    let mut notifications = Vec::new();
    for (original_model, video_model) in pairs {
        let Some(video_model) = video_model else {
            continue;
        };
        if !tracks_remote(&video_model) {
            continue;
        }
        let Some(link) = video_model.website_url.as_deref() else {
            continue;
        };
        let remote = match scrape_video(client, link).await {
            Ok(Some(remote)) => remote,
            Ok(None) => return Ok(()),
            Err(e) if e.is_network() => {
                // a flaky host is not a deleted video
                debug!("scraping video {} failed, assuming no changes: {e}", video_model.id);
                continue;
            }
            Err(e) => {
                warn!("scraping video {} returned garbage: {e}", video_model.id);
                continue;
            }
        };
        // bytes are only worth comparing while the url itself is unchanged
        let remote_hash = match (original_model.thumbnail_url.as_deref(), remote.thumbnail_url.as_deref()) {
            (Some(old), Some(new)) if old == new => thumbnail_hash(client, new).await.ok(),
            _ => None,
        };
        let outcome = apply_remote_state(&video_model, &original_model, &remote, remote_hash.as_deref(), connection).await?;
        if outcome.refresh_thumbnail && !ARGS.scan_only {
            if let Some(url) = remote.thumbnail_url.as_deref() {
                let downloader = Downloader::new(client);
                let path = CONFIG.thumbnail_path.join(thumbnail_file_name(video_model.id, url));
                match downloader.fetch_thumbnail(url, &path).await {
                    Ok(hash) => store_thumbnail(video_model.id, path.to_string_lossy().to_string(), hash, connection).await?,
                    Err(e) => warn!("refreshing thumbnail for video {} failed: {e:#}", video_model.id),
                }
            }
        }
        if let Some(message) = outcome.notification {
            info!("{}", message);
            notifications.push(message);
        }
    }
    if !notifications.is_empty() {
        CONFIG.notifiers.notify_all(&client.client, &notifications.join("\n")).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use feed_sync_migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, QueryOrder};

    use super::*;

    async fn memory_db() -> DatabaseConnection {
        let connection = Database::connect("sqlite::memory:").await.expect("connect failed");
        Migrator::up(&connection, None).await.expect("migrate failed");
        connection
    }

    async fn seed_feed(connection: &DatabaseConnection, feed_url: &str, auto_approve: bool) -> VideoSourceEnum {
        feed::ActiveModel {
            feed_url: Set(feed_url.to_string()),
            name: Set("test feed".to_string()),
            description: Set(String::new()),
            status: Set(feed::FeedStatus::Active),
            auto_approve: Set(auto_approve),
            auto_update: Set(true),
            when_submitted: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(connection)
        .await
        .expect("insert feed failed")
        .into()
    }

    fn record(guid: Option<&str>, link: Option<&str>) -> VideoRecord {
        VideoRecord {
            guid: guid.map(ToOwned::to_owned),
            title: format!("video {}", guid.or(link).unwrap_or("anonymous")),
            link: link.map(ToOwned::to_owned),
            file_url: Some("http://example.com/file.mp4".to_string()),
            ..Default::default()
        }
    }

    async fn open_import(source: &VideoSourceEnum, connection: &DatabaseConnection) -> source_import::Model {
        create_source_import(source, None, connection).await.expect("create import failed")
    }

    async fn all_videos(connection: &DatabaseConnection) -> Vec<video::Model> {
        video::Entity::find()
            .order_by_asc(video::Column::Id)
            .all(connection)
            .await
            .expect("find videos failed")
    }

    #[tokio::test]
    async fn test_import_counts_and_batch_dedup() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", false).await;
        let import = open_import(&source, &connection).await;
        // five entries, two of them duplicates within the same batch
        let records = vec![
            Ok(record(Some("guid-1"), Some("http://example.com/1"))),
            Ok(record(Some("guid-2"), Some("http://example.com/2"))),
            Ok(record(Some("guid-1"), Some("http://example.com/1"))),
            Ok(record(Some("guid-3"), Some("http://example.com/3"))),
            Ok(record(Some("guid-2"), Some("http://example.com/2"))),
        ];
        let (imported, skipped, errored) = run_import(&source, &import, records, &connection)
            .await
            .expect("run failed");
        assert_eq!((imported, skipped, errored), (3, 2, 0));
        assert_eq!(all_videos(&connection).await.len(), 3);
    }

    #[tokio::test]
    async fn test_second_run_skips_known_guids() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", false).await;
        let records = || {
            vec![
                Ok(record(Some("guid-1"), Some("http://example.com/1"))),
                Ok(record(Some("guid-2"), Some("http://example.com/2"))),
            ]
        };
        let import = open_import(&source, &connection).await;
        run_import(&source, &import, records(), &connection).await.expect("run failed");
        let import = open_import(&source, &connection).await;
        let (imported, skipped, _) = run_import(&source, &import, records(), &connection)
            .await
            .expect("run failed");
        assert_eq!((imported, skipped), (0, 2));
        assert_eq!(all_videos(&connection).await.len(), 2);
    }

    #[tokio::test]
    async fn test_guid_dedup_is_scoped_to_source() {
        let connection = memory_db().await;
        let first = seed_feed(&connection, "http://example.com/a.rss", false).await;
        let second = seed_feed(&connection, "http://example.com/b.rss", false).await;
        let import = open_import(&first, &connection).await;
        run_import(
            &first,
            &import,
            vec![Ok(record(Some("shared-guid"), Some("http://example.com/a/1")))],
            &connection,
        )
        .await
        .expect("run failed");
        // same guid under another source is a different video
        let import = open_import(&second, &connection).await;
        let (imported, skipped, _) = run_import(
            &second,
            &import,
            vec![Ok(record(Some("shared-guid"), Some("http://example.com/b/1")))],
            &connection,
        )
        .await
        .expect("run failed");
        assert_eq!((imported, skipped), (1, 0));
    }

    #[tokio::test]
    async fn test_link_dedup_is_site_wide() {
        let connection = memory_db().await;
        let first = seed_feed(&connection, "http://example.com/a.rss", false).await;
        let second = seed_feed(&connection, "http://example.com/b.rss", false).await;
        let import = open_import(&first, &connection).await;
        run_import(
            &first,
            &import,
            vec![Ok(record(Some("guid-a"), Some("http://example.com/same-page")))],
            &connection,
        )
        .await
        .expect("run failed");
        // no guid this time, but the same page imported through another feed
        let import = open_import(&second, &connection).await;
        let (imported, skipped, _) = run_import(
            &second,
            &import,
            vec![Ok(record(None, Some("http://example.com/same-page")))],
            &connection,
        )
        .await
        .expect("run failed");
        assert_eq!((imported, skipped), (0, 1));
    }

    #[tokio::test]
    async fn test_unusable_record_counts_as_error() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", false).await;
        let import = open_import(&source, &connection).await;
        let records = vec![
            Ok(record(Some("guid-1"), Some("http://example.com/1"))),
            // neither a file nor a website link
            Ok(VideoRecord {
                guid: Some("guid-2".to_string()),
                title: "unusable".to_string(),
                ..Default::default()
            }),
        ];
        let (imported, skipped, errored) = run_import(&source, &import, records, &connection)
            .await
            .expect("run failed");
        assert_eq!((imported, skipped, errored), (1, 0, 1));
    }

    #[tokio::test]
    async fn test_failed_run_rolls_back_everything() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", false).await;
        let import = open_import(&source, &connection).await;
        let records = vec![
            Ok(record(Some("guid-1"), Some("http://example.com/1"))),
            Ok(record(Some("guid-2"), Some("http://example.com/2"))),
            Err(ScrapeError::Parse("truncated document".to_string())),
            Ok(record(Some("guid-3"), Some("http://example.com/3"))),
        ];
        assert!(run_import(&source, &import, records, &connection).await.is_err());
        // nothing survives a failed run
        assert!(all_videos(&connection).await.is_empty());
        let import = source_import::Entity::find_by_id(import.id)
            .one(&connection)
            .await
            .expect("find failed")
            .expect("import gone");
        assert_eq!(import.status, source_import::ImportStatus::Failed);
        assert!(import.error_message.expect("no error message").contains("truncated"));
    }

    #[tokio::test]
    async fn test_manual_source_queues_everything() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", false).await;
        let import = open_import(&source, &connection).await;
        run_import(
            &source,
            &import,
            vec![
                Ok(record(Some("guid-1"), Some("http://example.com/1"))),
                Ok(record(Some("guid-2"), Some("http://example.com/2"))),
            ],
            &connection,
        )
        .await
        .expect("run failed");
        for video_model in all_videos(&connection).await {
            assert_eq!(video_model.status, video::VideoStatus::Unapproved);
            assert!(video_model.when_approved.is_none());
        }
    }

    #[tokio::test]
    async fn test_auto_approve_activates_in_feed_order() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", true).await;
        let import = open_import(&source, &connection).await;
        run_import(
            &source,
            &import,
            vec![
                Ok(record(Some("guid-1"), Some("http://example.com/1"))),
                Ok(record(Some("guid-2"), Some("http://example.com/2"))),
            ],
            &connection,
        )
        .await
        .expect("run failed");
        let videos = all_videos(&connection).await;
        assert_eq!(videos.len(), 2);
        for (index, video_model) in videos.iter().enumerate() {
            assert_eq!(video_model.status, video::VideoStatus::Active);
            assert!(video_model.when_approved.is_some());
            assert_eq!(video_model.import_index, Some(index as i32));
        }
    }

    #[tokio::test]
    async fn test_video_limit_caps_auto_approval() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", true).await;
        let import = open_import(&source, &connection).await;
        let records: Vec<_> = (1..=5)
            .map(|i| {
                Ok(record(
                    Some(format!("guid-{i}").as_str()),
                    Some(format!("http://example.com/{i}").as_str()),
                ))
            })
            .collect();
        update_source(&source, &import, &records, &connection)
            .await
            .expect("update failed");
        // room for four more active videos
        let (approved, unapproved) = approve_import_videos(&import, Some(4), &connection)
            .await
            .expect("approve failed");
        assert_eq!((approved, unapproved), (4, 1));
        let videos = all_videos(&connection).await;
        let active: Vec<_> = videos
            .iter()
            .filter(|v| v.status == video::VideoStatus::Active)
            .map(|v| v.import_index.unwrap())
            .collect();
        // the first four in feed order made the cut
        assert_eq!(active, vec![0, 1, 2, 3]);
        assert_eq!(
            videos.iter().filter(|v| v.status == video::VideoStatus::Unapproved).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_video_limit_counts_already_active_videos() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", true).await;
        let import = open_import(&source, &connection).await;
        run_import(
            &source,
            &import,
            vec![
                Ok(record(Some("guid-1"), Some("http://example.com/1"))),
                Ok(record(Some("guid-2"), Some("http://example.com/2"))),
            ],
            &connection,
        )
        .await
        .expect("run failed");
        // two are active now; a limit of three leaves room for exactly one
        let import = open_import(&source, &connection).await;
        let records = vec![
            Ok(record(Some("guid-3"), Some("http://example.com/3"))),
            Ok(record(Some("guid-4"), Some("http://example.com/4"))),
        ];
        update_source(&source, &import, &records, &connection)
            .await
            .expect("update failed");
        let (approved, unapproved) = approve_import_videos(&import, Some(3), &connection)
            .await
            .expect("approve failed");
        assert_eq!((approved, unapproved), (1, 1));
    }

    #[tokio::test]
    async fn test_unchanged_feed_completes_with_zero_counts() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", true).await;
        let import = open_import(&source, &connection).await;
        let client = ScrapeClient::with_rate_limit(None);
        run_fetched(&source, &import, FetchedRecords::NotModified, &client, &connection)
            .await
            .expect("run failed");
        let import = source_import::Entity::find_by_id(import.id)
            .one(&connection)
            .await
            .expect("find failed")
            .expect("import gone");
        assert_eq!(import.status, source_import::ImportStatus::Complete);
        assert_eq!(
            (import.videos_imported, import.videos_skipped, import.videos_errored),
            (0, 0, 0)
        );
        assert!(all_videos(&connection).await.is_empty());
    }

    #[tokio::test]
    async fn test_fetched_records_persist_etag() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", true).await;
        let import = open_import(&source, &connection).await;
        let client = ScrapeClient::with_rate_limit(None);
        let fetched = FetchedRecords::Records {
            entries: vec![record(Some("guid-1"), Some("http://example.com/1"))],
            etag: Some("\"v1\"".to_string()),
        };
        run_fetched(&source, &import, fetched, &client, &connection)
            .await
            .expect("run failed");
        let feed_model = feed::Entity::find()
            .one(&connection)
            .await
            .expect("find failed")
            .expect("feed gone");
        assert_eq!(feed_model.etag.as_deref(), Some("\"v1\""));
        assert!(feed_model.last_updated.is_some());
        assert_eq!(all_videos(&connection).await.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_sources_fail_without_aborting_the_pass() {
        let connection = memory_db().await;
        let sources = vec![
            seed_feed(&connection, "::not a url::", false).await,
            seed_feed(&connection, "::also not a url::", false).await,
        ];
        let client = ScrapeClient::with_rate_limit(None);
        process_sources(&sources, &client, &connection).await;
        let imports = source_import::Entity::find().all(&connection).await.expect("find failed");
        assert_eq!(imports.len(), 2);
        for import in imports {
            assert_eq!(import.status, source_import::ImportStatus::Failed);
        }
    }

    #[test]
    fn test_drift_skips_only_rejected_videos() {
        let video_model = |status| video::Model {
            id: 1,
            feed_id: None,
            search_id: None,
            import_id: None,
            import_index: None,
            guid: None,
            name: "clip".to_string(),
            description: String::new(),
            website_url: Some("http://example.com/clip".to_string()),
            file_url: None,
            file_url_length: None,
            file_url_mimetype: None,
            thumbnail_url: None,
            thumbnail_path: None,
            tags: None,
            authors: None,
            categories: None,
            status,
            when_submitted: Utc::now().naive_utc(),
            when_approved: None,
            when_published: None,
        };
        assert!(tracks_remote(&video_model(video::VideoStatus::Active)));
        // the moderation queue still tracks its host
        assert!(tracks_remote(&video_model(video::VideoStatus::Unapproved)));
        assert!(tracks_remote(&video_model(video::VideoStatus::Pending)));
        assert!(!tracks_remote(&video_model(video::VideoStatus::Rejected)));
        let mut local_only = video_model(video::VideoStatus::Active);
        local_only.website_url = None;
        assert!(!tracks_remote(&local_only));
    }

    #[tokio::test]
    async fn test_snapshot_originals_once_per_video() {
        let connection = memory_db().await;
        let source = seed_feed(&connection, "http://example.com/feed.rss", false).await;
        let import = open_import(&source, &connection).await;
        run_import(
            &source,
            &import,
            vec![Ok(record(Some("guid-1"), Some("http://example.com/1")))],
            &connection,
        )
        .await
        .expect("run failed");
        snapshot_originals(import.id, &connection).await.expect("snapshot failed");
        snapshot_originals(import.id, &connection).await.expect("snapshot failed");
        let originals = original_video::Entity::find().all(&connection).await.expect("find failed");
        assert_eq!(originals.len(), 1);
        assert_eq!(originals[0].remote_video_was_deleted, original_video::REMOTE_ALIVE);
    }
}
