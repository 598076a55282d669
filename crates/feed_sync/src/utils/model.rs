use anyhow::{Context, Result};
use chrono::Utc;
use feed_sync_entity::*;
use sea_orm::ActiveValue::Set;
use sea_orm::Unchanged;
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryOrder};

use crate::adapter::{VideoSource, VideoSourceEnum};
use crate::scraper::VideoRecord;
use crate::utils::text::clean_html;

/// All sources that should be polled this pass.
pub async fn get_enabled_sources(connection: &DatabaseConnection) -> Result<Vec<VideoSourceEnum>> {
    let (feeds, searches) = tokio::try_join!(
        feed::Entity::find()
            .filter(
                feed::Column::AutoUpdate
                    .eq(true)
                    .and(feed::Column::Status.eq(feed::FeedStatus::Active))
            )
            .all(connection),
        saved_search::Entity::find()
            .filter(saved_search::Column::AutoUpdate.eq(true))
            .all(connection),
    )?;
    let mut sources = Vec::with_capacity(feeds.len() + searches.len());
    sources.extend(feeds.into_iter().map(VideoSourceEnum::from));
    sources.extend(searches.into_iter().map(VideoSourceEnum::from));
    Ok(sources)
}

/// Open the audit row for a run, snapshotting the source's auto_approve flag
/// so a flag flip mid-run can't change how this run's videos are approved.
pub async fn create_source_import(
    video_source: &VideoSourceEnum,
    total_videos: Option<i32>,
    connection: &DatabaseConnection,
) -> Result<source_import::Model> {
    let now = Utc::now().naive_utc();
    let mut import_model = source_import::ActiveModel {
        auto_approve: Set(video_source.auto_approve()),
        started_at: Set(now),
        last_activity: Set(now),
        total_videos: Set(total_videos),
        ..Default::default()
    };
    video_source.set_import_relation_id(&mut import_model);
    import_model.insert(connection).await.context("create source import failed")
}

/// GUID lookup is scoped to the source; two feeds may legitimately use the
/// same guid scheme.
pub async fn find_video_by_guid(
    video_source: &VideoSourceEnum,
    guid: &str,
    connection: &DatabaseConnection,
) -> Result<Option<video::Model>> {
    video::Entity::find()
        .filter(video::Column::Guid.eq(guid).and(video_source.filter_expr()))
        .one(connection)
        .await
        .context("find video by guid failed")
}

/// Link lookup is site-wide; the same page imported through two different
/// sources is still the same video.
pub async fn find_video_by_link(link: &str, connection: &DatabaseConnection) -> Result<Option<video::Model>> {
    video::Entity::find()
        .filter(video::Column::WebsiteUrl.eq(link))
        .one(connection)
        .await
        .context("find video by link failed")
}

/// Create one video row out of a scraped record, still in Pending status.
pub async fn create_video(
    record: &VideoRecord,
    video_source: &VideoSourceEnum,
    import: &source_import::Model,
    import_index: i32,
    connection: &DatabaseConnection,
) -> Result<video::Model> {
    let authors = match video_source.auto_authors() {
        Some(authors) if !authors.is_empty() => Some(authors.clone()),
        _ => record.author.clone().map(|author| StringVec::from(vec![author])),
    };
    let mut video_model = video::ActiveModel {
        import_id: Set(Some(import.id)),
        import_index: Set(Some(import_index)),
        guid: Set(record.guid.clone()),
        name: Set(record.title.clone()),
        description: Set(record.description.as_deref().map(clean_html).unwrap_or_default()),
        website_url: Set(record.link.clone()),
        file_url: Set(record.file_url.clone()),
        file_url_length: Set(record.file_url_length),
        file_url_mimetype: Set(record.file_url_mimetype.clone()),
        thumbnail_url: Set(record.thumbnail_url.clone()),
        tags: Set((!record.tags.is_empty()).then(|| StringVec::from(record.tags.clone()))),
        authors: Set(authors),
        categories: Set(video_source.auto_categories().cloned()),
        status: Set(video::VideoStatus::Pending),
        when_submitted: Set(Utc::now().naive_utc()),
        when_published: Set(record.publish_date),
        ..Default::default()
    };
    video_source.set_relation_id(&mut video_model);
    video_model.insert(connection).await.context("create video failed")
}

/// Roll back every row a failed run created.
pub async fn delete_import_videos(import_id: i32, connection: &DatabaseConnection) -> Result<u64> {
    let res = video::Entity::delete_many()
        .filter(video::Column::ImportId.eq(import_id))
        .exec(connection)
        .await?;
    Ok(res.rows_affected)
}

/// Hand a completed run's Pending videos to moderation. Auto-approving
/// sources get their videos activated in submission order up to the site's
/// video limit; everything past the limit, and everything from manual
/// sources, waits in the Unapproved queue.
pub async fn approve_import_videos(
    import: &source_import::Model,
    video_limit: Option<u64>,
    connection: &DatabaseConnection,
) -> Result<(i32, i32)> {
    let pending = video::Entity::find()
        .filter(
            video::Column::ImportId
                .eq(import.id)
                .and(video::Column::Status.eq(video::VideoStatus::Pending)),
        )
        .order_by_asc(video::Column::ImportIndex)
        .all(connection)
        .await?;
    let mut allowed = if import.auto_approve {
        match video_limit {
            Some(limit) => {
                let active = video::Entity::find()
                    .filter(video::Column::Status.eq(video::VideoStatus::Active))
                    .count(connection)
                    .await?;
                limit.saturating_sub(active)
            }
            None => u64::MAX,
        }
    } else {
        0
    };
    let (mut approved, mut unapproved) = (0, 0);
    let now = Utc::now().naive_utc();
    for video_model in pending {
        let status = if allowed > 0 {
            allowed -= 1;
            approved += 1;
            video::VideoStatus::Active
        } else {
            unapproved += 1;
            video::VideoStatus::Unapproved
        };
        video::ActiveModel {
            id: Unchanged(video_model.id),
            status: Set(status),
            when_approved: Set((status == video::VideoStatus::Active).then_some(now)),
            ..Default::default()
        }
        .update(connection)
        .await?;
    }
    Ok((approved, unapproved))
}

pub async fn update_import_total(
    import: &source_import::Model,
    total_videos: i32,
    connection: &DatabaseConnection,
) -> Result<()> {
    source_import::ActiveModel {
        id: Unchanged(import.id),
        last_activity: Set(Utc::now().naive_utc()),
        total_videos: Set(Some(total_videos)),
        ..Default::default()
    }
    .update(connection)
    .await?;
    Ok(())
}

pub async fn finish_import(
    import: &source_import::Model,
    imported: i32,
    skipped: i32,
    errored: i32,
    connection: &DatabaseConnection,
) -> Result<()> {
    source_import::ActiveModel {
        id: Unchanged(import.id),
        last_activity: Set(Utc::now().naive_utc()),
        videos_imported: Set(imported),
        videos_skipped: Set(skipped),
        videos_errored: Set(errored),
        status: Set(source_import::ImportStatus::Complete),
        ..Default::default()
    }
    .update(connection)
    .await?;
    Ok(())
}

pub async fn fail_import(
    import: &source_import::Model,
    error_message: &str,
    connection: &DatabaseConnection,
) -> Result<()> {
    source_import::ActiveModel {
        id: Unchanged(import.id),
        last_activity: Set(Utc::now().naive_utc()),
        status: Set(source_import::ImportStatus::Failed),
        error_message: Set(Some(error_message.to_string())),
        ..Default::default()
    }
    .update(connection)
    .await?;
    Ok(())
}
