//! Reconciles imported videos against their remote hosts.
//!
//! Each video keeps an `original_video` snapshot of the metadata it was
//! imported with. A drift pass re-scrapes the remote side and compares it to
//! the snapshot, not to the live video row, so local moderator edits can be
//! told apart from upstream changes: remote changes flow into unedited
//! fields, while edited fields are left alone and reported instead.

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::Utc;
use feed_sync_entity::*;
use sea_orm::ActiveValue::Set;
use sea_orm::Unchanged;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, DatabaseConnection};

use crate::scraper::video::RemoteVideo;
use crate::utils::text::normalize_newlines;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Description,
    Tags,
    ThumbnailUrl,
    /// Same thumbnail url, different bytes behind it.
    ThumbnailUpdated,
}

impl Field {
    fn label(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Tags => "tags",
            Field::ThumbnailUrl => "thumbnail url",
            Field::ThumbnailUpdated => "thumbnail image",
        }
    }
}

/// What one reconciliation pass over a single video decided.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Message for the notifiers, set at most once per event.
    pub notification: Option<String>,
    /// The thumbnail url or its bytes changed and the local copy should be
    /// fetched again.
    pub refresh_thumbnail: bool,
}

fn tag_set(tags: Option<&StringVec>) -> BTreeSet<String> {
    tags.map(|t| t.iter().cloned().collect()).unwrap_or_default()
}

fn text_eq(a: &str, b: &str) -> bool {
    normalize_newlines(a) == normalize_newlines(b)
}

/// Fields on which the remote copy has drifted away from the stored
/// snapshot.
pub fn changed_fields(
    original: &original_video::Model,
    remote: &RemoteVideo,
    remote_thumbnail_hash: Option<&str>,
) -> Vec<Field> {
    let mut changed = Vec::new();
    if !text_eq(&original.name, &remote.title) {
        changed.push(Field::Name);
    }
    if !text_eq(&original.description, remote.description.as_deref().unwrap_or_default()) {
        changed.push(Field::Description);
    }
    if tag_set(original.tags.as_ref()) != remote.tags.iter().cloned().collect() {
        changed.push(Field::Tags);
    }
    if original.thumbnail_url != remote.thumbnail_url {
        changed.push(Field::ThumbnailUrl);
    } else if let (Some(old), Some(new)) = (original.remote_thumbnail_hash.as_deref(), remote_thumbnail_hash) {
        if old != new {
            changed.push(Field::ThumbnailUpdated);
        }
    }
    changed
}

/// Whether the live video row still matches the snapshot on this field,
/// i.e. nobody edited it locally since the import.
fn video_matches_snapshot(video: &video::Model, original: &original_video::Model, field: Field) -> bool {
    match field {
        Field::Name => text_eq(&video.name, &original.name),
        Field::Description => text_eq(&video.description, &original.description),
        Field::Tags => tag_set(video.tags.as_ref()) == tag_set(original.tags.as_ref()),
        Field::ThumbnailUrl | Field::ThumbnailUpdated => video.thumbnail_url == original.thumbnail_url,
    }
}

/// Fold one scrape result into the video and its snapshot.
///
/// A scrape that came back empty means the host no longer knows the video;
/// deletion is only announced after it has been observed on two consecutive
/// passes, and announced once.
pub async fn apply_remote_state(
    video: &video::Model,
    original: &original_video::Model,
    remote: &RemoteVideo,
    remote_thumbnail_hash: Option<&str>,
    connection: &DatabaseConnection,
) -> Result<Outcome> {
    let now = Utc::now().naive_utc();
    if remote.is_empty() {
        return apply_remote_deleted(video, original, now, connection).await;
    }

    let changed = changed_fields(original, remote, remote_thumbnail_hash);
    let mut outcome = Outcome::default();
    let mut diverged = Vec::new();

    let mut video_update = video::ActiveModel {
        id: Unchanged(video.id),
        ..Default::default()
    };
    for &field in &changed {
        if !video_matches_snapshot(video, original, field) {
            diverged.push(field.label());
            continue;
        }
        match field {
            Field::Name => video_update.name = Set(remote.title.clone()),
            Field::Description => {
                video_update.description = Set(remote.description.clone().unwrap_or_default());
            }
            Field::Tags => {
                video_update.tags = Set((!remote.tags.is_empty()).then(|| StringVec::from(remote.tags.clone())));
            }
            Field::ThumbnailUrl => {
                video_update.thumbnail_url = Set(remote.thumbnail_url.clone());
                outcome.refresh_thumbnail = true;
            }
            Field::ThumbnailUpdated => outcome.refresh_thumbnail = true,
        }
    }
    if video_update.is_changed() {
        video_update.update(connection).await?;
    }

    // the snapshot always tracks the remote side, even where the video kept
    // its local edits
    original_video::ActiveModel {
        id: Unchanged(original.id),
        name: Set(remote.title.clone()),
        description: Set(remote.description.clone().unwrap_or_default()),
        tags: Set((!remote.tags.is_empty()).then(|| StringVec::from(remote.tags.clone()))),
        thumbnail_url: Set(remote.thumbnail_url.clone()),
        remote_thumbnail_hash: Set(remote_thumbnail_hash
            .map(ToOwned::to_owned)
            .or_else(|| original.remote_thumbnail_hash.clone())),
        remote_video_was_deleted: Set(original_video::REMOTE_ALIVE),
        last_checked: Set(now),
        ..Default::default()
    }
    .update(connection)
    .await?;

    if !diverged.is_empty() {
        outcome.notification = Some(format!(
            "video \"{}\" changed on its host site, but the local copy was edited; unapplied fields: {}",
            video.name,
            diverged.join(", ")
        ));
    }
    Ok(outcome)
}

async fn apply_remote_deleted(
    video: &video::Model,
    original: &original_video::Model,
    now: chrono::NaiveDateTime,
    connection: &DatabaseConnection,
) -> Result<Outcome> {
    let (flag, notification) = match original.remote_video_was_deleted {
        original_video::REMOTE_ALIVE => (original_video::REMOTE_DELETED_SUSPECTED, None),
        original_video::REMOTE_DELETED_SUSPECTED => (
            original_video::REMOTE_DELETED_NOTIFIED,
            Some(format!("video \"{}\" was deleted on its host site", video.name)),
        ),
        _ => (original_video::REMOTE_DELETED_NOTIFIED, None),
    };
    original_video::ActiveModel {
        id: Unchanged(original.id),
        remote_video_was_deleted: Set(flag),
        last_checked: Set(now),
        ..Default::default()
    }
    .update(connection)
    .await?;
    Ok(Outcome {
        notification,
        refresh_thumbnail: false,
    })
}
