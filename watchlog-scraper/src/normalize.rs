/* This file is part of the WatchLog project - https://github.com/watchlog-dev/watchlog
*
*  Copyright (C) 2025 WatchLog contributors
*
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use serde_json::Value;
use watchlog_api::{HistoryItem, Thumbnail};

use crate::cache::{duration_key, DurationCache};
use crate::errors::ScrapeError;
use crate::locate::{get_path, PathStep, PathStep::{Field, Index}};

/// Assumed length of a short until the duration store has a captured
/// value for it.
pub const DEFAULT_SHORT_SECONDS: u64 = 60;

const SHORT_ID_PATH: &[PathStep] = &[
    Field("onTap"),
    Field("innertubeCommand"),
    Field("reelWatchEndpoint"),
    Field("videoId"),
];
const SHORT_TITLE_PATH: &[PathStep] = &[Field("overlayMetadata"), Field("primaryText"), Field("content")];
const SHORT_THUMBNAIL_PATH: &[PathStep] = &[Field("thumbnail"), Field("sources"), Index(0)];

const REGULAR_OVERLAY_PATH: &[PathStep] = &[
    Field("contentImage"),
    Field("thumbnailViewModel"),
    Field("overlays"),
    Index(0),
    Field("thumbnailBottomOverlayViewModel"),
];
const OVERLAY_BADGE_PATH: &[PathStep] = &[Field("badges"), Index(0), Field("thumbnailBadgeViewModel"), Field("text")];
const OVERLAY_PROGRESS_PATH: &[PathStep] = &[Field("progressBar"), Field("thumbnailOverlayProgressBarViewModel"), Field("startPercent")];
const REGULAR_TITLE_PATH: &[PathStep] = &[Field("metadata"), Field("lockupMetadataViewModel"), Field("title"), Field("content")];
const REGULAR_THUMBNAIL_PATH: &[PathStep] = &[
    Field("contentImage"),
    Field("thumbnailViewModel"),
    Field("image"),
    Field("sources"),
    Index(0),
];

/// Structural classification of one raw history row.
///
/// The feed carries no reliable discriminant field; the renderer key
/// is the marker, checked in this priority order.
enum RawItem<'a> {
    /// A shelf of shorts, each with its own sub-item.
    ShortShelf(&'a Value),
    /// A single regular video lockup.
    Regular(&'a Value),
    /// Anything else. New row types show up upstream unannounced and
    /// are skipped, not errored.
    Unknown,
}

fn classify(row: &Value) -> RawItem<'_> {
    if let Some(shelf) = row.get("reelShelfRenderer") {
        RawItem::ShortShelf(shelf)
    } else if let Some(lockup) = row.get("lockupViewModel") {
        RawItem::Regular(lockup)
    } else {
        RawItem::Unknown
    }
}

/// Normalizes one bucket of raw rows into canonical history items.
///
/// Two phases: classify-and-extract (collecting pending store keys for
/// every short seen), then a single batch read over the full key set.
/// Shorts whose keys miss the store keep [`DEFAULT_SHORT_SECONDS`].
/// Output preserves input order, with shelf sub-items flattened in
/// shelf order.
pub async fn normalize_bucket<C: DurationCache>(bucket: &[Value], cache: &C) -> Result<Vec<HistoryItem>, ScrapeError> {
    let mut items: Vec<HistoryItem> = Vec::with_capacity(bucket.len());
    let mut pending: Vec<(usize, String)> = Vec::new();

    for row in bucket {
        match classify(row) {
            RawItem::ShortShelf(shelf) => {
                let Some(entries) = shelf.get("items").and_then(Value::as_array) else {
                    continue;
                };
                for entry in entries {
                    let Some((video_id, item)) = parse_short(entry) else {
                        continue;
                    };
                    pending.push((items.len(), duration_key(video_id)));
                    items.push(item);
                }
            }
            RawItem::Regular(lockup) => {
                if let Some(item) = parse_regular(lockup) {
                    items.push(item);
                }
            }
            RawItem::Unknown => {}
        }
    }

    if !pending.is_empty() {
        // One read over the whole key set; per-item reads would turn
        // every shelf into a pile of store round trips.
        let keys: Vec<String> = pending.iter().map(|(_, key)| key.clone()).collect();
        let stored = cache.get_durations(&keys).await.map_err(ScrapeError::Store)?;
        for (index, key) in pending {
            if let Some(&secs) = stored.get(&key) {
                items[index].duration_seconds = secs;
            }
        }
    }

    Ok(items)
}

fn parse_short(entry: &Value) -> Option<(&str, HistoryItem)> {
    let lockup = entry.get("shortsLockupViewModel")?;
    let video_id = get_path(lockup, SHORT_ID_PATH)?.as_str()?;
    let title = get_path(lockup, SHORT_TITLE_PATH)?.as_str()?;
    let thumbnail = parse_thumbnail(get_path(lockup, SHORT_THUMBNAIL_PATH)?)?;
    Some((video_id, HistoryItem {
        title: title.into(),
        thumbnail,
        is_short: true,
        duration_seconds: DEFAULT_SHORT_SECONDS,
    }))
}

fn parse_regular(lockup: &Value) -> Option<HistoryItem> {
    let overlay = get_path(lockup, REGULAR_OVERLAY_PATH)?;
    let badge = get_path(overlay, OVERLAY_BADGE_PATH)?.as_str()?;
    let total_seconds = parse_badge_seconds(badge)?;
    let progress = get_path(overlay, OVERLAY_PROGRESS_PATH)?.as_f64()?;
    let title = get_path(lockup, REGULAR_TITLE_PATH)?.as_str()?;
    let thumbnail = parse_thumbnail(get_path(lockup, REGULAR_THUMBNAIL_PATH)?)?;
    Some(HistoryItem {
        title: title.into(),
        thumbnail,
        is_short: false,
        duration_seconds: watched_seconds(total_seconds, progress),
    })
}

fn parse_thumbnail(source: &Value) -> Option<Thumbnail> {
    Some(Thumbnail {
        url: source.get("url")?.as_str()?.into(),
        width: u32::try_from(source.get("width")?.as_u64()?).ok()?,
        height: u32::try_from(source.get("height")?.as_u64()?).ok()?,
    })
}

/// Parses a colon-separated duration badge ("10:30", "1:02:03") into
/// total seconds. Reversed so the seconds position aligns first;
/// missing higher units default to 0. Non-numeric badges (e.g. LIVE)
/// yield `None`.
fn parse_badge_seconds(badge: &str) -> Option<u64> {
    let mut total: u64 = 0;
    for (part, scale) in badge.split(':').rev().zip([1u64, 60, 3600]) {
        let value: u64 = part.trim().parse().ok()?;
        total += value * scale;
    }
    Some(total)
}

/// Watched seconds, i.e. total runtime scaled by the progress-bar
/// percentage. A rounded approximation of time actually spent, never
/// the video's full length.
fn watched_seconds(total_seconds: u64, progress_percent: f64) -> u64 {
    let progress = progress_percent.max(0.0);
    (total_seconds as f64 * (progress / 100.0)).round() as u64
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::cache::MemoryDurationCache;

    pub(crate) fn short_shelf(entries: &[(&str, &str)]) -> Value {
        let items: Vec<Value> = entries.iter().map(|(id, title)| json!({
            "shortsLockupViewModel": {
                "onTap": {"innertubeCommand": {"reelWatchEndpoint": {"videoId": id}}},
                "overlayMetadata": {"primaryText": {"content": title}},
                "thumbnail": {"sources": [{"url": format!("https://i.ytimg.com/vi/{id}/frame0.jpg"), "width": 405, "height": 720}]},
            }
        })).collect();
        json!({"reelShelfRenderer": {"items": items}})
    }

    pub(crate) fn regular_video(title: &str, badge: &str, progress: f64) -> Value {
        json!({
            "lockupViewModel": {
                "metadata": {"lockupMetadataViewModel": {"title": {"content": title}}},
                "contentImage": {
                    "thumbnailViewModel": {
                        "image": {"sources": [{"url": "https://i.ytimg.com/vi/xyz/hqdefault.jpg", "width": 480, "height": 270}]},
                        "overlays": [{
                            "thumbnailBottomOverlayViewModel": {
                                "badges": [{"thumbnailBadgeViewModel": {"text": badge}}],
                                "progressBar": {"thumbnailOverlayProgressBarViewModel": {"startPercent": progress}},
                            }
                        }],
                    }
                },
            }
        })
    }

    #[test]
    fn badge_minutes_seconds() {
        assert_eq!(parse_badge_seconds("10:30"), Some(630));
    }

    #[test]
    fn badge_hours_minutes_seconds() {
        assert_eq!(parse_badge_seconds("1:02:03"), Some(3723));
    }

    #[test]
    fn badge_bare_seconds() {
        assert_eq!(parse_badge_seconds("45"), Some(45));
    }

    #[test]
    fn live_badge_is_not_a_duration() {
        assert_eq!(parse_badge_seconds("LIVE"), None);
    }

    #[test]
    fn watched_seconds_rounds() {
        assert_eq!(watched_seconds(630, 50.0), 315);
        assert_eq!(watched_seconds(100, 0.0), 0);
        assert_eq!(watched_seconds(3, 50.0), 2); // 1.5 rounds up
    }

    #[tokio::test]
    async fn regular_item_duration_is_watched_time() {
        let bucket = vec![regular_video("some video", "10:30", 50.0)];
        let items = normalize_bucket(&bucket, &MemoryDurationCache::default()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_short);
        assert_eq!(items[0].duration_seconds, 315);
        assert_eq!(&*items[0].title, "some video");
        assert_eq!(items[0].thumbnail.width, 480);
    }

    #[tokio::test]
    async fn shorts_default_to_sixty_seconds() {
        let bucket = vec![short_shelf(&[("abc123def45", "a short")])];
        let items = normalize_bucket(&bucket, &MemoryDurationCache::default()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_short);
        assert_eq!(items[0].duration_seconds, DEFAULT_SHORT_SECONDS);
    }

    #[tokio::test]
    async fn cached_short_duration_overrides_default() {
        let cache = MemoryDurationCache::default();
        cache.set_durations(HashMap::from([(duration_key("abc123def45"), 45)])).await.unwrap();

        let bucket = vec![short_shelf(&[("abc123def45", "a short"), ("zzz999zzz99", "another")])];
        let items = normalize_bucket(&bucket, &cache).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].duration_seconds, 45);
        assert_eq!(items[1].duration_seconds, DEFAULT_SHORT_SECONDS);
    }

    #[tokio::test]
    async fn unknown_shapes_are_skipped() {
        let bucket = vec![
            json!({"someNewRenderer": {"whatever": true}}),
            regular_video("kept", "1:00", 100.0),
            json!({"lockupViewModel": {"missing": "everything"}}),
        ];
        let items = normalize_bucket(&bucket, &MemoryDurationCache::default()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(&*items[0].title, "kept");
    }

    #[tokio::test]
    async fn ordering_flattens_shelves_in_place() {
        let bucket = vec![
            regular_video("first", "1:00", 100.0),
            short_shelf(&[("abc123def45", "s1"), ("zzz999zzz99", "s2")]),
            regular_video("last", "2:00", 100.0),
        ];
        let items = normalize_bucket(&bucket, &MemoryDurationCache::default()).await.unwrap();
        let titles: Vec<&str> = items.iter().map(|i| &*i.title).collect();
        assert_eq!(titles, ["first", "s1", "s2", "last"]);
    }
}
