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

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// First source of the upstream thumbnail source list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: Arc<str>,
    pub width: u32,
    pub height: u32,
}

/// One normalized watch history entry.
///
/// For regular videos `duration_seconds` holds *watched* seconds
/// (total runtime scaled by playback progress), not the full length.
/// For shorts it holds the default of 60 until the duration store
/// supplies the real value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HistoryItem {
    pub title: Arc<str>,
    pub thumbnail: Thumbnail,
    pub is_short: bool,
    pub duration_seconds: u64,
}

/// The bucket pair handed to the presentation layer.
///
/// An upstream section that was absent (no history that day) becomes
/// an empty vec, not an error.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryView {
    pub today: Vec<HistoryItem>,
    pub yesterday: Vec<HistoryItem>,
}

/// Per-request totals over both buckets.
///
/// `merge_days` is advisory: before 5 AM local time the client is
/// expected to fold yesterday's list into today's. The totals always
/// cover both buckets regardless of the flag.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub video_count: u64,
    pub shorts_count: u64,
    pub total_duration_seconds: u64,
    pub merge_days: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HistoryResponse {
    pub today: Vec<HistoryItem>,
    pub yesterday: Vec<HistoryItem>,
    pub summary: HistorySummary,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StatusResponse {
    pub stored_durations: usize,
    pub server_version: Arc<str>,
    pub server_startup_timestamp: i64,
}
