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

use chrono::{DateTime, TimeZone, Timelike};
use watchlog_api::{HistoryItem, HistorySummary};

/// Local hour before which late-night viewing still counts as the
/// previous day's session.
pub const MERGE_CUTOFF_HOUR: u32 = 5;

/// Totals over both buckets, plus the advisory `merge_days` flag.
///
/// The flag only tells the presentation layer whether to fold
/// yesterday's list into today's; the totals always cover both buckets
/// either way.
pub fn aggregate<Tz: TimeZone>(today: &[HistoryItem], yesterday: &[HistoryItem], now: &DateTime<Tz>) -> HistorySummary {
    let mut summary = HistorySummary {
        merge_days: now.hour() < MERGE_CUTOFF_HOUR,
        ..HistorySummary::default()
    };
    for item in today.iter().chain(yesterday) {
        summary.total_duration_seconds += item.duration_seconds;
        if item.is_short {
            summary.shorts_count += 1;
        } else {
            summary.video_count += 1;
        }
    }
    summary
}
