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

use std::{collections::HashMap, sync::Arc};

use cloneable_errors::ErrorContext;
use futures::lock::Mutex;

/// Store key for a short's captured duration.
pub fn duration_key(video_id: &str) -> String {
    format!("duration-{video_id}")
}

/// Key-value store holding durations of shorts, keyed by
/// `duration-<videoId>`.
///
/// The normalizer reads it in one batch per bucket; the capture path
/// (scoped to short playback, outside this crate) writes it. No lock
/// spans both: a duration captured after a pass's batch read is simply
/// picked up on the next invocation. Entries never expire.
#[allow(async_fn_in_trait)]
pub trait DurationCache {
    /// Batch read. Only keys present in the store appear in the result.
    async fn get_durations(&self, keys: &[String]) -> Result<HashMap<String, u64>, ErrorContext>;

    /// Merges `entries` into the store, overwriting existing keys.
    async fn set_durations(&self, entries: HashMap<String, u64>) -> Result<(), ErrorContext>;
}

/// In-process store with no persistence. Useful as a stand-in where
/// durability doesn't matter (and as the test double).
#[derive(Default, Clone)]
pub struct MemoryDurationCache {
    entries: Arc<Mutex<HashMap<String, u64>>>,
}

impl MemoryDurationCache {
    pub async fn num_entries(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl DurationCache for MemoryDurationCache {
    async fn get_durations(&self, keys: &[String]) -> Result<HashMap<String, u64>, ErrorContext> {
        let entries = self.entries.lock().await;
        Ok(keys.iter()
            .filter_map(|key| entries.get(key).map(|&secs| (key.clone(), secs)))
            .collect())
    }

    async fn set_durations(&self, new_entries: HashMap<String, u64>) -> Result<(), ErrorContext> {
        self.entries.lock().await.extend(new_entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batch_get_returns_present_keys_only() {
        let cache = MemoryDurationCache::default();
        cache.set_durations(HashMap::from([(duration_key("abc123def45"), 42)])).await.unwrap();

        let keys = vec![duration_key("abc123def45"), duration_key("zzz999zzz99")];
        let found = cache.get_durations(&keys).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[&duration_key("abc123def45")], 42);
    }
}
