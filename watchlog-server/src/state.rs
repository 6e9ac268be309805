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

use std::{collections::HashMap, io, path::PathBuf, sync::Arc};

use chrono::{DateTime, Utc};
use cloneable_errors::{ErrContext, ErrorContext, ResContext};
use futures::lock::Mutex;
use log::info;
use serde::{Deserialize, Serialize};
use watchlog_scraper::DurationCache;

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub listen: ListenConfig,
    pub reqwest_timeout_secs: f64,
    pub store_path: PathBuf,
    #[serde(skip)]
    pub startup_timestamp: DateTime<Utc>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_owned(),
            listen: ListenConfig::default(),
            reqwest_timeout_secs: 20.,
            store_path: PathBuf::from("./durations.json"),
            startup_timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ListenConfig {
    pub tcp: Option<(String, u16)>,
    pub unix: Option<String>,
    pub unix_mode: Option<u32>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            // the overlay talks to us from the same machine
            tcp: Some(("127.0.0.1".to_owned(), 9393)),
            unix: None,
            unix_mode: None,
        }
    }
}

/// File-backed duration store. The whole map stays small (one entry
/// per short ever watched), so writes rewrite the file wholesale
/// instead of bothering with anything incremental.
#[derive(Clone)]
pub struct DurationDb {
    path: Arc<PathBuf>,
    entries: Arc<Mutex<HashMap<String, u64>>>,
}

impl DurationDb {
    pub async fn load(path: PathBuf) -> Result<DurationDb, ErrorContext> {
        let entries: HashMap<String, u64> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Failed to deserialize the duration store at {}", path.display()))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.context(format!("Failed to read the duration store at {}", path.display()))),
        };
        info!("Duration store loaded: {} entries", entries.len());
        Ok(DurationDb {
            path: Arc::new(path),
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    pub async fn num_entries(&self) -> usize {
        self.entries.lock().await.len()
    }

    async fn persist(&self, entries: &HashMap<String, u64>) -> Result<(), ErrorContext> {
        let serialized = serde_json::to_vec(entries).context("Failed to serialize the duration store")?;
        tokio::fs::write(self.path.as_path(), serialized).await
            .with_context(|| format!("Failed to write the duration store at {}", self.path.display()))?;
        Ok(())
    }
}

impl DurationCache for DurationDb {
    async fn get_durations(&self, keys: &[String]) -> Result<HashMap<String, u64>, ErrorContext> {
        let entries = self.entries.lock().await;
        Ok(keys.iter()
            .filter_map(|key| entries.get(key).map(|&secs| (key.clone(), secs)))
            .collect())
    }

    async fn set_durations(&self, new_entries: HashMap<String, u64>) -> Result<(), ErrorContext> {
        let mut entries = self.entries.lock().await;
        entries.extend(new_entries);
        self.persist(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("watchlog-test-{tag}-{}.json", std::process::id()))
    }

    #[actix_web::test]
    async fn missing_store_file_starts_empty() {
        let db = DurationDb::load(temp_store_path("missing")).await.unwrap();
        assert_eq!(db.num_entries().await, 0);
    }

    #[actix_web::test]
    async fn set_persists_across_reload() {
        let path = temp_store_path("roundtrip");
        let db = DurationDb::load(path.clone()).await.unwrap();
        db.set_durations(HashMap::from([("duration-abc123def45".to_owned(), 45)])).await.unwrap();

        let reloaded = DurationDb::load(path.clone()).await.unwrap();
        let found = reloaded.get_durations(&["duration-abc123def45".to_owned()]).await.unwrap();
        assert_eq!(found["duration-abc123def45"], 45);

        let _ = std::fs::remove_file(path);
    }
}
