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

use cloneable_errors::anyhow;
use log::debug;
use watchlog_api::HistoryView;

pub mod aggregate;
pub mod cache;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod locate;
pub mod normalize;

pub use aggregate::aggregate;
pub use cache::{duration_key, DurationCache, MemoryDurationCache};
pub use errors::{ScrapeError, ScrapeErrorKind};
pub use fetch::PageFetcher;
pub use locate::LocatorConfig;

/// Path of the watch history feed on the host site.
pub const HISTORY_FEED_PATH: &str = "/feed/history";

/// The end-to-end pipeline: fetch the feed page, dig the embedded
/// payload out of the markup, split it into day buckets and normalize
/// them against the duration store.
///
/// Every invocation re-fetches and re-parses from scratch; the page
/// changes between navigations and nothing here is worth caching.
/// Failures abort the whole invocation, so callers get either the full
/// bucket pair or a [`ScrapeError`], never a truncated history.
pub struct HistoryScraper {
    fetcher: PageFetcher,
    config: LocatorConfig,
}

impl HistoryScraper {
    pub fn new(fetcher: PageFetcher, config: LocatorConfig) -> HistoryScraper {
        HistoryScraper { fetcher, config }
    }

    pub async fn fetch_history<C: DurationCache>(&self, cache: &C) -> Result<HistoryView, ScrapeError> {
        let markup = self.fetcher.fetch_page(HISTORY_FEED_PATH).await?;
        self.parse_history(&markup, cache).await
    }

    /// The markup-to-view half of the pipeline, split off from the
    /// fetch so it can run against captured markup.
    pub async fn parse_history<C: DurationCache>(&self, markup: &str, cache: &C) -> Result<HistoryView, ScrapeError> {
        let state = extract::extract_named_var(markup, self.config.var_name)?
            .ok_or_else(|| ScrapeError::Parse(anyhow!("Variable {} not found in the page markup", self.config.var_name)))?;
        let buckets = locate::locate_history_buckets(&state, &self.config)?;
        let today = match buckets.today {
            Some(bucket) => normalize::normalize_bucket(bucket, cache).await?,
            None => Vec::new(),
        };
        let yesterday = match buckets.yesterday {
            Some(bucket) => normalize::normalize_bucket(bucket, cache).await?,
            None => Vec::new(),
        };
        debug!("Parsed history: {} items today, {} yesterday", today.len(), yesterday.len());
        Ok(HistoryView { today, yesterday })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::locate::tests::{section, state_with_sections};
    use crate::normalize::tests::{regular_video, short_shelf};

    fn scraper() -> HistoryScraper {
        let fetcher = PageFetcher::new(
            reqwest::Client::new(),
            reqwest::Url::parse("https://www.youtube.com").unwrap(),
        );
        HistoryScraper::new(fetcher, LocatorConfig::default())
    }

    fn history_markup() -> String {
        let state = state_with_sections(vec![
            section("Today", vec![
                regular_video("a video with var in the title", "10:30", 50.0),
                short_shelf(&[("abc123def45", "a short")]),
            ]),
            section("Yesterday", vec![regular_video("older video", "1:02:03", 100.0)]),
        ]);
        format!("<html><body><script>var ytInitialData = {state};var ytcfg = {{}};</script></body></html>")
    }

    #[tokio::test]
    async fn full_parse_pass() {
        let cache = MemoryDurationCache::default();
        cache.set_durations(HashMap::from([(duration_key("abc123def45"), 45)])).await.unwrap();

        let view = scraper().parse_history(&history_markup(), &cache).await.unwrap();
        assert_eq!(view.today.len(), 2);
        assert_eq!(view.today[0].duration_seconds, 315);
        assert_eq!(view.today[1].duration_seconds, 45);
        assert_eq!(view.yesterday.len(), 1);
        assert_eq!(view.yesterday[0].duration_seconds, 3723);
    }

    #[tokio::test]
    async fn parsing_is_idempotent() {
        let cache = MemoryDurationCache::default();
        cache.set_durations(HashMap::from([(duration_key("abc123def45"), 45)])).await.unwrap();

        let markup = history_markup();
        let scraper = scraper();
        let first = scraper.parse_history(&markup, &cache).await.unwrap();
        let second = scraper.parse_history(&markup, &cache).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn absent_variable_fails_the_invocation() {
        let cache = MemoryDurationCache::default();
        let err = scraper().parse_history("<html><script>var other = {};</script></html>", &cache).await.unwrap_err();
        assert_eq!(err.kind(), ScrapeErrorKind::Parse);
    }
}
