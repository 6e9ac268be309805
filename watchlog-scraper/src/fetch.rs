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

use cloneable_errors::ErrContext;
use reqwest::{Client, Url};

use crate::errors::ScrapeError;

/// Fetches pages from the host site. The pipeline only ever deals in
/// site-relative paths; timeouts are whatever the injected client was
/// built with, and nothing is retried.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    base_url: Url,
}

impl PageFetcher {
    pub fn new(client: Client, base_url: Url) -> PageFetcher {
        PageFetcher { client, base_url }
    }

    pub async fn fetch_page(&self, path: &str) -> Result<String, ScrapeError> {
        let url = self.base_url.join(path)
            .map_err(|e| ScrapeError::Network(e.context(format!("Invalid page path: {path}"))))?;
        let resp = self.client.get(url).send().await
            .map_err(|e| ScrapeError::Network(e.context("Failed to send the page request")))?;
        let resp = resp.error_for_status()
            .map_err(|e| ScrapeError::Network(e.context("Page request failed")))?;
        resp.text().await
            .map_err(|e| ScrapeError::Network(e.context("Failed to receive the page body")))
    }
}
