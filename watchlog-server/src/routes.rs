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
#![allow(clippy::needless_pass_by_value)]
use std::{collections::HashMap, sync::LazyLock};

use actix_web::{get, post, web, http::StatusCode, HttpResponse, Responder};
use chrono::Local;
use cloneable_errors::{anyhow, ErrContext};
use log::{info, warn};
use regex::Regex;
use serde::Deserialize;
use watchlog_api::{HistoryResponse, StatusResponse};
use watchlog_scraper::{aggregate, DurationCache, HistoryScraper};

use crate::{state::*, utils::{self, format_duration}};

// Shorts ids are plain YouTube video ids: 11 url-safe base64 chars.
static DURATION_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^duration-[A-Za-z0-9_-]{11}$").expect("Should be able to parse the duration key regex"));

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(helo)
       .service(get_status)
       .service(get_history)
       .service(get_durations)
       .service(set_durations);
}

type JsonResult<T> = utils::Result<web::Json<T>>;

#[get("/")]
async fn helo() -> impl Responder {
    "hi"
}

#[get("/status")]
async fn get_status(db: web::Data<DurationDb>, config: web::Data<AppConfig>) -> JsonResult<StatusResponse> {
    Ok(web::Json(StatusResponse {
        stored_durations: db.num_entries().await,
        server_version: env!("CARGO_PKG_VERSION").into(),
        server_startup_timestamp: config.startup_timestamp.timestamp(),
    }))
}

/// One fresh scrape per request - the navigation handler in the overlay
/// calls this once per page load, and a failure means it renders
/// nothing for this navigation. No retries, no partial results.
#[get("/history")]
async fn get_history(scraper: web::Data<HistoryScraper>, db: web::Data<DurationDb>) -> JsonResult<HistoryResponse> {
    let view = scraper.fetch_history(db.get_ref()).await
        .map_err(|err| {
            warn!("History scrape failed: {err:?}");
            utils::Error::from(err.context("Failed to scrape the history feed"))
                .set_status(StatusCode::BAD_GATEWAY)
        })?;
    let summary = aggregate(&view.today, &view.yesterday, &Local::now());
    info!(
        "History scraped: {} videos, {} shorts, {} watched",
        summary.video_count, summary.shorts_count, format_duration(summary.total_duration_seconds),
    );
    Ok(web::Json(HistoryResponse {
        today: view.today,
        yesterday: view.yesterday,
        summary,
    }))
}

#[derive(Deserialize)]
struct DurationQuery {
    keys: String,
}

#[get("/durations")]
async fn get_durations(query: web::Query<DurationQuery>, db: web::Data<DurationDb>) -> JsonResult<HashMap<String, u64>> {
    let keys: Vec<String> = query.keys.split(',')
        .filter(|key| !key.is_empty())
        .map(str::to_owned)
        .collect();
    let found = db.get_durations(&keys).await.map_err(utils::Error::from)?;
    Ok(web::Json(found))
}

/// Write path for the capture routine: after a short finishes loading,
/// the overlay posts the player's real duration here.
#[post("/durations")]
async fn set_durations(entries: web::Json<HashMap<String, u64>>, db: web::Data<DurationDb>) -> utils::Result<HttpResponse> {
    let entries = entries.into_inner();
    if let Some(bad) = entries.keys().find(|key| !DURATION_KEY_REGEX.is_match(key)) {
        return Err(utils::Error::from(anyhow!("Invalid duration key: {bad}"))
            .set_status(StatusCode::BAD_REQUEST));
    }
    db.set_durations(entries).await.map_err(utils::Error::from)?;
    Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_keys_must_carry_a_video_id() {
        assert!(DURATION_KEY_REGEX.is_match("duration-abc123def45"));
        assert!(DURATION_KEY_REGEX.is_match("duration-_-abc123DEF"));
        assert!(!DURATION_KEY_REGEX.is_match("duration-short"));
        assert!(!DURATION_KEY_REGEX.is_match("abc123def45"));
        assert!(!DURATION_KEY_REGEX.is_match("duration-abc123def45extra"));
    }
}
