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

use crate::errors::ScrapeError;

/// One hop of a navigation path through the embedded payload.
#[derive(Clone, Copy, Debug)]
pub enum PathStep {
    Field(&'static str),
    Index(usize),
}

use PathStep::{Field, Index};

/// Where the history section list lives inside `ytInitialData`, and
/// which header labels select the two buckets of interest.
///
/// All of this describes an upstream payload we do not control, so it
/// is kept as data rather than literals buried in the traversal: when
/// the feed reshuffles (or localizes its headers), this is the thing
/// to update.
#[derive(Clone, Debug)]
pub struct LocatorConfig {
    pub var_name: &'static str,
    pub section_path: &'static [PathStep],
    pub today_label: &'static str,
    pub yesterday_label: &'static str,
}

pub const SECTION_LIST_PATH: &[PathStep] = &[
    Field("contents"),
    Field("twoColumnBrowseResultsRenderer"),
    Field("tabs"),
    Index(0),
    Field("tabRenderer"),
    Field("content"),
    Field("sectionListRenderer"),
    Field("contents"),
];

const SECTION_HEADER_PATH: &[PathStep] = &[
    Field("itemSectionRenderer"),
    Field("header"),
    Field("itemSectionHeaderRenderer"),
    Field("title"),
    Field("runs"),
    Index(0),
    Field("text"),
];

const SECTION_ITEMS_PATH: &[PathStep] = &[
    Field("itemSectionRenderer"),
    Field("contents"),
];

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            var_name: "ytInitialData",
            section_path: SECTION_LIST_PATH,
            today_label: "Today",
            yesterday_label: "Yesterday",
        }
    }
}

/// Raw item lists for the two calendar periods of interest. An unset
/// bucket means the feed had no section for that period, which is a
/// normal state, not a failure.
#[derive(Default, Debug)]
pub struct HistoryBuckets<'a> {
    pub today: Option<&'a [Value]>,
    pub yesterday: Option<&'a [Value]>,
}

/// Descends `steps` hop by hop, so a missing field fails with the exact
/// hop that broke instead of a generic "no data" somewhere downstream.
pub(crate) fn walk<'a>(root: &'a Value, steps: &[PathStep]) -> Result<&'a Value, ScrapeError> {
    let mut current = root;
    let mut trail = String::new();
    for step in steps {
        match *step {
            Field(name) => {
                if !trail.is_empty() {
                    trail.push('.');
                }
                trail.push_str(name);
                current = current.get(name).ok_or_else(|| ScrapeError::schema(trail.clone()))?;
            }
            Index(index) => {
                trail.push_str(&format!("[{index}]"));
                current = current.get(index).ok_or_else(|| ScrapeError::schema(trail.clone()))?;
            }
        }
    }
    Ok(current)
}

/// Optional variant of [`walk`] for paths that are allowed to be absent.
pub(crate) fn get_path<'a>(root: &'a Value, steps: &[PathStep]) -> Option<&'a Value> {
    let mut current = root;
    for step in steps {
        current = match *step {
            Field(name) => current.get(name)?,
            Index(index) => current.get(index)?,
        };
    }
    Some(current)
}

fn section_label(section: &Value) -> Option<&str> {
    get_path(section, SECTION_HEADER_PATH)?.as_str()
}

/// Splits the feed's section list into today/yesterday buckets.
///
/// The feed orders sections newest-first, so only indices 0 and 1 can
/// hold the two periods of interest. A section at those indices whose
/// header matches neither label (or has no readable header) is ignored;
/// the fixed path to the section list itself being absent is a schema
/// mismatch and fails the invocation.
pub fn locate_history_buckets<'a>(state: &'a Value, config: &LocatorConfig) -> Result<HistoryBuckets<'a>, ScrapeError> {
    let sections = walk(state, config.section_path)?
        .as_array()
        .ok_or_else(|| ScrapeError::schema("sectionListRenderer.contents (expected an array)"))?;

    let mut buckets = HistoryBuckets::default();
    for section in sections.iter().take(2) {
        let Some(label) = section_label(section) else {
            continue;
        };
        let slot = if label == config.today_label {
            &mut buckets.today
        } else if label == config.yesterday_label {
            &mut buckets.yesterday
        } else {
            continue;
        };
        let items = walk(section, SECTION_ITEMS_PATH)?
            .as_array()
            .ok_or_else(|| ScrapeError::schema("itemSectionRenderer.contents (expected an array)"))?;
        *slot = Some(items.as_slice());
    }
    Ok(buckets)
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::ScrapeErrorKind;

    pub(crate) fn section(label: &str, items: Vec<Value>) -> Value {
        json!({
            "itemSectionRenderer": {
                "header": {"itemSectionHeaderRenderer": {"title": {"runs": [{"text": label}]}}},
                "contents": items,
            }
        })
    }

    pub(crate) fn state_with_sections(sections: Vec<Value>) -> Value {
        json!({
            "contents": {
                "twoColumnBrowseResultsRenderer": {
                    "tabs": [{
                        "tabRenderer": {"content": {"sectionListRenderer": {"contents": sections}}}
                    }]
                }
            }
        })
    }

    #[test]
    fn finds_both_buckets() {
        let state = state_with_sections(vec![
            section("Today", vec![json!({"a": 1})]),
            section("Yesterday", vec![json!({"b": 2}), json!({"c": 3})]),
        ]);
        let buckets = locate_history_buckets(&state, &LocatorConfig::default()).unwrap();
        assert_eq!(buckets.today.unwrap().len(), 1);
        assert_eq!(buckets.yesterday.unwrap().len(), 2);
    }

    #[test]
    fn first_section_may_be_yesterday() {
        // no activity today yet
        let state = state_with_sections(vec![section("Yesterday", vec![json!({"b": 2})])]);
        let buckets = locate_history_buckets(&state, &LocatorConfig::default()).unwrap();
        assert!(buckets.today.is_none());
        assert_eq!(buckets.yesterday.unwrap().len(), 1);
    }

    #[test]
    fn unrelated_labels_leave_buckets_unset() {
        let state = state_with_sections(vec![
            section("Last week", vec![json!({"a": 1})]),
            section("Older", vec![json!({"b": 2})]),
        ]);
        let buckets = locate_history_buckets(&state, &LocatorConfig::default()).unwrap();
        assert!(buckets.today.is_none());
        assert!(buckets.yesterday.is_none());
    }

    #[test]
    fn only_the_first_two_sections_are_considered() {
        let state = state_with_sections(vec![
            section("Last week", vec![]),
            section("Older", vec![]),
            section("Today", vec![json!({"a": 1})]),
        ]);
        let buckets = locate_history_buckets(&state, &LocatorConfig::default()).unwrap();
        assert!(buckets.today.is_none());
    }

    #[test]
    fn missing_feed_container_is_a_schema_error() {
        let state = json!({"contents": {"somethingElseEntirely": {}}});
        let err = locate_history_buckets(&state, &LocatorConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ScrapeErrorKind::Schema);
        let ScrapeError::Schema { path } = err else {
            panic!("expected a schema error");
        };
        assert_eq!(path, "contents.twoColumnBrowseResultsRenderer");
    }
}
