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
use regex::Regex;
use serde_json::Value;

use crate::errors::ScrapeError;

/// Pulls the value of an inline `var <name> = <value>;` assignment out
/// of page markup and parses it as JSON.
///
/// The value is taken non-greedily up to the next `var` declaration or
/// the end of the script block, mirroring how the page itself lays out
/// its init script. That termination heuristic is not a contract we
/// control: if the captured text does not parse, the error propagates
/// rather than triggering any recovery attempt.
///
/// Returns `Ok(None)` when the variable is simply absent.
pub fn extract_named_var(markup: &str, var_name: &str) -> Result<Option<Value>, ScrapeError> {
    let pattern = format!("var {} = (.*?);(?:var|</script>)", regex::escape(var_name));
    let regex = Regex::new(&pattern).expect("Should be able to parse the embedded variable regex");
    let Some(captures) = regex.captures(markup) else {
        return Ok(None);
    };
    match serde_json::from_str(&captures[1]) {
        Ok(value) => Ok(Some(value)),
        Err(err) => Err(ScrapeError::Parse(err.context(format!("Embedded variable {var_name} held invalid JSON")))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::ScrapeErrorKind;

    #[test]
    fn extracts_value_between_markers() {
        // the title contains the substring "var" on purpose
        let markup = r#"<script>var ytInitialData = {"contents":{"items":[{"title":"how to var dump in php"}]}};var ytcfg = {"a":1};</script>"#;
        let value = extract_named_var(markup, "ytInitialData").unwrap().unwrap();
        assert_eq!(
            value,
            json!({"contents": {"items": [{"title": "how to var dump in php"}]}})
        );
    }

    #[test]
    fn extracts_value_terminated_by_script_close() {
        let markup = r#"<script>var ytInitialData = {"contents":{}};</script>"#;
        let value = extract_named_var(markup, "ytInitialData").unwrap().unwrap();
        assert_eq!(value, json!({"contents": {}}));
    }

    #[test]
    fn absent_variable_is_none_not_an_error() {
        let markup = r#"<script>var somethingElse = {};</script>"#;
        assert!(extract_named_var(markup, "ytInitialData").unwrap().is_none());
    }

    #[test]
    fn malformed_value_is_a_parse_error() {
        let markup = r#"<script>var ytInitialData = window.something;var x = 1;</script>"#;
        let err = extract_named_var(markup, "ytInitialData").unwrap_err();
        assert_eq!(err.kind(), ScrapeErrorKind::Parse);
    }
}
