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

use std::{error::Error, fmt::{Debug, Display}};

use cloneable_errors::ErrorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ScrapeErrorKind {
    Network,
    Parse,
    Schema,
    Store,
}

/// A failed pipeline invocation. Whole-invocation failures only: a
/// scrape either yields the full bucket pair or one of these.
#[derive(Clone)]
pub enum ScrapeError {
    /// Transport failure or non-success status while fetching the page.
    Network(ErrorContext),
    /// The embedded variable was absent or its value was not valid JSON.
    Parse(ErrorContext),
    /// A hop of the fixed navigation path was missing. `path` names the
    /// hop that failed, not the whole traversal.
    Schema { path: String },
    /// The duration store could not be read during normalization.
    Store(ErrorContext),
}

impl ScrapeError {
    pub fn schema<P: Into<String>>(path: P) -> ScrapeError {
        ScrapeError::Schema { path: path.into() }
    }

    pub fn kind(&self) -> ScrapeErrorKind {
        match self {
            ScrapeError::Network(..) => ScrapeErrorKind::Network,
            ScrapeError::Parse(..) => ScrapeErrorKind::Parse,
            ScrapeError::Schema { .. } => ScrapeErrorKind::Schema,
            ScrapeError::Store(..) => ScrapeErrorKind::Store,
        }
    }
}

impl Display for ScrapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeError::Network(ref err) => write!(f, "Network error: {err}"),
            ScrapeError::Parse(ref err) => write!(f, "Parse error: {err}"),
            ScrapeError::Schema { ref path } => write!(f, "Schema error: expected path {path} was missing from the payload"),
            ScrapeError::Store(ref err) => write!(f, "Duration store error: {err}"),
        }
    }
}

impl Debug for ScrapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeError::Network(ref err) | ScrapeError::Parse(ref err) | ScrapeError::Store(ref err) => write!(f, "{}: {err:?}", self.kind()),
            ScrapeError::Schema { .. } => write!(f, "{self}"),
        }
    }
}

impl Error for ScrapeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScrapeError::Network(ref err) | ScrapeError::Parse(ref err) | ScrapeError::Store(ref err) => Some(err),
            ScrapeError::Schema { .. } => None,
        }
    }
}
