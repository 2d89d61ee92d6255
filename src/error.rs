// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching or parsing RSS feeds
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("No RSS feed found at {url}")]
    NotFound { url: String },

    #[error("Failed to read feed file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FeedError {
    /// Whether this error means "there is no feed here" rather than "fetching broke"
    pub fn is_not_found(&self) -> bool {
        matches!(self, FeedError::NotFound { .. })
    }
}

/// Errors reported synchronously by an audio device
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("No audio source has been set")]
    NoSource,

    #[error("Playback was rejected by the device: {reason}")]
    Rejected { reason: String },
}

/// Errors that end the interactive shell
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Failed to read terminal input: {0}")]
    Input(#[from] std::io::Error),

    #[error("Failed to render feed as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to format screen: {0}")]
    Format(#[from] std::fmt::Error),
}
