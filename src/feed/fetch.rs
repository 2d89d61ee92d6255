// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use async_trait::async_trait;
use url::Url;

use crate::error::FeedError;
use crate::http::HttpClient;

use super::parse::{FeedData, parse_feed};

/// Source of normalized feed data
///
/// One call per submitted feed source. Retrying and caching are left to
/// implementations.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, source: &str) -> Result<FeedData, FeedError>;
}

/// Feed client that reads `http(s)://` URLs over an [`HttpClient`] and
/// anything else from the local filesystem
#[derive(Clone)]
pub struct HttpFeedClient<C> {
    http: C,
}

impl<C: HttpClient> HttpFeedClient<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }
}

#[async_trait]
impl<C: HttpClient> FeedClient for HttpFeedClient<C> {
    async fn fetch(&self, source: &str) -> Result<FeedData, FeedError> {
        if is_url(source) {
            fetch_feed(&self.http, source).await
        } else {
            parse_feed_file(Path::new(source)).await
        }
    }
}

/// Fetch and parse a podcast feed from a URL
pub async fn fetch_feed<C: HttpClient>(client: &C, url: &str) -> Result<FeedData, FeedError> {
    let feed_url = Url::parse(url)?;

    let response = client
        .get(url)
        .await
        .map_err(|e| FeedError::FetchFailed {
            url: url.to_string(),
            source: e,
        })?;

    if matches!(response.status, 404 | 410) {
        return Err(FeedError::NotFound {
            url: url.to_string(),
        });
    }

    if !response.is_success() {
        return Err(FeedError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    parse_feed(&response.body, feed_url).map_err(|e| classify_parse_error(e, url))
}

/// Read and parse a podcast feed from a local file
pub async fn parse_feed_file(path: &Path) -> Result<FeedData, FeedError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FeedError::FileReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let feed_url = file_path_to_url(path);
    parse_feed(&bytes, feed_url).map_err(|e| classify_parse_error(e, &path.display().to_string()))
}

/// A document that isn't RSS at all means there is no feed at this location,
/// as opposed to a feed that is broken.
fn classify_parse_error(error: FeedError, location: &str) -> FeedError {
    match error {
        FeedError::ParseFailed(rss::Error::InvalidStartTag | rss::Error::Eof) => {
            FeedError::NotFound {
                url: location.to_string(),
            }
        }
        other => other,
    }
}

/// Construct a file:// URL for a local file path
pub fn file_path_to_url(path: &Path) -> Url {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&absolute).unwrap_or_else(|_| {
        Url::parse("file:///").expect("static file URL is valid")
    })
}

/// Determine if a string is a URL or a file path
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
