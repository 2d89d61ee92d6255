mod fetch;
mod parse;

pub use fetch::{FeedClient, HttpFeedClient, fetch_feed, is_url, parse_feed_file};
pub use parse::{EpisodeId, Episode, EpisodeMetadata, FeedData, FeedImage, parse_feed, plain_text};
