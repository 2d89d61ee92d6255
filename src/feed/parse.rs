// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use url::Url;

use crate::error::FeedError;

/// Stable identity of an episode within and across feed fetches
///
/// Taken from the item's `<guid>` when present, otherwise from the enclosure URL.
/// A repeated id gets the item's position appended so every episode stays addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EpisodeId(String);

impl EpisodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized podcast feed
#[derive(Debug, Clone, Serialize)]
pub struct FeedData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<FeedImage>,
    pub feed_url: Url,
    pub episodes: Vec<Episode>,
}

/// Channel artwork
#[derive(Debug, Clone, Serialize)]
pub struct FeedImage {
    pub uri: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single playable episode. Never mutated after parsing.
#[derive(Debug, Clone, Serialize)]
pub struct Episode {
    pub id: EpisodeId,
    /// Positional index of the episode in the feed
    pub position: usize,
    pub title: String,
    pub audio_url: Url,
    pub metadata: EpisodeMetadata,
}

/// Descriptive fields of an episode, all optional in RSS
#[derive(Debug, Clone, Default, Serialize)]
pub struct EpisodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

/// Parse RSS feed XML bytes into a FeedData struct
///
/// Items without a usable enclosure are skipped; positions are assigned to the
/// remaining episodes in feed order.
pub fn parse_feed(xml_bytes: &[u8], feed_url: Url) -> Result<FeedData, FeedError> {
    let channel = rss::Channel::read_from(xml_bytes)?;

    let mut seen = HashSet::new();
    let episodes = channel
        .items()
        .iter()
        .filter_map(parse_item)
        .enumerate()
        .map(|(position, mut episode)| {
            episode.position = position;
            if !seen.insert(episode.id.clone()) {
                episode.id = unique_id(&episode.id, position, &seen);
                tracing::debug!(id = %episode.id, "duplicate episode id renamed");
                seen.insert(episode.id.clone());
            }
            episode
        })
        .collect();

    let image = channel.image().and_then(parse_image).or_else(|| {
        channel
            .itunes_ext()
            .and_then(|ext| ext.image())
            .and_then(|href| Url::parse(href).ok())
            .map(|uri| FeedImage {
                uri,
                title: None,
                width: None,
                height: None,
                description: None,
            })
    });

    Ok(FeedData {
        title: channel.title().to_string(),
        description: Some(channel.description().to_string()).filter(|s| !s.is_empty()),
        link: Url::parse(channel.link()).ok(),
        image,
        feed_url,
        episodes,
    })
}

/// `<id>#<position>`, suffixed further until nothing earlier in the feed uses it
fn unique_id(id: &EpisodeId, position: usize, seen: &HashSet<EpisodeId>) -> EpisodeId {
    let mut candidate = EpisodeId::new(format!("{id}#{position}"));
    while seen.contains(&candidate) {
        candidate = EpisodeId::new(format!("{candidate}#{position}"));
    }
    candidate
}

fn parse_image(image: &rss::Image) -> Option<FeedImage> {
    Some(FeedImage {
        uri: Url::parse(image.url()).ok()?,
        title: Some(image.title().to_string()).filter(|s| !s.is_empty()),
        width: image.width().and_then(|w| w.trim().parse().ok()),
        height: image.height().and_then(|h| h.trim().parse().ok()),
        description: image.description().map(String::from),
    })
}

fn parse_item(item: &rss::Item) -> Option<Episode> {
    let title = item
        .title()
        .map(String::from)
        .unwrap_or_else(|| "Untitled Episode".to_string());

    let Some(enclosure) = item.enclosure() else {
        tracing::debug!(%title, "skipping item without enclosure");
        return None;
    };

    let audio_url = match Url::parse(enclosure.url()) {
        Ok(url) => url,
        Err(err) => {
            tracing::debug!(%title, url = enclosure.url(), %err, "skipping item with invalid enclosure url");
            return None;
        }
    };

    let id = item
        .guid()
        .map(|g| g.value().trim())
        .filter(|g| !g.is_empty())
        .map(EpisodeId::new)
        .unwrap_or_else(|| EpisodeId::new(audio_url.as_str()));

    let pub_date = item.pub_date().and_then(|date_str| {
        DateTime::parse_from_rfc2822(date_str)
            .ok()
            .or_else(|| parse_relaxed_date(date_str))
    });

    let itunes = item.itunes_ext();

    Some(Episode {
        id,
        position: 0,
        title,
        audio_url,
        metadata: EpisodeMetadata {
            description: item.description().map(String::from),
            pub_date,
            author: item
                .author()
                .map(String::from)
                .or_else(|| itunes.and_then(|ext| ext.author().map(String::from))),
            link: item.link().map(String::from),
            duration: itunes.and_then(|ext| ext.duration().map(String::from)),
            mime_type: Some(enclosure.mime_type().to_string()).filter(|s| !s.is_empty()),
            length: enclosure.length().parse().ok(),
        },
    })
}

/// Try to parse dates that don't strictly conform to RFC 2822
fn parse_relaxed_date(date_str: &str) -> Option<DateTime<FixedOffset>> {
    let formats = [
        "%a, %d %b %Y %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%:z",
        "%Y-%m-%d %H:%M:%S %z",
    ];

    formats
        .iter()
        .find_map(|format| DateTime::parse_from_str(date_str, format).ok())
}

/// Reduce an HTML description to plain text for terminal display
pub fn plain_text(html: &str) -> String {
    let mut stripped = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                stripped.push(' ');
            }
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Test Podcast</title>
    <description>A test podcast for unit testing</description>
    <link>https://example.com</link>
    <image>
      <url>https://example.com/cover.jpg</url>
      <title>Cover</title>
      <link>https://example.com</link>
      <width>88</width>
      <height>88</height>
    </image>
    <item>
      <title>Episode 1</title>
      <description>First &amp; best</description>
      <author>host@example.com</author>
      <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
      <guid>ep1-guid</guid>
      <enclosure url="https://example.com/ep1.mp3" length="1234567" type="audio/mpeg"/>
      <itunes:duration>30:00</itunes:duration>
    </item>
    <item>
      <title>Show notes only</title>
    </item>
    <item>
      <title>Episode 2</title>
      <enclosure url="https://example.com/ep2.mp3" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

    fn feed_url() -> Url {
        Url::parse("https://example.com/feed.xml").unwrap()
    }

    #[test]
    fn parse_feed_extracts_channel_fields() {
        let feed = parse_feed(SAMPLE_FEED.as_bytes(), feed_url()).unwrap();

        assert_eq!(feed.title, "Test Podcast");
        assert_eq!(
            feed.description,
            Some("A test podcast for unit testing".to_string())
        );
        assert_eq!(feed.feed_url, feed_url());

        let image = feed.image.unwrap();
        assert_eq!(image.uri.as_str(), "https://example.com/cover.jpg");
        assert_eq!(image.title, Some("Cover".to_string()));
        assert_eq!(image.width, Some(88));
        assert_eq!(image.height, Some(88));
    }

    #[test]
    fn parse_feed_skips_items_without_enclosure_and_renumbers() {
        let feed = parse_feed(SAMPLE_FEED.as_bytes(), feed_url()).unwrap();

        assert_eq!(feed.episodes.len(), 2);
        assert_eq!(feed.episodes[0].title, "Episode 1");
        assert_eq!(feed.episodes[0].position, 0);
        assert_eq!(feed.episodes[1].title, "Episode 2");
        assert_eq!(feed.episodes[1].position, 1);
    }

    #[test]
    fn episode_id_prefers_guid_then_enclosure_url() {
        let feed = parse_feed(SAMPLE_FEED.as_bytes(), feed_url()).unwrap();

        assert_eq!(feed.episodes[0].id, EpisodeId::new("ep1-guid"));
        assert_eq!(
            feed.episodes[1].id,
            EpisodeId::new("https://example.com/ep2.mp3")
        );
    }

    #[test]
    fn repeated_guids_get_distinct_ids() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Reposts</title>
    <item>
      <title>Original</title>
      <guid>dup</guid>
      <enclosure url="https://example.com/a.mp3" type="audio/mpeg"/>
    </item>
    <item>
      <title>Repost</title>
      <guid>dup</guid>
      <enclosure url="https://example.com/b.mp3" type="audio/mpeg"/>
    </item>
    <item>
      <title>Taken suffix</title>
      <guid>dup#1</guid>
      <enclosure url="https://example.com/c.mp3" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

        let feed = parse_feed(xml.as_bytes(), feed_url()).unwrap();
        let ids: Vec<&str> = feed.episodes.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["dup", "dup#1", "dup#1#2"]);
    }

    #[test]
    fn parse_feed_extracts_episode_metadata() {
        let feed = parse_feed(SAMPLE_FEED.as_bytes(), feed_url()).unwrap();
        let ep1 = &feed.episodes[0];

        assert_eq!(ep1.audio_url.as_str(), "https://example.com/ep1.mp3");
        assert_eq!(ep1.metadata.description, Some("First & best".to_string()));
        assert_eq!(ep1.metadata.author, Some("host@example.com".to_string()));
        assert_eq!(ep1.metadata.duration, Some("30:00".to_string()));
        assert_eq!(ep1.metadata.mime_type, Some("audio/mpeg".to_string()));
        assert_eq!(ep1.metadata.length, Some(1234567));
        assert!(ep1.metadata.pub_date.is_some());

        let ep2 = &feed.episodes[1];
        assert!(ep2.metadata.pub_date.is_none());
        assert!(ep2.metadata.length.is_none());
    }

    #[test]
    fn feed_serializes_for_debug_view() {
        let feed = parse_feed(SAMPLE_FEED.as_bytes(), feed_url()).unwrap();
        let json = serde_json::to_value(&feed).unwrap();

        assert_eq!(json["title"], "Test Podcast");
        assert_eq!(json["episodes"][0]["id"], "ep1-guid");
        assert_eq!(json["episodes"][1]["position"], 1);
        assert!(json["episodes"][1]["metadata"].get("pub_date").is_none());
    }

    #[test]
    fn relaxed_dates_are_accepted() {
        assert!(parse_relaxed_date("2024-01-15T08:30:00+01:00").is_some());
        assert!(parse_relaxed_date("yesterday").is_none());
    }

    #[test]
    fn plain_text_strips_tags_and_entities() {
        assert_eq!(
            plain_text("<p>Hello&nbsp;<b>world</b> &amp; friends</p>"),
            "Hello world & friends"
        );
        assert_eq!(plain_text("no markup"), "no markup");
    }
}
