// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt::{self, Write};

use colored::Colorize;
use console::Emoji;
use url::Url;

use crate::error::{FeedError, ShellError};
use crate::feed::FeedData;
use crate::playback::PlaybackState;

use super::widgets::WidgetBoard;

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static HOURGLASS: Emoji<'_, '_> = Emoji("⏳ ", "[~] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[?] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static PLAYING: Emoji<'_, '_> = Emoji("▶ ", "> ");
static PAUSED: Emoji<'_, '_> = Emoji("⏸ ", "| ");
static EXPANDED: Emoji<'_, '_> = Emoji("▼ ", "v ");
static COLLAPSED: Emoji<'_, '_> = Emoji("▶ ", "> ");

/// The shell's projection of the feed request
#[derive(Debug)]
pub enum FeedView {
    Pending { source: String },
    Loaded(FeedData),
    NotFound { source: String },
    Failed { message: String },
}

impl FeedView {
    pub fn from_result(source: &str, result: Result<FeedData, FeedError>) -> Self {
        match result {
            Ok(feed) => FeedView::Loaded(feed),
            Err(err) if err.is_not_found() => FeedView::NotFound {
                source: source.to_string(),
            },
            Err(err) => FeedView::Failed {
                message: err.to_string(),
            },
        }
    }

    pub fn feed(&self) -> Option<&FeedData> {
        match self {
            FeedView::Loaded(feed) => Some(feed),
            _ => None,
        }
    }
}

/// Everything the screen shows
pub struct Screen<'a> {
    pub view: &'a FeedView,
    pub widgets: &'a WidgetBoard,
    pub playback: &'a PlaybackState,
    pub source: Option<&'a Url>,
    pub feed_source: &'a str,
    pub show_json: bool,
    pub notice: Option<&'a str>,
}

impl Screen<'_> {
    pub fn render(&self) -> Result<String, ShellError> {
        let json = match (self.show_json, self.view.feed()) {
            (true, Some(feed)) => Some(serde_json::to_string_pretty(feed)?),
            _ => None,
        };

        let mut out = String::new();
        self.write_screen(&mut out, json.as_deref())?;
        Ok(out)
    }

    fn write_screen(&self, out: &mut String, json: Option<&str>) -> fmt::Result {
        writeln!(
            out,
            "\n{}{} {}\n",
            MICROPHONE,
            "podplay".bold().magenta(),
            "- Podcast Episodes".dimmed()
        )?;

        match self.view {
            FeedView::Pending { source } => {
                writeln!(out, "{HOURGLASS}Loading feed {} ...", source.cyan())?;
            }
            FeedView::Failed { message } => {
                writeln!(
                    out,
                    "{FAILURE}{} {}",
                    "Uh oh, something went wrong:".red().bold(),
                    message.red()
                )?;
            }
            FeedView::NotFound { source } => {
                writeln!(
                    out,
                    "{SEARCH}{} {}",
                    "Could not find an RSS feed at that url.".yellow(),
                    source.dimmed()
                )?;
            }
            FeedView::Loaded(feed) => self.write_feed(out, feed, json)?,
        }

        self.write_player(out)?;

        if let Some(notice) = self.notice {
            writeln!(out, "\n{notice}")?;
        }

        write!(out, "\n{} ", "podcast url (rss) or command:".dimmed())
    }

    fn write_feed(&self, out: &mut String, feed: &FeedData, json: Option<&str>) -> fmt::Result {
        writeln!(out, "{HEADPHONES}{}", feed.title.bold().green())?;
        if let Some(image) = &feed.image {
            writeln!(out, "   {}", image.uri.as_str().dimmed())?;
        }
        writeln!(out)?;

        if self.widgets.is_empty() {
            writeln!(out, "{}", "This feed has no playable episodes.".yellow())?;
        }

        for (index, widget) in self.widgets.iter().enumerate() {
            let props = widget.props();
            let marker = if widget.is_playing() { &PLAYING } else { &PAUSED };
            let number = format!("[{}]", index + 1);
            let title = truncate(&props.title, 60);
            let title = if self.playback.is_active(&props.episode_id) {
                title.bold().green().to_string()
            } else {
                title
            };

            writeln!(out, "  {marker}{} {}", number.cyan(), title)?;
            if let Some(description) = &props.description {
                writeln!(out, "       {}", truncate(description, 72).dimmed())?;
            }
        }

        writeln!(out, "\n{}", "-".repeat(40).dimmed())?;
        match json {
            Some(json) => writeln!(out, "{EXPANDED}{}\n{json}", "Normalized feed data".bold()),
            None => writeln!(
                out,
                "{COLLAPSED}{}",
                "Type `json` to show the normalized feed data".dimmed()
            ),
        }
    }

    fn write_player(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "\n{}", "Player".bold())?;

        let Some(active) = self.playback.active_episode() else {
            writeln!(out, "  {}", "idle".dimmed())?;
            return writeln!(out, "  feed: {}", self.feed_source.cyan());
        };

        let title = self
            .widgets
            .iter()
            .find(|w| &w.props().episode_id == active)
            .map(|w| truncate(&w.props().title, 60))
            .unwrap_or_else(|| active.to_string());

        let status = if self.playback.is_playing() {
            "playing".green().bold()
        } else {
            "paused".yellow()
        };

        writeln!(out, "  {} ({status})", title)?;
        if let Some(source) = self.source {
            writeln!(out, "  {}", source.as_str().dimmed())?;
        }
        writeln!(out, "  feed: {}", self.feed_source.cyan())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::mpsc;

    use crate::feed::{Episode, EpisodeId, EpisodeMetadata};
    use crate::playback::PlaybackPhase;

    fn feed() -> FeedData {
        FeedData {
            title: "Test Podcast".to_string(),
            description: None,
            link: None,
            image: None,
            feed_url: Url::parse("https://example.com/feed.xml").unwrap(),
            episodes: vec![Episode {
                id: EpisodeId::new("ep1"),
                position: 0,
                title: "Episode One".to_string(),
                audio_url: Url::parse("https://example.com/ep1.mp3").unwrap(),
                metadata: EpisodeMetadata::default(),
            }],
        }
    }

    fn render(view: &FeedView, widgets: &WidgetBoard, playback: &PlaybackState, show_json: bool) -> String {
        colored::control::set_override(false);
        Screen {
            view,
            widgets,
            playback,
            source: None,
            feed_source: "https://example.com/feed.xml",
            show_json,
            notice: None,
        }
        .render()
        .unwrap()
    }

    #[test]
    fn errors_are_classified_for_display() {
        let not_found = FeedView::from_result(
            "https://example.com",
            Err(FeedError::NotFound {
                url: "https://example.com".to_string(),
            }),
        );
        assert!(matches!(not_found, FeedView::NotFound { .. }));

        let failed = FeedView::from_result(
            "https://example.com",
            Err(FeedError::HttpStatus {
                url: "https://example.com".to_string(),
                status: 500,
            }),
        );
        assert!(matches!(failed, FeedView::Failed { .. }));
    }

    #[test]
    fn render_shows_distinct_messages() {
        let widgets = WidgetBoard::default();
        let playback = PlaybackState::default();

        let failed = render(
            &FeedView::Failed {
                message: "timeout".to_string(),
            },
            &widgets,
            &playback,
            false,
        );
        assert!(failed.contains("Uh oh, something went wrong:"));
        assert!(failed.contains("timeout"));

        let not_found = render(
            &FeedView::NotFound {
                source: "x".to_string(),
            },
            &widgets,
            &playback,
            false,
        );
        assert!(not_found.contains("Could not find an RSS feed at that url."));

        let pending = render(
            &FeedView::Pending {
                source: "x".to_string(),
            },
            &widgets,
            &playback,
            false,
        );
        assert!(pending.contains("Loading feed"));
    }

    #[test]
    fn render_lists_episodes_and_active_player() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let feed = feed();
        let mut widgets = WidgetBoard::default();
        widgets.mount(&feed.episodes, &tx, |_| true);
        let playback = PlaybackState::new(PlaybackPhase::Playing(EpisodeId::new("ep1")));

        let screen = render(&FeedView::Loaded(feed), &widgets, &playback, false);

        assert!(screen.contains("Test Podcast"));
        assert!(screen.contains("[1] Episode One"));
        assert!(screen.contains("Episode One (playing)"));
        assert!(screen.contains("Type `json`"));
    }

    #[test]
    fn json_toggle_reveals_feed_data() {
        let widgets = WidgetBoard::default();
        let playback = PlaybackState::default();

        let screen = render(&FeedView::Loaded(feed()), &widgets, &playback, true);

        assert!(screen.contains("Normalized feed data"));
        assert!(screen.contains("\"title\": \"Test Podcast\""));
        assert!(screen.contains("This feed has no playable episodes."));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ääääääääää", 6), "äää...");
    }
}
