// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use url::Url;

use crate::feed::{Episode, EpisodeId, plain_text};
use crate::playback::{EpisodeWidget, WidgetDirectory, WidgetIntent};

use super::ShellEvent;

/// Initialization parameters of an episode widget
#[derive(Debug, Clone)]
pub struct WidgetProps {
    pub episode_id: EpisodeId,
    pub position: usize,
    pub audio_url: Url,
    pub title: String,
    pub description: Option<String>,
}

impl WidgetProps {
    pub fn from_episode(episode: &Episode) -> Self {
        Self {
            episode_id: episode.id.clone(),
            position: episode.position,
            audio_url: episode.audio_url.clone(),
            title: episode.title.clone(),
            description: episode
                .metadata
                .description
                .as_deref()
                .map(plain_text)
                .filter(|s| !s.is_empty()),
        }
    }
}

/// One line in the episode list with its own play/pause toggle
pub struct TerminalWidget {
    props: WidgetProps,
    is_playing: bool,
    intents: UnboundedSender<ShellEvent>,
}

impl TerminalWidget {
    pub fn mount(props: WidgetProps, is_playing: bool, intents: UnboundedSender<ShellEvent>) -> Self {
        Self {
            props,
            is_playing,
            intents,
        }
    }

    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// The user pressed this widget's control: flip it and report the intent
    pub fn press(&mut self) {
        self.is_playing = !self.is_playing;

        let intent = WidgetIntent {
            episode_id: self.props.episode_id.clone(),
            requested_playing: self.is_playing,
        };
        if self.intents.send(ShellEvent::Intent(intent)).is_err() {
            tracing::debug!(episode = %self.props.episode_id, "shell is gone, intent dropped");
        }
    }
}

impl EpisodeWidget for TerminalWidget {
    fn episode_id(&self) -> &EpisodeId {
        &self.props.episode_id
    }

    fn force_playback(&mut self, is_playing: bool) {
        self.is_playing = is_playing;
    }
}

/// The mounted widgets, in feed order
#[derive(Default)]
pub struct WidgetBoard {
    widgets: Vec<TerminalWidget>,
    by_id: HashMap<EpisodeId, usize>,
}

impl WidgetBoard {
    /// Replace all widgets with one per distinct episode id
    pub fn mount<F>(&mut self, episodes: &[Episode], intents: &UnboundedSender<ShellEvent>, initially_playing: F)
    where
        F: Fn(&EpisodeId) -> bool,
    {
        self.clear();

        for episode in episodes {
            if self.by_id.contains_key(&episode.id) {
                tracing::warn!(episode = %episode.id, "duplicate episode id, widget not mounted");
                continue;
            }
            let props = WidgetProps::from_episode(episode);
            self.by_id.insert(props.episode_id.clone(), self.widgets.len());
            let playing = initially_playing(&props.episode_id);
            self.widgets
                .push(TerminalWidget::mount(props, playing, intents.clone()));
        }
    }

    pub fn clear(&mut self) {
        self.widgets.clear();
        self.by_id.clear();
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerminalWidget> {
        self.widgets.iter()
    }

    /// Widget by its 1-based display number
    pub fn by_number_mut(&mut self, number: usize) -> Option<&mut TerminalWidget> {
        number
            .checked_sub(1)
            .and_then(|index| self.widgets.get_mut(index))
    }

    pub fn playing_count(&self) -> usize {
        self.widgets.iter().filter(|w| w.is_playing).count()
    }
}

impl WidgetDirectory for WidgetBoard {
    fn widget_mut(&mut self, id: &EpisodeId) -> Option<&mut dyn EpisodeWidget> {
        let index = *self.by_id.get(id)?;
        self.widgets
            .get_mut(index)
            .map(|w| w as &mut dyn EpisodeWidget)
    }
}
