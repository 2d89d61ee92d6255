// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The playback-synchronization state machine.
//!
//! Two event sources drive it: widget intents (a user pressed play or pause on
//! an episode) and native events (the device confirmed, or was externally
//! driven into, a transition). Widget intents may call into the adapter; native
//! events only ever update state and widgets, which is what keeps a device
//! confirmation from turning into another device request.
//!
//! Device confirmations can arrive after the request they confirm has been
//! superseded. They are applied to whatever episode is active at the time they
//! are handled, and since every update is idempotent a stale confirmation is
//! overwritten by the next one.

use std::collections::HashMap;

use tokio::sync::watch;
use url::Url;

use crate::feed::{Episode, EpisodeId};

use super::adapter::{AudioDevice, AudioElementAdapter, NativeEvent};
use super::state::{PlaybackPhase, PlaybackState};
use super::widget::{WidgetDirectory, WidgetIntent};

/// Sole owner of [`PlaybackState`] and of the audio adapter
pub struct PlaybackCoordinator<D: AudioDevice> {
    adapter: AudioElementAdapter<D>,
    /// Audio sources of the currently mounted episodes
    mounted: HashMap<EpisodeId, Url>,
    state: PlaybackState,
    published: watch::Sender<PlaybackState>,
}

impl<D: AudioDevice> PlaybackCoordinator<D> {
    pub fn new(adapter: AudioElementAdapter<D>) -> Self {
        let state = PlaybackState::default();
        let (published, _) = watch::channel(state.clone());

        Self {
            adapter,
            mounted: HashMap::new(),
            state,
            published,
        }
    }

    /// Replace the set of mounted episodes
    ///
    /// The active episode, if any, stays active even when it is not part of
    /// the new set: the device keeps its source until another episode is played.
    pub fn mount(&mut self, episodes: &[Episode]) {
        self.mounted = episodes
            .iter()
            .map(|episode| (episode.id.clone(), episode.audio_url.clone()))
            .collect();
        tracing::debug!(count = self.mounted.len(), "episodes mounted");
    }

    pub fn state(&self) -> PlaybackState {
        self.state.clone()
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.published.subscribe()
    }

    pub fn current_source(&self) -> Option<&Url> {
        self.adapter.source()
    }

    pub fn on_widget_intent(&mut self, intent: WidgetIntent, widgets: &mut dyn WidgetDirectory) {
        let WidgetIntent {
            episode_id,
            requested_playing,
        } = intent;

        let Some(source) = self.mounted.get(&episode_id).cloned() else {
            tracing::warn!(episode = %episode_id, "ignoring intent for an episode that is not mounted");
            return;
        };

        let is_active = self.state.is_active(&episode_id);

        match (requested_playing, is_active) {
            (true, false) => {
                if let Some(previous) = self.state.active_episode().cloned() {
                    force_playback(widgets, &previous, false);
                }
                tracing::debug!(episode = %episode_id, %source, "switching audio source");
                self.adapter.set_source(&source);
                self.request_play(episode_id, widgets);
            }
            (true, true) => self.request_play(episode_id, widgets),
            (false, true) => {
                self.adapter.pause();
                self.transition(PlaybackPhase::Paused(episode_id));
            }
            (false, false) => {
                tracing::debug!(episode = %episode_id, "ignoring pause from an inactive episode");
            }
        }
    }

    pub fn on_adapter_event(&mut self, event: NativeEvent, widgets: &mut dyn WidgetDirectory) {
        self.adapter.observe(event);

        let Some(active) = self.state.active_episode().cloned() else {
            tracing::debug!(?event, "ignoring native event while idle");
            return;
        };

        let is_playing = event == NativeEvent::Play;
        let phase = if is_playing {
            PlaybackPhase::Playing(active.clone())
        } else {
            PlaybackPhase::Paused(active.clone())
        };

        self.transition(phase);
        force_playback(widgets, &active, is_playing);
    }

    fn request_play(&mut self, episode_id: EpisodeId, widgets: &mut dyn WidgetDirectory) {
        match self.adapter.play() {
            Ok(()) => self.transition(PlaybackPhase::Playing(episode_id)),
            Err(err) => {
                tracing::warn!(episode = %episode_id, %err, "audio device refused to play");
                force_playback(widgets, &episode_id, false);
                self.transition(PlaybackPhase::Paused(episode_id));
            }
        }
    }

    fn transition(&mut self, phase: PlaybackPhase) {
        let next = PlaybackState::new(phase);
        if next == self.state {
            return;
        }

        tracing::debug!(from = ?self.state.phase(), to = ?next.phase(), "playback state changed");
        self.state = next;
        self.published.send_replace(self.state.clone());
    }
}

fn force_playback(widgets: &mut dyn WidgetDirectory, id: &EpisodeId, is_playing: bool) {
    match widgets.widget_mut(id) {
        Some(widget) => widget.force_playback(is_playing),
        None => tracing::debug!(episode = %id, "no mounted widget to update"),
    }
}
