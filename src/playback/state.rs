// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::feed::EpisodeId;

/// The three reachable playback states
///
/// Playing without an active episode is not representable. There is no way
/// back to `Idle` once an episode has been activated; a stopped episode is
/// `Paused`, the same way a paused media element keeps its source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Paused(EpisodeId),
    Playing(EpisodeId),
}

/// Immutable snapshot of the playback state, as published by the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackState {
    phase: PlaybackPhase,
}

impl PlaybackState {
    pub(crate) fn new(phase: PlaybackPhase) -> Self {
        Self { phase }
    }

    pub fn phase(&self) -> &PlaybackPhase {
        &self.phase
    }

    /// The episode bound to the audio device, playing or not
    pub fn active_episode(&self) -> Option<&EpisodeId> {
        match &self.phase {
            PlaybackPhase::Idle => None,
            PlaybackPhase::Paused(id) | PlaybackPhase::Playing(id) => Some(id),
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, PlaybackPhase::Playing(_))
    }

    pub fn is_active(&self, id: &EpisodeId) -> bool {
        self.active_episode() == Some(id)
    }

    pub(crate) fn with_playing(&self, is_playing: bool) -> Self {
        let phase = match (&self.phase, is_playing) {
            (PlaybackPhase::Idle, _) => PlaybackPhase::Idle,
            (PlaybackPhase::Paused(id) | PlaybackPhase::Playing(id), true) => {
                PlaybackPhase::Playing(id.clone())
            }
            (PlaybackPhase::Paused(id) | PlaybackPhase::Playing(id), false) => {
                PlaybackPhase::Paused(id.clone())
            }
        };
        Self { phase }
    }
}
