// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::feed::EpisodeId;

/// A user's request, reported by an episode widget, to start or stop that episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetIntent {
    pub episode_id: EpisodeId,
    pub requested_playing: bool,
}

impl WidgetIntent {
    pub fn play(episode_id: EpisodeId) -> Self {
        Self {
            episode_id,
            requested_playing: true,
        }
    }

    pub fn pause(episode_id: EpisodeId) -> Self {
        Self {
            episode_id,
            requested_playing: false,
        }
    }
}

/// A mounted per-episode control
///
/// Implementations emit [`WidgetIntent`]s when the user interacts with them.
/// How they render is their own business.
pub trait EpisodeWidget {
    fn episode_id(&self) -> &EpisodeId;

    /// Show the given playback state. Must not emit an intent in response.
    fn force_playback(&mut self, is_playing: bool);
}

/// Lookup of mounted widgets by episode, used to route forced playback commands
///
/// A widget that has been unmounted simply does not resolve.
pub trait WidgetDirectory {
    fn widget_mut(&mut self, id: &EpisodeId) -> Option<&mut dyn EpisodeWidget>;
}
