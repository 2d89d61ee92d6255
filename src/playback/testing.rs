// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recording doubles for the device and widget collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use url::Url;

use crate::error::DeviceError;
use crate::feed::EpisodeId;

use super::adapter::{AudioDevice, ListenerId, NativeEvent, NativeListener};
use super::widget::{EpisodeWidget, WidgetDirectory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    SetSource(Url),
    Play,
    Pause,
}

#[derive(Default)]
struct DeviceInner {
    calls: Vec<DeviceCall>,
    listeners: Vec<(ListenerId, Arc<dyn Fn(NativeEvent) + Send + Sync>)>,
    next_listener: u64,
    reject_next_play: Option<String>,
}

/// Device that records every primitive call and only reports transitions when told to
#[derive(Clone, Default)]
pub struct MockDevice {
    inner: Arc<Mutex<DeviceInner>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &DeviceCall) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().listeners.len()
    }

    pub fn reject_next_play(&self, reason: &str) {
        self.inner.lock().unwrap().reject_next_play = Some(reason.to_string());
    }

    /// Report a transition to all listeners, as the native element would
    pub fn emit(&self, event: NativeEvent) {
        let listeners: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl AudioDevice for MockDevice {
    fn set_source(&mut self, url: &Url) {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(DeviceCall::SetSource(url.clone()));
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(DeviceCall::Play);
        match inner.reject_next_play.take() {
            Some(reason) => Err(DeviceError::Rejected { reason }),
            None => Ok(()),
        }
    }

    fn pause(&mut self) {
        self.inner.lock().unwrap().calls.push(DeviceCall::Pause);
    }

    fn add_listener(&mut self, listener: NativeListener) -> ListenerId {
        let mut inner = self.inner.lock().unwrap();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Arc::from(listener)));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.inner
            .lock()
            .unwrap()
            .listeners
            .retain(|(existing, _)| *existing != id);
    }
}

/// Widget that remembers what it shows and every forced command it received
pub struct RecordingWidget {
    id: EpisodeId,
    pub showing_playing: bool,
    pub commands: Vec<bool>,
}

impl EpisodeWidget for RecordingWidget {
    fn episode_id(&self) -> &EpisodeId {
        &self.id
    }

    fn force_playback(&mut self, is_playing: bool) {
        self.commands.push(is_playing);
        self.showing_playing = is_playing;
    }
}

/// Mounted recording widgets keyed by episode
#[derive(Default)]
pub struct MockWidgets {
    widgets: HashMap<EpisodeId, RecordingWidget>,
}

impl MockWidgets {
    pub fn with(ids: &[&str]) -> Self {
        let widgets = ids
            .iter()
            .map(|id| {
                let id = EpisodeId::new(*id);
                let widget = RecordingWidget {
                    id: id.clone(),
                    showing_playing: false,
                    commands: Vec::new(),
                };
                (id, widget)
            })
            .collect();
        Self { widgets }
    }

    /// Simulate the user pressing the widget's own control
    pub fn press(&mut self, id: &str, playing: bool) {
        if let Some(w) = self.widgets.get_mut(&EpisodeId::new(id)) {
            w.showing_playing = playing;
        }
    }

    pub fn commands(&self, id: &str) -> Vec<bool> {
        self.widgets
            .get(&EpisodeId::new(id))
            .map(|w| w.commands.clone())
            .unwrap_or_default()
    }

    pub fn total_commands(&self) -> usize {
        self.widgets.values().map(|w| w.commands.len()).sum()
    }

    pub fn showing_playing(&self, id: &str) -> bool {
        self.widgets
            .get(&EpisodeId::new(id))
            .is_some_and(|w| w.showing_playing)
    }

    pub fn playing_count(&self) -> usize {
        self.widgets
            .values()
            .filter(|w| w.showing_playing)
            .count()
    }

    pub fn unmount(&mut self, id: &str) {
        self.widgets.remove(&EpisodeId::new(id));
    }
}

impl WidgetDirectory for MockWidgets {
    fn widget_mut(&mut self, id: &EpisodeId) -> Option<&mut dyn EpisodeWidget> {
        self.widgets
            .get_mut(id)
            .map(|w| w as &mut dyn EpisodeWidget)
    }
}
