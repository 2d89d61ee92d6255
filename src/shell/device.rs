// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A virtual media element for the terminal.
//!
//! It keeps the transport state of a real audio element (source, playing or
//! paused) and confirms requested transitions asynchronously after a fixed
//! latency, the way a browser confirms `play()` once media is ready. It does
//! not decode or output audio.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use url::Url;

use crate::error::DeviceError;
use crate::playback::{AudioDevice, ListenerId, NativeEvent, NativeListener};

type SharedListener = Arc<dyn Fn(NativeEvent) + Send + Sync>;

#[derive(Default)]
struct Transport {
    source: Option<Url>,
    playing: bool,
    /// Target of the request still waiting for its confirmation
    pending: Option<bool>,
    /// Bumped on every request; a pending confirmation only lands if it is still current
    generation: u64,
    listeners: Vec<(ListenerId, SharedListener)>,
    next_listener: u64,
}

/// The device's own transport buttons, usable without going through the adapter
pub trait NativeControls {
    fn press_play(&self);
    fn press_pause(&self);
}

pub struct VirtualDevice {
    transport: Arc<Mutex<Transport>>,
    latency: Duration,
}

impl VirtualDevice {
    pub fn new(latency: Duration) -> Self {
        Self {
            transport: Arc::new(Mutex::new(Transport::default())),
            latency,
        }
    }

    /// Handle to the device's built-in controls
    pub fn controls(&self) -> VirtualControls {
        VirtualControls {
            transport: self.transport.clone(),
            latency: self.latency,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.transport.lock().playing
    }
}

impl AudioDevice for VirtualDevice {
    fn set_source(&mut self, url: &Url) {
        let mut transport = self.transport.lock();
        transport.source = Some(url.clone());
        // Loading a new source pauses silently and cancels pending confirmations
        transport.playing = false;
        transport.pending = None;
        transport.generation += 1;
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        if self.transport.lock().source.is_none() {
            return Err(DeviceError::NoSource);
        }
        schedule(&self.transport, self.latency, true);
        Ok(())
    }

    fn pause(&mut self) {
        schedule(&self.transport, self.latency, false);
    }

    fn add_listener(&mut self, listener: NativeListener) -> ListenerId {
        let mut transport = self.transport.lock();
        let id = ListenerId(transport.next_listener);
        transport.next_listener += 1;
        transport.listeners.push((id, Arc::from(listener)));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.transport
            .lock()
            .listeners
            .retain(|(existing, _)| *existing != id);
    }
}

#[derive(Clone)]
pub struct VirtualControls {
    transport: Arc<Mutex<Transport>>,
    latency: Duration,
}

impl NativeControls for VirtualControls {
    fn press_play(&self) {
        if self.transport.lock().source.is_none() {
            tracing::debug!("native play pressed without a source");
            return;
        }
        schedule(&self.transport, self.latency, true);
    }

    fn press_pause(&self) {
        schedule(&self.transport, self.latency, false);
    }
}

fn schedule(transport: &Arc<Mutex<Transport>>, latency: Duration, playing: bool) {
    let (generation, reverses) = {
        let mut transport = transport.lock();
        // Reversing a pending request is reported even if the transport ends where it started
        let reverses = transport.pending.replace(playing) == Some(!playing);
        transport.generation += 1;
        (transport.generation, reverses)
    };

    if latency.is_zero() {
        settle(transport, generation, playing, reverses);
    } else {
        let transport = transport.clone();
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            settle(&transport, generation, playing, reverses);
        });
    }
}

fn settle(transport: &Arc<Mutex<Transport>>, generation: u64, playing: bool, reverses: bool) {
    let listeners: Vec<SharedListener> = {
        let mut transport = transport.lock();
        if transport.generation != generation {
            return;
        }
        transport.pending = None;
        if transport.playing == playing && !reverses {
            return;
        }
        transport.playing = playing;
        transport.listeners.iter().map(|(_, l)| l.clone()).collect()
    };

    let event = if playing {
        NativeEvent::Play
    } else {
        NativeEvent::Pause
    };
    tracing::debug!(?event, "virtual device transition");

    for listener in listeners {
        listener(event);
    }
}
