// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ownership of the single audio output device.
//!
//! [`AudioDevice`] is the native media element: it accepts transport requests
//! and reports confirmed transitions through listeners, possibly later and
//! possibly never. [`AudioElementAdapter`] is the only thing allowed to call
//! its primitives.

use url::Url;

use crate::error::DeviceError;

/// A transition reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEvent {
    Play,
    Pause,
}

/// Registration token returned by [`AudioDevice::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type NativeListener = Box<dyn Fn(NativeEvent) + Send + Sync>;

/// The native single-output playback device
///
/// `play` and `pause` are requests. The device confirms a transition by
/// invoking its listeners, whether the transition was requested through this
/// trait or triggered by the device's own controls.
pub trait AudioDevice {
    fn set_source(&mut self, url: &Url);

    /// Request playback. An `Err` means the request was refused outright.
    fn play(&mut self) -> Result<(), DeviceError>;

    fn pause(&mut self);

    fn add_listener(&mut self, listener: NativeListener) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);
}

/// What the adapter knows about the device transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Paused,
    PlayRequested,
    Playing,
    PauseRequested,
}

/// Wraps the audio device and makes its transitions idempotent
///
/// Registers one listener on construction and removes it on drop, so a
/// discarded adapter never leaves callbacks on the device.
pub struct AudioElementAdapter<D: AudioDevice> {
    device: D,
    listener: ListenerId,
    source: Option<Url>,
    transport: Transport,
}

impl<D: AudioDevice> AudioElementAdapter<D> {
    /// Take ownership of `device` and forward every native transition to `on_native_event`
    pub fn attach<F>(mut device: D, on_native_event: F) -> Self
    where
        F: Fn(NativeEvent) + Send + Sync + 'static,
    {
        let listener = device.add_listener(Box::new(on_native_event));
        tracing::debug!(?listener, "audio device listener registered");

        Self {
            device,
            listener,
            source: None,
            transport: Transport::Paused,
        }
    }

    pub fn source(&self) -> Option<&Url> {
        self.source.as_ref()
    }

    /// Whether the device last confirmed that it is playing
    pub fn is_playing(&self) -> bool {
        self.transport == Transport::Playing
    }

    /// Swap the media source. Loading a new source leaves the device paused.
    pub fn set_source(&mut self, url: &Url) {
        if self.source.as_ref() == Some(url) {
            return;
        }

        tracing::debug!(%url, "setting audio source");
        self.device.set_source(url);
        self.source = Some(url.clone());
        self.transport = Transport::Paused;
    }

    pub fn play(&mut self) -> Result<(), DeviceError> {
        if matches!(self.transport, Transport::Playing | Transport::PlayRequested) {
            return Ok(());
        }
        if self.source.is_none() {
            return Err(DeviceError::NoSource);
        }

        tracing::debug!("requesting play");
        self.device.play()?;
        self.transport = Transport::PlayRequested;
        Ok(())
    }

    pub fn pause(&mut self) {
        if matches!(self.transport, Transport::Paused | Transport::PauseRequested) {
            return;
        }

        tracing::debug!("requesting pause");
        self.device.pause();
        self.transport = Transport::PauseRequested;
    }

    /// Record a transition the device has confirmed
    pub fn observe(&mut self, event: NativeEvent) {
        self.transport = match event {
            NativeEvent::Play => Transport::Playing,
            NativeEvent::Pause => Transport::Paused,
        };
    }
}

impl<D: AudioDevice> Drop for AudioElementAdapter<D> {
    fn drop(&mut self) {
        self.device.remove_listener(self.listener);
        tracing::debug!(listener = ?self.listener, "audio device listener removed");
    }
}
