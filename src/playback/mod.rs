mod adapter;
mod coordinator;
mod state;
mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{AudioDevice, AudioElementAdapter, ListenerId, NativeEvent, NativeListener};
pub use coordinator::PlaybackCoordinator;
pub use state::{PlaybackPhase, PlaybackState};
pub use widget::{EpisodeWidget, WidgetDirectory, WidgetIntent};
