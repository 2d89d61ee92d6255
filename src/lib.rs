pub mod error;
pub mod feed;
pub mod http;
pub mod playback;
pub mod shell;

// Re-export main types for convenience
pub use error::{DeviceError, FeedError, ShellError};
pub use feed::{Episode, EpisodeId, FeedClient, FeedData, HttpFeedClient, is_url};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use playback::{
    AudioDevice, AudioElementAdapter, EpisodeWidget, NativeEvent, PlaybackCoordinator,
    PlaybackPhase, PlaybackState, WidgetDirectory, WidgetIntent,
};
pub use shell::{Shell, ShellConfig, VirtualDevice};
