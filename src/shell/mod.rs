// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Terminal composition of feed, widgets, coordinator and audio device.
//!
//! Every input (typed lines, widget intents, device callbacks, finished feed
//! fetches) goes through one queue and is handled in arrival order on a
//! single task. The feed fetch is the only thing that runs concurrently.

mod device;
mod input;
mod view;
mod widgets;

pub use device::{NativeControls, VirtualControls, VirtualDevice};
pub use input::{Command, ENTER_KEY_CODE, HELP, KeyPress, on_enter, parse_command};
pub use view::{FeedView, Screen};
pub use widgets::{TerminalWidget, WidgetBoard, WidgetProps};

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use crate::error::{FeedError, ShellError};
use crate::feed::{FeedClient, FeedData};
use crate::playback::{
    AudioDevice, AudioElementAdapter, NativeEvent, PlaybackCoordinator, PlaybackState,
    WidgetIntent,
};

/// Everything the shell reacts to
#[derive(Debug)]
pub enum ShellEvent {
    Key(KeyPress),
    Intent(WidgetIntent),
    Native(NativeEvent),
    FeedLoaded {
        request: u64,
        result: Result<FeedData, FeedError>,
    },
    InputFailed(std::io::Error),
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Startup options of the shell
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub feed_source: String,
    pub show_json: bool,
}

pub struct Shell<F: FeedClient + 'static, D: AudioDevice> {
    feed_client: Arc<F>,
    coordinator: PlaybackCoordinator<D>,
    playback: watch::Receiver<PlaybackState>,
    controls: Option<Box<dyn NativeControls>>,
    widgets: WidgetBoard,
    view: FeedView,
    feed_source: String,
    show_json: bool,
    notice: Option<String>,
    /// Number of the latest feed request; older results are dropped
    request: u64,
    needs_render: bool,
    events_tx: mpsc::UnboundedSender<ShellEvent>,
    events_rx: mpsc::UnboundedReceiver<ShellEvent>,
}

impl<F: FeedClient + 'static, D: AudioDevice> Shell<F, D> {
    pub fn new(feed_client: F, device: D, config: ShellConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let native_tx = events_tx.clone();
        let adapter = AudioElementAdapter::attach(device, move |event| {
            if native_tx.send(ShellEvent::Native(event)).is_err() {
                tracing::debug!(?event, "shell is gone, native event dropped");
            }
        });
        let coordinator = PlaybackCoordinator::new(adapter);
        let playback = coordinator.subscribe();

        Self {
            feed_client: Arc::new(feed_client),
            coordinator,
            playback,
            controls: None,
            widgets: WidgetBoard::default(),
            view: FeedView::Pending {
                source: config.feed_source.clone(),
            },
            feed_source: config.feed_source,
            show_json: config.show_json,
            notice: None,
            request: 0,
            needs_render: true,
            events_tx,
            events_rx,
        }
    }

    /// Give the shell access to the device's own transport buttons
    pub fn with_controls(mut self, controls: impl NativeControls + 'static) -> Self {
        self.controls = Some(Box::new(controls));
        self
    }

    pub fn playback(&self) -> PlaybackState {
        self.coordinator.state()
    }

    pub fn view(&self) -> &FeedView {
        &self.view
    }

    pub fn widgets(&self) -> &WidgetBoard {
        &self.widgets
    }

    pub fn show_json(&self) -> bool {
        self.show_json
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub async fn next_event(&mut self) -> Option<ShellEvent> {
        self.events_rx.recv().await
    }

    /// Run until the user quits or input ends
    pub async fn run(mut self) -> Result<(), ShellError> {
        spawn_input_reader(self.events_tx.clone());
        self.load_feed(self.feed_source.clone());

        loop {
            if self.take_render() {
                print!("{}", self.render()?);
                std::io::stdout().flush()?;
            }

            let Some(event) = self.events_rx.recv().await else {
                break;
            };
            if self.handle(event)? == Flow::Quit {
                break;
            }
        }

        println!();
        Ok(())
    }

    pub fn handle(&mut self, event: ShellEvent) -> Result<Flow, ShellError> {
        match event {
            ShellEvent::Key(key) => {
                let Some(line) = on_enter(key) else {
                    return Ok(Flow::Continue);
                };
                self.needs_render = true;
                return Ok(self.execute(parse_command(&line)));
            }
            ShellEvent::Intent(intent) => {
                self.coordinator.on_widget_intent(intent, &mut self.widgets);
                // The pressed widget changed its own indicator even if playback did not
                self.needs_render = true;
            }
            ShellEvent::Native(event) => {
                self.coordinator.on_adapter_event(event, &mut self.widgets);
            }
            ShellEvent::FeedLoaded { request, result } => {
                if request == self.request {
                    self.apply_feed(result);
                } else {
                    tracing::debug!(request, latest = self.request, "dropping superseded feed result");
                }
            }
            ShellEvent::InputFailed(err) => return Err(err.into()),
            ShellEvent::InputClosed => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    pub fn render(&self) -> Result<String, ShellError> {
        Screen {
            view: &self.view,
            widgets: &self.widgets,
            playback: &self.coordinator.state(),
            source: self.coordinator.current_source(),
            feed_source: &self.feed_source,
            show_json: self.show_json,
            notice: self.notice.as_deref(),
        }
        .render()
    }

    fn take_render(&mut self) -> bool {
        let playback_changed = self.playback.has_changed().unwrap_or(false);
        if playback_changed {
            self.playback.borrow_and_update();
        }
        std::mem::take(&mut self.needs_render) || playback_changed
    }

    fn execute(&mut self, command: Command) -> Flow {
        self.notice = None;

        match command {
            Command::LoadFeed(source) => self.load_feed(source),
            Command::Press(number) => match self.widgets.by_number_mut(number) {
                Some(widget) => widget.press(),
                None => self.notice = Some(format!("There is no episode #{number}.")),
            },
            Command::Native(event) => match &self.controls {
                Some(controls) => match event {
                    NativeEvent::Play => controls.press_play(),
                    NativeEvent::Pause => controls.press_pause(),
                },
                None => self.notice = Some("This audio device has no controls.".to_string()),
            },
            Command::ToggleJson => self.show_json = !self.show_json,
            Command::Help => self.notice = Some(HELP.to_string()),
            Command::Quit => return Flow::Quit,
            Command::Empty => {}
        }

        Flow::Continue
    }

    fn load_feed(&mut self, source: String) {
        self.request += 1;
        let request = self.request;
        tracing::debug!(request, %source, "loading feed");

        self.widgets.clear();
        self.coordinator.mount(&[]);
        self.view = FeedView::Pending {
            source: source.clone(),
        };
        self.feed_source = source.clone();
        self.needs_render = true;

        let client = self.feed_client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch(&source).await;
            if let Err(err) = &result {
                tracing::warn!(%source, %err, "feed fetch failed");
            }
            if tx.send(ShellEvent::FeedLoaded { request, result }).is_err() {
                tracing::debug!(request, "shell is gone, feed result dropped");
            }
        });
    }

    fn apply_feed(&mut self, result: Result<FeedData, FeedError>) {
        self.view = FeedView::from_result(&self.feed_source, result);

        if let Some(feed) = self.view.feed() {
            let playback = self.coordinator.state();
            self.widgets.mount(&feed.episodes, &self.events_tx, |id| {
                playback.is_active(id) && playback.is_playing()
            });
            self.coordinator.mount(&feed.episodes);
            tracing::debug!(title = %feed.title, episodes = feed.episodes.len(), "feed loaded");
        }

        self.needs_render = true;
    }
}

fn spawn_input_reader(tx: mpsc::UnboundedSender<ShellEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let event = match lines.next_line().await {
                Ok(Some(line)) => ShellEvent::Key(KeyPress::enter(line)),
                Ok(None) => ShellEvent::InputClosed,
                Err(err) => ShellEvent::InputFailed(err),
            };
            let done = !matches!(event, ShellEvent::Key(_));
            if tx.send(event).is_err() || done {
                break;
            }
        }
    });
}
