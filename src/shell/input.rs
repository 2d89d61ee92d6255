// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::playback::NativeEvent;

/// Key code that submits the text field
pub const ENTER_KEY_CODE: u32 = 13;

/// A key press on the input field, carrying the field's text at that moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub code: u32,
    pub value: String,
}

impl KeyPress {
    /// A line read from the terminal, which the terminal delivers on Enter
    pub fn enter(value: impl Into<String>) -> Self {
        Self {
            code: ENTER_KEY_CODE,
            value: value.into(),
        }
    }
}

/// The submitted text, if this key press submits the field
pub fn on_enter(key: KeyPress) -> Option<String> {
    (key.code == ENTER_KEY_CODE).then_some(key.value)
}

/// What a submitted line asks the shell to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a known command is passed to the feed client untouched
    LoadFeed(String),
    /// Press the play control of the episode with this 1-based number
    Press(usize),
    /// Operate the audio device's own transport controls
    Native(NativeEvent),
    ToggleJson,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let mut words = trimmed.split_whitespace();

    match (words.next(), words.next(), words.next()) {
        (None, _, _) => Command::Empty,
        (Some("q" | "quit" | "exit"), None, _) => Command::Quit,
        (Some("h" | "help" | "?"), None, _) => Command::Help,
        (Some("json"), None, _) => Command::ToggleJson,
        (Some("native"), Some("play"), None) => Command::Native(NativeEvent::Play),
        (Some("native"), Some("pause"), None) => Command::Native(NativeEvent::Pause),
        (Some("p" | "play"), Some(number), None) => match number.parse() {
            Ok(n) if n > 0 => Command::Press(n),
            _ => Command::LoadFeed(line.to_string()),
        },
        _ => Command::LoadFeed(line.to_string()),
    }
}

pub const HELP: &str = "\
Commands:
  <url or path>   load a podcast feed
  p <n>           press play/pause on episode n
  native play     press play on the audio device
  native pause    press pause on the audio device
  json            show or hide the feed as JSON
  help            show this help
  quit            exit";
