use std::fmt;

use crate::stats::{History, Stats};

/// Visual state of the play field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Style {
    #[default]
    Waiting,
    Ready,
    TooEarly,
}

/// Primary text shown on the play field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Message {
    #[default]
    Start,
    Waiting,
    Go,
    TooEarly,
    Result(u64),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Start => write!(f, "Click anywhere to start"),
            Message::Waiting => write!(f, "Wait for green..."),
            Message::Go => write!(f, "Click!"),
            Message::TooEarly => write!(f, "Too early! Click to try again"),
            Message::Result(ms) => write!(f, "Your time: {ms} ms\n\nClick to play again"),
        }
    }
}

/// Everything the game is allowed to do to the display
pub trait View {
    fn set_style(&mut self, style: Style);
    fn set_message(&mut self, message: Message);
    fn render_stats(&mut self, stats: Stats);
    fn render_history(&mut self, history: History);
}

/// Retained copy of the last values pushed through [`View`]; the terminal
/// widget draws from this.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub style: Style,
    pub message: Message,
    pub stats: Stats,
    pub history: History,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            style: Style::default(),
            message: Message::default(),
            stats: Stats::default(),
            history: History::NoData,
        }
    }
}

impl View for Screen {
    fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn set_message(&mut self, message: Message) {
        self.message = message;
    }

    fn render_stats(&mut self, stats: Stats) {
        self.stats = stats;
    }

    fn render_history(&mut self, history: History) {
        self.history = history;
    }
}
