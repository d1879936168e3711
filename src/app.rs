use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Position, Rect};

use crate::clock::{Clock, SystemClock};
use crate::config::ClickRegion;
use crate::game::Game;
use crate::runtime::GameEvent;
use crate::ui::panel_area;
use crate::view::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Redraw,
    Quit,
}

/// Binds a [`Game`] to the terminal: hit-testing, quitting, and the retained
/// screen state the widget draws from.
#[derive(Debug)]
pub struct App<C: Clock = SystemClock> {
    pub game: Game<C>,
    pub screen: Screen,
    pub region: ClickRegion,
}

impl<C: Clock> App<C> {
    pub fn new(mut game: Game<C>, region: ClickRegion) -> Self {
        let mut screen = Screen::default();
        game.init(&mut screen);
        Self {
            game,
            screen,
            region,
        }
    }

    /// Whether a click at the given cell lands on the clickable region
    pub fn hit(&self, area: Rect, column: u16, row: u16) -> bool {
        let target = match self.region {
            ClickRegion::Screen => area,
            ClickRegion::Panel => panel_area(area),
        };
        target.contains(Position::new(column, row))
    }

    pub fn handle(&mut self, event: GameEvent, area: Rect) -> Control {
        match event {
            GameEvent::Tick => {
                let before = self.screen.style;
                self.game.tick(&mut self.screen);
                if self.screen.style != before {
                    Control::Redraw
                } else {
                    Control::Continue
                }
            }
            GameEvent::Resize => Control::Redraw,
            GameEvent::Click { column, row } => {
                if self.hit(area, column, row) {
                    self.game.click(&mut self.screen);
                    Control::Redraw
                } else {
                    Control::Continue
                }
            }
            GameEvent::Key(key) => self.on_key(key),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Control::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Control::Quit,
            // tap fallback for terminals without mouse reporting
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.game.click(&mut self.screen);
                Control::Redraw
            }
            _ => Control::Continue,
        }
    }
}
