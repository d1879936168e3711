use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;

use reflex::app::{App, Control};
use reflex::clock::{ManualClock, SystemClock};
use reflex::config::ClickRegion;
use reflex::delay::{DelayRange, RandomDelay};
use reflex::game::{Game, GameState};
use reflex::runtime::{FixedTicker, GameEvent, Runner, TestEventSource};
use reflex::scores::ScoreStore;
use reflex::storage::MemoryKeyValueStore;
use reflex::view::{Message, Style};

const AREA: Rect = Rect {
    x: 0,
    y: 0,
    width: 80,
    height: 24,
};

// Headless end-to-end: click, wait past the longest delay, click again.
#[test]
fn full_round_with_virtual_clock() {
    let clock = ManualClock::new();
    let game = Game::new(
        clock.clone(),
        RandomDelay::seeded(DelayRange::default(), 99),
        ScoreStore::open(Box::new(MemoryKeyValueStore::new())),
    );
    let mut app = App::new(game, ClickRegion::Screen);
    assert_eq!(app.game.state(), GameState::Initial);
    let rounds_before = app.game.scores().len();

    app.handle(GameEvent::Click { column: 40, row: 12 }, AREA);
    assert_eq!(app.game.state(), GameState::Waiting);

    // no click while the clock runs past the maximum delay
    for _ in 0..36 {
        clock.advance(Duration::from_millis(100));
        app.handle(GameEvent::Tick, AREA);
    }
    assert_eq!(app.game.state(), GameState::Ready);
    assert_eq!(app.screen.style, Style::Ready);

    clock.advance(Duration::from_millis(215));
    app.handle(GameEvent::Click { column: 3, row: 20 }, AREA);

    assert_eq!(app.game.state(), GameState::Result);
    match app.screen.message {
        Message::Result(ms) => assert!(ms >= 215),
        other => panic!("expected a result message, got {other:?}"),
    }
    assert_eq!(app.game.scores().len(), rounds_before + 1);
}

// Same flow driven through Runner/TestEventSource with real time and short delays.
#[test]
fn full_round_through_runner() {
    let game = Game::new(
        SystemClock::new(),
        RandomDelay::new(DelayRange::new(5, 20).unwrap()),
        ScoreStore::open(Box::new(MemoryKeyValueStore::new())),
    );
    let mut app = App::new(game, ClickRegion::Screen);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(2)),
    );

    tx.send(GameEvent::Key(KeyEvent::new(
        KeyCode::Char(' '),
        KeyModifiers::NONE,
    )))
    .unwrap();

    let mut clicked = false;
    for _ in 0..500u32 {
        let control = app.handle(runner.step(), AREA);
        assert_ne!(control, Control::Quit);

        if app.game.state() == GameState::Ready && !clicked {
            tx.send(GameEvent::Click { column: 0, row: 0 }).unwrap();
            clicked = true;
        }
        if app.game.state() == GameState::Result {
            break;
        }
    }

    assert_eq!(app.game.state(), GameState::Result);
    assert!(matches!(app.screen.message, Message::Result(_)));
}

#[test]
fn early_click_never_reaches_ready() {
    let clock = ManualClock::new();
    let game = Game::new(
        clock.clone(),
        RandomDelay::seeded(DelayRange::default(), 5),
        ScoreStore::open(Box::new(MemoryKeyValueStore::new())),
    );
    let mut app = App::new(game, ClickRegion::Screen);

    app.handle(GameEvent::Click { column: 1, row: 1 }, AREA);
    clock.advance(Duration::from_millis(1_000));
    app.handle(GameEvent::Click { column: 1, row: 1 }, AREA);
    assert_eq!(app.screen.style, Style::TooEarly);

    for _ in 0..50 {
        clock.advance(Duration::from_millis(100));
        app.handle(GameEvent::Tick, AREA);
    }
    assert_eq!(app.game.state(), GameState::Result);
    assert!(app.game.scores().is_empty());
}

#[test]
fn escape_quits() {
    let clock = ManualClock::new();
    let game = Game::new(
        clock,
        RandomDelay::seeded(DelayRange::default(), 5),
        ScoreStore::open(Box::new(MemoryKeyValueStore::new())),
    );
    let mut app = App::new(game, ClickRegion::Screen);

    let esc = GameEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    assert_eq!(app.handle(esc, AREA), Control::Quit);
}
