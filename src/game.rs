use std::time::Duration;

use crate::clock::Clock;
use crate::delay::RandomDelay;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::scores::{Recorded, ScoreStore};
use crate::stats::{recent_history, Stats, DEFAULT_HISTORY_LEN};
use crate::view::{Message, Style, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum GameState {
    Initial,
    Waiting,
    Ready,
    Result,
}

/// Outcome of the most recent finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Round {
    TooEarly,
    Completed { reaction_ms: u64, recorded: Recorded },
}

/// Game controller: owns the whole session (state, pending timer, start
/// timestamp and score history). The display is only touched through [`View`].
#[derive(Debug)]
pub struct Game<C: Clock> {
    state: GameState,
    clock: C,
    scheduler: Scheduler,
    pending: Option<TaskHandle>,
    started_at: Option<Duration>,
    delay: RandomDelay,
    scores: ScoreStore,
    history_len: usize,
    last_round: Option<Round>,
}

impl<C: Clock> Game<C> {
    pub fn new(clock: C, delay: RandomDelay, scores: ScoreStore) -> Self {
        Self {
            state: GameState::Initial,
            clock,
            scheduler: Scheduler::new(),
            pending: None,
            started_at: None,
            delay,
            scores,
            history_len: DEFAULT_HISTORY_LEN,
            last_round: None,
        }
    }

    pub fn with_history_len(mut self, n: usize) -> Self {
        self.history_len = n;
        self
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn scores(&self) -> &ScoreStore {
        &self.scores
    }

    pub fn last_round(&self) -> Option<Round> {
        self.last_round
    }

    pub fn has_pending_timer(&self) -> bool {
        self.pending
            .is_some_and(|handle| self.scheduler.is_scheduled(handle))
    }

    /// Time left until the pending "go" signal, if one is scheduled
    pub fn time_until_ready(&self) -> Option<Duration> {
        let deadline = self.scheduler.next_deadline()?;
        self.pending?;
        Some(deadline.saturating_sub(self.clock.now()))
    }

    /// Puts the game back into its initial state, dropping any pending timer.
    pub fn init(&mut self, view: &mut impl View) {
        self.cancel_pending();
        self.state = GameState::Initial;
        self.started_at = None;
        view.set_style(Style::Waiting);
        view.set_message(Message::Start);
        self.render_scores(view);
    }

    /// The single input handler
    pub fn click(&mut self, view: &mut impl View) {
        match self.state {
            GameState::Initial | GameState::Result => self.start_round(view),
            GameState::Waiting => self.too_early(view),
            GameState::Ready => self.finish_round(view),
        }
    }

    /// Fires every scheduled task that is due. Only the currently pending
    /// timer can move the game to Ready.
    pub fn tick(&mut self, view: &mut impl View) {
        let now = self.clock.now();
        while let Some(handle) = self.scheduler.pop_due(now) {
            if self.pending == Some(handle) && self.state == GameState::Waiting {
                self.pending = None;
                self.show_ready(view);
            } else {
                tracing::debug!(?handle, state = %self.state, "ignoring stale timer");
            }
        }
    }

    fn start_round(&mut self, view: &mut impl View) {
        // a new round must never leave an older timer behind
        self.cancel_pending();

        let delay = self.delay.sample();
        let deadline = self.clock.now() + delay;
        self.pending = Some(self.scheduler.schedule(deadline));
        self.started_at = None;
        self.state = GameState::Waiting;
        tracing::debug!(delay_ms = delay.as_millis() as u64, "round started");

        view.set_style(Style::Waiting);
        view.set_message(Message::Waiting);
    }

    fn show_ready(&mut self, view: &mut impl View) {
        self.started_at = Some(self.clock.now());
        self.state = GameState::Ready;
        view.set_style(Style::Ready);
        view.set_message(Message::Go);
    }

    fn too_early(&mut self, view: &mut impl View) {
        self.cancel_pending();
        self.state = GameState::Result;
        self.last_round = Some(Round::TooEarly);
        tracing::debug!("clicked too early");

        view.set_style(Style::TooEarly);
        view.set_message(Message::TooEarly);
    }

    fn finish_round(&mut self, view: &mut impl View) {
        let now = self.clock.now();
        let started = self.started_at.take().unwrap_or(now);
        let reaction_ms = round_millis(now.saturating_sub(started));

        let recorded = self.scores.record(reaction_ms);
        tracing::info!(reaction_ms, ?recorded, "round finished");
        self.last_round = Some(Round::Completed {
            reaction_ms,
            recorded,
        });
        self.state = GameState::Result;

        self.render_scores(view);
        view.set_style(Style::Waiting);
        view.set_message(Message::Result(reaction_ms));
    }

    fn render_scores(&self, view: &mut impl View) {
        let scores = self.scores.scores();
        view.render_stats(Stats::from_scores(scores));
        view.render_history(recent_history(scores, self.history_len));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}

/// Elapsed time rounded to the nearest whole millisecond
pub fn round_millis(elapsed: Duration) -> u64 {
    ((elapsed.as_nanos() + 500_000) / 1_000_000) as u64
}
