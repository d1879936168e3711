use itertools::Itertools;
use std::fmt;

use crate::scores::ReactionTime;

pub const DEFAULT_HISTORY_LEN: usize = 5;

/// Fastest reaction, if any round has been recorded
pub fn best(scores: &[ReactionTime]) -> Option<ReactionTime> {
    scores.iter().min().copied()
}

/// Arithmetic mean rounded to the nearest millisecond
pub fn average(scores: &[ReactionTime]) -> Option<u64> {
    mean(scores).map(|m| m.round() as u64)
}

/// Population standard deviation, in milliseconds
pub fn spread(scores: &[ReactionTime]) -> Option<f64> {
    let data_mean = mean(scores)?;
    let variance = scores
        .iter()
        .map(|rt| {
            let diff = data_mean - rt.as_millis() as f64;
            diff * diff
        })
        .sum::<f64>()
        / scores.len() as f64;

    Some(variance.sqrt())
}

fn mean(scores: &[ReactionTime]) -> Option<f64> {
    match scores.len() {
        0 => None,
        count => Some(scores.iter().map(|rt| rt.as_millis() as f64).sum::<f64>() / count as f64),
    }
}

/// Recent rounds, most recent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum History {
    NoData,
    Recent(Vec<ReactionTime>),
}

impl History {
    pub fn entries(&self) -> &[ReactionTime] {
        match self {
            History::NoData => &[],
            History::Recent(entries) => entries,
        }
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            History::NoData => write!(f, "No data"),
            History::Recent(entries) => write!(f, "{}", entries.iter().join("  ·  ")),
        }
    }
}

pub fn recent_history(scores: &[ReactionTime], n: usize) -> History {
    if scores.is_empty() {
        return History::NoData;
    }
    History::Recent(scores.iter().rev().take(n).copied().collect())
}

/// Summary figures shown in the statistics panel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub best: Option<ReactionTime>,
    pub average: Option<u64>,
    pub spread: Option<f64>,
    pub rounds: usize,
}

impl Stats {
    pub fn from_scores(scores: &[ReactionTime]) -> Self {
        Self {
            best: best(scores),
            average: average(scores),
            spread: spread(scores),
            rounds: scores.len(),
        }
    }
}
