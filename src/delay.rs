use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;

use crate::config::ConfigError;

pub const DEFAULT_MIN_DELAY_MS: u64 = 1500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 3500;

/// Inclusive millisecond range the "go" delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl DelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self, ConfigError> {
        if min_ms == 0 || min_ms > max_ms {
            return Err(ConfigError::InvalidDelayRange { min_ms, max_ms });
        }
        Ok(Self { min_ms, max_ms })
    }

    pub fn min_ms(&self) -> u64 {
        self.min_ms
    }

    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min_ms: DEFAULT_MIN_DELAY_MS,
            max_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

/// Uniform random delay, sampled independently for every round
#[derive(Debug, Clone)]
pub struct RandomDelay {
    range: DelayRange,
    rng: StdRng,
}

impl RandomDelay {
    pub fn new(range: DelayRange) -> Self {
        Self {
            range,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(range: DelayRange, seed: u64) -> Self {
        Self {
            range,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn range(&self) -> DelayRange {
        self.range
    }

    pub fn sample_ms(&mut self) -> u64 {
        self.rng.gen_range(self.range.min_ms..=self.range.max_ms)
    }

    pub fn sample(&mut self) -> Duration {
        Duration::from_millis(self.sample_ms())
    }
}
