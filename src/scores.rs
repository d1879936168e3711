use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use crate::storage::KeyValueStore;

/// Storage key holding the JSON array of reaction times
pub const SCORES_KEY: &str = "reaction_times";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("score {0:?} is not a number")]
    NotNumeric(String),
    #[error("score {0} is not positive")]
    NotPositive(f64),
    #[error("score is not a finite number")]
    NotFinite,
}

/// A completed round, in whole milliseconds. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReactionTime(NonZeroU64);

impl ReactionTime {
    pub fn as_millis(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ReactionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

impl TryFrom<u64> for ReactionTime {
    type Error = ScoreError;

    fn try_from(ms: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(ms)
            .map(ReactionTime)
            .ok_or(ScoreError::NotPositive(0.0))
    }
}

impl TryFrom<i64> for ReactionTime {
    type Error = ScoreError;

    fn try_from(ms: i64) -> Result<Self, Self::Error> {
        if ms <= 0 {
            return Err(ScoreError::NotPositive(ms as f64));
        }
        ReactionTime::try_from(ms as u64)
    }
}

/// Fractional values are rounded to the nearest millisecond.
impl TryFrom<f64> for ReactionTime {
    type Error = ScoreError;

    fn try_from(ms: f64) -> Result<Self, Self::Error> {
        if !ms.is_finite() {
            return Err(ScoreError::NotFinite);
        }
        let rounded = ms.round();
        if rounded < 1.0 {
            return Err(ScoreError::NotPositive(ms));
        }
        ReactionTime::try_from(rounded as u64)
    }
}

impl FromStr for ReactionTime {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| ScoreError::NotNumeric(s.to_string()))?;
        ReactionTime::try_from(value)
    }
}

impl TryFrom<&str> for ReactionTime {
    type Error = ScoreError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<&Value> for ReactionTime {
    type Error = ScoreError;

    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        match v.as_f64() {
            Some(n) => ReactionTime::try_from(n),
            None => Err(ScoreError::NotNumeric(v.to_string())),
        }
    }
}

/// What happened to a score handed to [`ScoreStore::record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// appended and written to storage
    Persisted(ReactionTime),
    /// appended, but the storage write failed
    MemoryOnly(ReactionTime),
    Rejected,
}

impl Recorded {
    pub fn reaction_time(&self) -> Option<ReactionTime> {
        match self {
            Recorded::Persisted(rt) | Recorded::MemoryOnly(rt) => Some(*rt),
            Recorded::Rejected => None,
        }
    }
}

/// Reads the persisted history. Never fails: anything unreadable is logged
/// and treated as an empty history, and invalid entries are dropped.
pub fn load(store: &dyn KeyValueStore) -> Vec<ReactionTime> {
    let raw = match store.get(SCORES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read score history");
            return Vec::new();
        }
    };

    let entries = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "score history is not an array");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "score history is not valid json");
            return Vec::new();
        }
    };

    let total = entries.len();
    let scores: Vec<ReactionTime> = entries
        .iter()
        .filter_map(|v| ReactionTime::try_from(v).ok())
        .collect();
    if scores.len() != total {
        tracing::info!(
            dropped = total - scores.len(),
            kept = scores.len(),
            "dropped invalid score entries"
        );
    }
    scores
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// In-memory score history mirrored to a durable key-value store
pub struct ScoreStore {
    store: Box<dyn KeyValueStore>,
    scores: Vec<ReactionTime>,
}

impl fmt::Debug for ScoreStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreStore")
            .field("scores", &self.scores)
            .finish_non_exhaustive()
    }
}

impl ScoreStore {
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let scores = load(store.as_ref());
        tracing::debug!(count = scores.len(), "loaded score history");
        Self { store, scores }
    }

    pub fn scores(&self) -> &[ReactionTime] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn record<T>(&mut self, score: T) -> Recorded
    where
        T: TryInto<ReactionTime, Error = ScoreError>,
    {
        let score = match score.try_into() {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!(error = %e, "rejected score");
                return Recorded::Rejected;
            }
        };

        self.scores.push(score);
        match self.persist() {
            Ok(()) => Recorded::Persisted(score),
            Err(e) => {
                tracing::warn!(error = %e, "score kept in memory only");
                Recorded::MemoryOnly(score)
            }
        }
    }

    /// Empties the history and rewrites storage.
    pub fn clear(&mut self) -> Result<(), crate::storage::StorageError> {
        self.scores.clear();
        self.persist()
    }

    fn persist(&mut self) -> Result<(), crate::storage::StorageError> {
        let millis: Vec<u64> = self.scores.iter().map(ReactionTime::as_millis).collect();
        let encoded = serde_json::to_string(&millis)
            .map_err(|e| crate::storage::StorageError::Unavailable(e.to_string()))?;
        self.store.set(SCORES_KEY, &encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn rt(ms: u64) -> ReactionTime {
        ReactionTime::try_from(ms).unwrap()
    }

    fn millis(scores: &[ReactionTime]) -> Vec<u64> {
        scores.iter().map(ReactionTime::as_millis).collect()
    }

    #[test]
    fn reaction_time_conversions() {
        assert_eq!(ReactionTime::try_from(250u64), Ok(rt(250)));
        assert_eq!(ReactionTime::try_from(250i64), Ok(rt(250)));
        assert_eq!(ReactionTime::try_from(249.6), Ok(rt(250)));
        assert_eq!("  312 ".parse::<ReactionTime>(), Ok(rt(312)));

        assert_matches!(ReactionTime::try_from(0u64), Err(ScoreError::NotPositive(_)));
        assert_matches!(ReactionTime::try_from(-5i64), Err(ScoreError::NotPositive(_)));
        assert_matches!(ReactionTime::try_from(0.4), Err(ScoreError::NotPositive(_)));
        assert_matches!(ReactionTime::try_from(f64::NAN), Err(ScoreError::NotFinite));
        assert_matches!(
            ReactionTime::try_from(f64::INFINITY),
            Err(ScoreError::NotFinite)
        );
        assert_matches!("abc".parse::<ReactionTime>(), Err(ScoreError::NotNumeric(_)));
    }

    #[test]
    fn reaction_time_display() {
        assert_eq!(rt(287).to_string(), "287 ms");
    }

    #[test]
    fn load_missing_key_is_empty() {
        let store = MemoryKeyValueStore::new();
        assert!(load(&store).is_empty());
    }

    #[test]
    fn load_filters_invalid_entries() {
        let store = MemoryKeyValueStore::new().with_entry(
            SCORES_KEY,
            r#"[300, -1, 0, "abc", null, 150.4, {"x": 1}, 450, 0.2, true]"#,
        );
        assert_eq!(millis(&load(&store)), vec![300, 150, 450]);
    }

    #[test]
    fn load_wrong_shape_or_corrupt_is_empty() {
        for raw in [r#"{"scores": [1, 2]}"#, "42", "\"[1,2]\"", "[1, 2", ""] {
            let store = MemoryKeyValueStore::new().with_entry(SCORES_KEY, raw);
            assert!(load(&store).is_empty(), "expected empty for {raw:?}");
        }
    }

    #[test]
    fn load_read_failure_is_empty() {
        let mut store = MemoryKeyValueStore::new().with_entry(SCORES_KEY, "[100]");
        store.fail_reads = true;
        assert!(load(&store).is_empty());
    }

    #[test]
    fn record_rejects_invalid_input() {
        let mut scores = ScoreStore::open(Box::new(
            MemoryKeyValueStore::new().with_entry(SCORES_KEY, "[200]"),
        ));

        assert_eq!(scores.record(-5i64), Recorded::Rejected);
        assert_eq!(scores.record("abc"), Recorded::Rejected);
        assert_eq!(scores.record(0u64), Recorded::Rejected);
        assert_eq!(scores.record(f64::NAN), Recorded::Rejected);
        assert_eq!(millis(scores.scores()), vec![200]);
    }

    #[test]
    fn record_survives_write_failure() {
        let mut backing = MemoryKeyValueStore::new();
        backing.fail_writes = true;
        let mut scores = ScoreStore::open(Box::new(backing));

        assert_eq!(scores.record(180u64), Recorded::MemoryOnly(rt(180)));
        assert_eq!(scores.len(), 1);
    }

    #[test]
    fn record_then_load_round_trips_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut scores = ScoreStore::open(Box::new(FileKeyValueStore::with_path(&path)));

        for ms in [321u64, 198, 250, 199] {
            assert_eq!(scores.record(ms), Recorded::Persisted(rt(ms)));
        }

        let reopened = FileKeyValueStore::with_path(&path);
        assert_eq!(millis(&load(&reopened)), vec![321, 198, 250, 199]);
        assert_eq!(
            reopened.get(SCORES_KEY).unwrap().as_deref(),
            Some("[321,198,250,199]")
        );
    }

    #[test]
    fn record_appends_after_filtered_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut seed = FileKeyValueStore::with_path(&path);
        seed.set(SCORES_KEY, r#"[400, "bad", -3]"#).unwrap();

        let mut scores = ScoreStore::open(Box::new(FileKeyValueStore::with_path(&path)));
        scores.record(275u64);

        assert_eq!(
            millis(&load(&FileKeyValueStore::with_path(&path))),
            vec![400, 275]
        );
    }

    #[test]
    fn clear_empties_storage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut scores = ScoreStore::open(Box::new(FileKeyValueStore::with_path(&path)));
        scores.record(100u64);
        scores.clear().unwrap();

        assert!(scores.is_empty());
        assert!(load(&FileKeyValueStore::with_path(&path)).is_empty());
    }
}
