use serde::Serialize;
use std::io;
use std::path::Path;

use crate::scores::ReactionTime;

#[derive(Debug, Serialize)]
struct Row {
    round: usize,
    reaction_ms: u64,
}

/// Writes the history as CSV, one row per round in play order.
pub fn write_csv<W: io::Write>(writer: W, scores: &[ReactionTime]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (idx, rt) in scores.iter().enumerate() {
        wtr.serialize(Row {
            round: idx + 1,
            reaction_ms: rt.as_millis(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(path: P, scores: &[ReactionTime]) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path.as_ref())?;
    write_csv(file, scores)
}
