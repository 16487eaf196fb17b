use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::Config;
use crate::simulation::{GameRecord, Statistics};

/// Provenance of a batch of playouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub strategy: String,
    pub games: u64,
    /// Base seed; game `i` used `seed + i`.
    pub seed: u64,
    pub start_unix_s: u64,
    pub elapsed_s: f32,
}

/// A batch of playouts together with its aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub meta: ReportMeta,
    pub config: Config,
    pub records: Vec<GameRecord>,
    pub stats: Statistics,
}

impl SimulationReport {
    pub fn new(meta: ReportMeta, config: Config, records: Vec<GameRecord>) -> Self {
        let stats = Statistics::from_records(&records);
        SimulationReport { meta, config, records, stats }
    }

    pub fn scores(&self) -> Vec<u64> { self.records.iter().map(|r| r.score).collect() }

    pub fn lengths(&self) -> Vec<u64> { self.records.iter().map(|r| r.turns as u64).collect() }
}

#[derive(thiserror::Error, Debug)]
pub enum SerializationError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),
}

/// Encode a report to postcard bytes.
pub fn to_postcard_bytes(report: &SimulationReport) -> Result<Vec<u8>, SerializationError> {
    Ok(postcard::to_allocvec(report)?)
}

/// Decode a report from postcard bytes.
pub fn from_postcard_bytes(bytes: &[u8]) -> Result<SimulationReport, SerializationError> {
    Ok(postcard::from_bytes(bytes)?)
}

pub fn write_report_to_path<P: AsRef<Path>>(path: P, report: &SimulationReport) -> Result<(), SerializationError> {
    let bytes = to_postcard_bytes(report)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_report_from_path<P: AsRef<Path>>(path: P) -> Result<SimulationReport, SerializationError> {
    let bytes = fs::read(path)?;
    from_postcard_bytes(&bytes)
}

/// Persist the pooled turn-to-turn delta counts, the input a random-walk model
/// of available moves is fitted from.
pub fn write_delta_counts<P: AsRef<Path>>(path: P, counts: &BTreeMap<i64, u64>) -> Result<(), SerializationError> {
    fs::write(path, postcard::to_allocvec(counts)?)?;
    Ok(())
}

pub fn read_delta_counts<P: AsRef<Path>>(path: P) -> Result<BTreeMap<i64, u64>, SerializationError> {
    let bytes = fs::read(path)?;
    Ok(postcard::from_bytes(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{simulate_batch, PlayLimits};
    use crate::strategy::Chooser;
    use tempfile::NamedTempFile;

    fn report() -> SimulationReport {
        let config = Config::new(6, 6, 7, 3).unwrap();
        let records = simulate_batch(&config, Chooser::FromTop(2), 4, 500, PlayLimits::default(), |_| {}).unwrap();
        let meta = ReportMeta {
            strategy: Chooser::FromTop(2).to_string(),
            games: 4,
            seed: 500,
            start_unix_s: 1_700_000_000,
            elapsed_s: 0.5,
        };
        SimulationReport::new(meta, config, records)
    }

    #[test]
    fn report_file_round_trip() {
        let rep = report();
        assert_eq!(rep.stats.games, 4);
        let tmp = NamedTempFile::new().unwrap();
        write_report_to_path(tmp.path(), &rep).unwrap();
        let back = read_report_from_path(tmp.path()).unwrap();
        assert_eq!(back, rep);
        assert_eq!(back.scores().len(), 4);
    }

    #[test]
    fn delta_counts_round_trip() {
        let rep = report();
        let tmp = NamedTempFile::new().unwrap();
        write_delta_counts(tmp.path(), &rep.stats.delta_counts).unwrap();
        assert_eq!(read_delta_counts(tmp.path()).unwrap(), rep.stats.delta_counts);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(from_postcard_bytes(&[0xff, 0xff, 0xff]), Err(SerializationError::Postcard(_))));
    }
}
