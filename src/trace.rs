//! Compact binary trace of one game.
//!
//! Layout (little-endian):
//! - header: magic `J3T1`, version u8, endian u8,
//!   width u16, height u16, colours u8, vanish_length u16, max_cascade_steps u32 (0 = none),
//!   seed u64, start_unix_s u64, elapsed_s f32, score u64, turns u32,
//!   entries u32, truncated u8, strategy_len u16
//! - strategy name (UTF-8, `strategy_len` bytes)
//! - `entries` x (moves_available u32, chains u32)
//! - `turns` x chosen move (row_a u16, col_a u16, row_b u16, col_b u16)
//! - trailer: CRC32C of all preceding bytes
//!
//! A trace carries the seed and every chosen move, so [`crate::simulation::replay_game`]
//! can rebuild the full board trajectory from it.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::engine::{Config, Coord, Move};
use crate::simulation::GameRecord;

const MAGIC: &[u8; 4] = b"J3T1";
const VERSION: u8 = 1;
const ENDIAN_LE: u8 = 0;
// 4 magic + 1 version + 1 endian + 2 width + 2 height + 1 colours + 2 vanish + 4 cap
// + 8 seed + 8 start + 4 elapsed + 8 score + 4 turns + 4 entries + 1 truncated + 2 strategy_len
const HEADER_LEN: usize = 4 + 1 + 1 + 2 + 2 + 1 + 2 + 4 + 8 + 8 + 4 + 8 + 4 + 4 + 1 + 2;
const ENTRY_LEN: usize = 8;
const MOVE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub start_unix_s: u64,
    pub elapsed_s: f32,
    pub strategy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameTrace {
    pub meta: Meta,
    pub config: Config,
    pub record: GameRecord,
}

#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid magic or version")]
    MagicOrVersion,
    #[error("unsupported endianness")]
    Endianness,
    #[error("file too short or malformed")]
    Malformed,
    #[error("checksum mismatch")]
    Checksum,
    #[error("{0} does not fit the trace format")]
    TooLarge(&'static str),
}

struct Reader<'a> {
    bytes: &'a [u8],
    off: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], TraceError> {
        let end = self.off.checked_add(n).ok_or(TraceError::Malformed)?;
        let out = self.bytes.get(self.off..end).ok_or(TraceError::Malformed)?;
        self.off = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, TraceError> { Ok(self.take(1)?[0]) }

    fn u16(&mut self) -> Result<u16, TraceError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, TraceError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, TraceError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    fn f32(&mut self) -> Result<f32, TraceError> { self.u32().map(f32::from_bits) }
}

fn narrow16(v: usize, what: &'static str) -> Result<u16, TraceError> {
    u16::try_from(v).map_err(|_| TraceError::TooLarge(what))
}

pub fn encode_game(trace: &GameTrace) -> Result<Vec<u8>, TraceError> {
    let GameTrace { meta, config, record } = trace;
    if record.moves_available.len() != record.chains.len() {
        return Err(TraceError::Malformed);
    }
    if record.chosen.len() != record.turns as usize {
        return Err(TraceError::Malformed);
    }
    let strategy = meta.strategy.as_deref().unwrap_or("").as_bytes();
    let strategy_len = narrow16(strategy.len(), "strategy name")?;
    let entries = u32::try_from(record.moves_available.len()).map_err(|_| TraceError::TooLarge("turn count"))?;

    let payload_len = strategy.len() + record.moves_available.len() * ENTRY_LEN + record.chosen.len() * MOVE_LEN;
    let mut buf = Vec::with_capacity(HEADER_LEN + payload_len + 4);

    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.push(ENDIAN_LE);
    buf.extend_from_slice(&narrow16(config.width, "width")?.to_le_bytes());
    buf.extend_from_slice(&narrow16(config.height, "height")?.to_le_bytes());
    buf.push(config.colours);
    buf.extend_from_slice(&narrow16(config.vanish_length, "vanish length")?.to_le_bytes());
    buf.extend_from_slice(&config.max_cascade_steps.unwrap_or(0).to_le_bytes());
    buf.extend_from_slice(&record.seed.to_le_bytes());
    buf.extend_from_slice(&meta.start_unix_s.to_le_bytes());
    buf.extend_from_slice(&meta.elapsed_s.to_bits().to_le_bytes());
    buf.extend_from_slice(&record.score.to_le_bytes());
    buf.extend_from_slice(&record.turns.to_le_bytes());
    buf.extend_from_slice(&entries.to_le_bytes());
    buf.push(record.truncated as u8);
    buf.extend_from_slice(&strategy_len.to_le_bytes());

    buf.extend_from_slice(strategy);
    for (&available, &chains) in record.moves_available.iter().zip(&record.chains) {
        buf.extend_from_slice(&available.to_le_bytes());
        buf.extend_from_slice(&chains.to_le_bytes());
    }
    for mv in &record.chosen {
        for v in [mv.a().row, mv.a().col, mv.b().row, mv.b().col] {
            buf.extend_from_slice(&narrow16(v, "coordinate")?.to_le_bytes());
        }
    }

    let checksum = crc32c::crc32c(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

pub fn write_game_to_path<P: AsRef<Path>>(path: P, trace: &GameTrace) -> Result<(), TraceError> {
    let data = encode_game(trace)?;
    let mut f = fs::File::create(path)?;
    f.write_all(&data)?;
    Ok(())
}

pub fn parse_game_bytes(bytes: &[u8]) -> Result<GameTrace, TraceError> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(TraceError::Malformed);
    }
    // Checksum first so field reads never see corrupted lengths.
    let (content, trailer) = bytes.split_at(bytes.len() - 4);
    let file_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    if file_crc != crc32c::crc32c(content) {
        return Err(TraceError::Checksum);
    }

    let mut r = Reader { bytes: content, off: 0 };
    if r.take(4)? != MAGIC || r.u8()? != VERSION {
        return Err(TraceError::MagicOrVersion);
    }
    if r.u8()? != ENDIAN_LE {
        return Err(TraceError::Endianness);
    }
    let width = r.u16()? as usize;
    let height = r.u16()? as usize;
    let colours = r.u8()?;
    let vanish_length = r.u16()? as usize;
    let cap = r.u32()?;
    let seed = r.u64()?;
    let start_unix_s = r.u64()?;
    let elapsed_s = r.f32()?;
    let score = r.u64()?;
    let turns = r.u32()?;
    let entries = r.u32()? as usize;
    let truncated = r.u8()? != 0;
    let strategy_len = r.u16()? as usize;

    let strategy = match strategy_len {
        0 => None,
        n => std::str::from_utf8(r.take(n)?).ok().map(str::to_string),
    };

    let needed = entries.checked_mul(ENTRY_LEN).and_then(|e| e.checked_add(turns as usize * MOVE_LEN));
    if needed.map_or(true, |n| content.len() - r.off != n) {
        return Err(TraceError::Malformed);
    }

    let mut moves_available = Vec::with_capacity(entries);
    let mut chains = Vec::with_capacity(entries);
    for _ in 0..entries {
        moves_available.push(r.u32()?);
        chains.push(r.u32()?);
    }
    let mut chosen = Vec::with_capacity(turns as usize);
    for _ in 0..turns {
        let a = Coord::new(r.u16()? as usize, r.u16()? as usize);
        let b = Coord::new(r.u16()? as usize, r.u16()? as usize);
        chosen.push(Move::new(a, b));
    }

    let config = Config {
        width,
        height,
        colours,
        vanish_length,
        max_cascade_steps: if cap == 0 { None } else { Some(cap) },
    };
    let record = GameRecord { seed, score, turns, moves_available, chains, chosen, truncated };
    Ok(GameTrace { meta: Meta { start_unix_s, elapsed_s, strategy }, config, record })
}

pub fn parse_game_file<P: AsRef<Path>>(path: P) -> Result<GameTrace, TraceError> {
    let data = fs::read(path)?;
    parse_game_bytes(&data)
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{play_game, PlayLimits};
    use crate::strategy::Chooser;
    use tempfile::NamedTempFile;

    fn sample() -> GameTrace {
        let config = Config::new(6, 6, 7, 3).unwrap();
        let record = play_game(&config, Chooser::Highest, 12, PlayLimits::default()).unwrap();
        GameTrace {
            meta: Meta { start_unix_s: 1_700_000_000, elapsed_s: 0.25, strategy: Some("highest".to_string()) },
            config,
            record,
        }
    }

    #[test]
    fn file_round_trip() {
        let trace = sample();
        let tmp = NamedTempFile::new().unwrap();
        write_game_to_path(tmp.path(), &trace).unwrap();
        let back = parse_game_file(tmp.path()).unwrap();
        assert_eq!(back, trace);
    }

    #[test]
    fn checksum_mismatch() {
        let mut bytes = encode_game(&sample()).unwrap();
        bytes[HEADER_LEN] ^= 0xFF;
        assert!(matches!(parse_game_bytes(&bytes), Err(TraceError::Checksum)));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let mut bytes = encode_game(&sample()).unwrap();
        bytes.truncate(bytes.len() - 5);
        assert!(parse_game_bytes(&bytes).is_err());
        assert!(matches!(parse_game_bytes(&bytes[..10]), Err(TraceError::Malformed)));
    }

    #[test]
    fn bad_magic_with_valid_checksum() {
        let mut bytes = encode_game(&sample()).unwrap();
        bytes.truncate(bytes.len() - 4);
        bytes[0] = b'X';
        let crc = crc32c::crc32c(&bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        assert!(matches!(parse_game_bytes(&bytes), Err(TraceError::MagicOrVersion)));
    }

    #[test]
    fn inconsistent_record_is_not_encoded() {
        let mut trace = sample();
        trace.record.chains.pop();
        assert!(matches!(encode_game(&trace), Err(TraceError::Malformed)));
    }
}
