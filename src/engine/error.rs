use super::Coord;

/// Errors surfaced by board construction and board operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("coordinate ({row}, {col}) outside {width}x{height} grid")]
    OutOfBounds { row: usize, col: usize, width: usize, height: usize },
    #[error("invalid move {a} <-> {b}: cells must be in bounds and edge-adjacent")]
    InvalidMove { a: Coord, b: Coord },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("colour {colour} outside 1..={colours}")]
    InvalidColour { colour: u8, colours: u8 },
    #[error("cascade did not settle within {limit} steps")]
    CascadeLimitExceeded { limit: u32 },
}
