use thiserror::Error;

use crate::*;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Invalid action: {0}")]
    InvalidAction(#[from] InvalidAction),
    #[error("Game already ended, no new moves are accepted")]
    SessionFinished,
    #[error("Save record is corrupted: {0}")]
    SaveCorrupted(#[from] SaveCorruption),
    #[error("Minefield generation was cancelled")]
    GenerationCancelled,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: Coord, height: Coord },
    #[error("at least one mine is required")]
    NoMines,
    #[error("too many mines, requested {requested} but only {fits} fit")]
    TooManyMines {
        requested: CellCount,
        fits: CellCount,
    },
    #[error("grid shape does not match the declared size")]
    ShapeMismatch,
    #[error("first open index {index} is outside a board of {total} areas")]
    FirstOpenOutOfRange { index: AreaIndex, total: CellCount },
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum InvalidAction {
    #[error("index {index} is outside a board of {total} areas")]
    OutOfRange { index: AreaIndex, total: CellCount },
    #[error("area {0} is already open")]
    AlreadyOpen(AreaIndex),
    #[error("area {0} is flagged")]
    Flagged(AreaIndex),
    #[error("area {0} is not an open number")]
    NotANumber(AreaIndex),
    #[error("area {index} shows {expected} but has {flagged} flagged neighbors")]
    ChordUnsatisfied {
        index: AreaIndex,
        flagged: u8,
        expected: u8,
    },
    #[error("question marks are disabled")]
    QuestionMarksDisabled,
    #[error("prepared layout does not belong to this board")]
    LayoutMismatch,
    #[error("mines are already placed")]
    AlreadyGenerated,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SaveCorruption {
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),
    #[error("record could not be decoded")]
    Malformed,
    #[error("stored configuration is invalid")]
    InvalidConfig,
    #[error("stored configuration has no resolved seed")]
    MissingSeed,
    #[error("expected {expected} areas, found {found}")]
    DimensionMismatch { expected: CellCount, found: usize },
    #[error("area at position {position} claims index {index}")]
    MisplacedArea { position: usize, index: AreaIndex },
    #[error("expected {expected} mines, found {found}")]
    MineCountMismatch { expected: CellCount, found: CellCount },
    #[error("area {0} has a neighbor count inconsistent with the mines")]
    NeighborCountMismatch(AreaIndex),
    #[error("expected {expected} flags, found {found}")]
    FlagCountMismatch { expected: CellCount, found: CellCount },
    #[error("opened order of area {0} is inconsistent")]
    InvalidOpenedOrder(AreaIndex),
    #[error("status does not match the stored areas")]
    StatusMismatch,
}

pub type Result<T> = core::result::Result<T, GameError>;
