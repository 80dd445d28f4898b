use thiserror::Error;

pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("maze {width}x{height} is outside the supported range ({min_w}x{min_h} to {max}x{max})")]
    BadDimensions {
        width: usize,
        height: usize,
        min_w: usize,
        min_h: usize,
        max: usize,
    },
    #[error("layout is empty")]
    EmptyLayout,
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown layout glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
    #[error("border cell ({x}, {y}) is not a wall")]
    OpenBorder { x: usize, y: usize },
    #[error("layout has no player spawn")]
    MissingSpawn,
    #[error("layout has a second player spawn at ({x}, {y})")]
    DuplicateSpawn { x: usize, y: usize },
    #[error("collectible at ({x}, {y}) cannot be reached from the spawn")]
    UnreachableCollectible { x: usize, y: usize },
    #[error("layout has no collectibles")]
    NoCollectibles,
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
