use thiserror::Error;

/// Errors that can occur while building, playing or searching upset-downset games.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpDownError {
    #[error("Invalid game: {0}")]
    InvalidGame(String),

    #[error("Illegal move on node {node}: {reason}")]
    IllegalMove { node: usize, reason: String },

    #[error("Invalid relabelling: {0}")]
    Relabel(String),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Oracle failure: {0}")]
    Oracle(String),

    #[error("Node {node} does not fit an action space of {max_nodes} nodes")]
    GameTooLarge { node: usize, max_nodes: usize },

    #[error("No legal moves available")]
    NoLegalMoves,
}

/// Convenience Result type for upset-downset operations
pub type Result<T> = std::result::Result<T, UpDownError>;
