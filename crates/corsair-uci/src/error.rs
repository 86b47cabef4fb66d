//! UCI protocol errors.

/// Errors that can occur during UCI protocol handling.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command is missing `startpos` or `fen` keyword.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// Failed to parse a FEN string.
    #[error("invalid FEN {fen}: {reason}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
        reason: String,
    },

    /// A move string in the `position` command is not legal in its position.
    #[error("invalid move: {uci_move}")]
    InvalidMove {
        /// The UCI move string that failed to parse.
        uci_move: String,
    },

    /// A `go` parameter was given without a value.
    #[error("missing value for go parameter {param}")]
    MissingGoValue { param: String },

    /// A `go` parameter value could not be parsed.
    #[error("invalid value {value} for go parameter {param}")]
    InvalidGoValue { param: String, value: String },

    /// `setoption` named an unknown option or gave an unusable value.
    #[error("invalid option {name} = {value}")]
    InvalidOption { name: String, value: String },

    /// The `grid` command carried no usable board.
    #[error("invalid grid: {reason}")]
    InvalidGrid { reason: String },

    /// An I/O error occurred while reading input or writing output.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
