use thiserror::Error;

/// Main error type for SquadGraph
#[derive(Error, Debug)]
pub enum SquadError {
    /// Unknown country, league, season or team label
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Cache directory or file I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network or page errors from the remote source
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Malformed page, roster file or label
    #[error("Parse error: {0}")]
    Parse(String),

    /// Roster file encode/decode errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using SquadError
pub type Result<T> = std::result::Result<T, SquadError>;
