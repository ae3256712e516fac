//! Error types for Settle.

use thiserror::Error;

/// Errors produced by the fallible parts of the crate.
///
/// Timer failures are not listed: hooks absorb a
/// [`TimerError`](crate::timer::TimerError) and degrade instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error for key `{key}`: {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid media query `{0}`")]
    MediaQuery(String),
}

pub type Result<T> = std::result::Result<T, Error>;
