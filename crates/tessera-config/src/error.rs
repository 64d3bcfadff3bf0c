//! Errors from reading, writing and checking `config.ron`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// RON syntax or type error; the message carries line and column.
    #[error("{} is not valid RON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("cannot serialize config: {0}")]
    Serialize(#[source] ron::Error),

    /// A value parsed but is out of range for its section.
    #[error("`{section}.{field}` {reason}")]
    Invalid {
        section: &'static str,
        field: &'static str,
        reason: &'static str,
    },
}
