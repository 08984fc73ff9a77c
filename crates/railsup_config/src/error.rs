//! Error types for configuration compilation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while compiling raw configuration into validated models.
///
/// All variants are fatal, non-retryable user errors: the configuration
/// must be fixed before re-running.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unsupported {category} {value:?}, please choose from: {choices}")]
    UnsupportedValue {
        category: &'static str,
        value: String,
        choices: &'static str,
    },

    #[error("missing required field `{field}` under `{section}`")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },

    #[error("at most one of `type` and `name` can be supplied for a subnet selection")]
    AmbiguousSubnetSelection,

    #[error("unknown service `{0}` under `services`")]
    UnknownService(String),

    #[error("invalid railsup configuration file: {path}")]
    InvalidConfigFile { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
