//! Error types for CDK code generation and orchestration.

use std::process::ExitStatus;

use thiserror::Error;

use railsup_config::ConfigError;

/// Result alias for codegen operations.
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Errors raised while generating, building or deploying the CDK project.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to ensure db cluster parameter group {name:?}")]
    ParameterGroup {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("command `{command}` exited with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
