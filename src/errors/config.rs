use std::env::VarError;

use thiserror::Error;

/// Failures while reading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is present but not valid unicode
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] VarError),

    /// A variable (or its default) could not be parsed into the target type
    #[error("Parse error: {0}")]
    ParseError(String),
}
