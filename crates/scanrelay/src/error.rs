//! CLI error types.

use relay_config::ConfigError;
use relay_share::ShareError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Share(#[from] ShareError),

    #[error("{0}")]
    Validation(String),
}
