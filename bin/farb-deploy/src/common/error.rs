use farb_deployer::{ConfigError, DeployError};

/// Error types for the farb-deploy command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Failed to load the `.env` file
    #[error("Failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    /// Failed to open the log file
    #[error("Failed to create log file: {0}")]
    LogFile(std::io::Error),

    /// Failed to write the run record
    #[error("Failed to write run record: {0}")]
    RecordWrite(std::io::Error),

    /// Configuration or deployment error
    #[error("{0}")]
    Deploy(#[from] DeployError),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Deploy(err.into())
    }
}

/// Result type for the farb-deploy command
pub type Result<T> = std::result::Result<T, CliError>;
