use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] chukka_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid record JSON: {0}")]
    Data(serde_json::Error),
    #[error("Invalid local id '{0}'")]
    InvalidLocalId(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Not signed in. Run `chukka auth login --email <email> --password <password>` first.")]
    NotSignedIn,
    #[error(
        "No API base URL configured. Run `chukka config init --api-url <url>` or set CHUKKA_API_URL."
    )]
    ApiUrlNotConfigured,
    #[error("Pull finished with failures; see the per-kind report above.")]
    PullIncomplete,
}
