use derive_more::Display;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Defines the application's custom error types.
///
#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Proxmox API error: {0} failed: status {1}, body: {2}")]
    Proxmox(ProxmoxError, reqwest::StatusCode, String),
    #[error("Failed to parse Proxmox {0} response: {1}")]
    Decode(ProxmoxError, #[source] serde_json::Error),
    #[error("Unexpected download response: {0}")]
    UnexpectedDownload(serde_json::Value),
    #[error("Header convert error: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Environment error: {0}")]
    Environment(#[from] dotenv::Error),
    #[error("Environment variable error: {0}")]
    EnvironmentVariable(#[from] std::env::VarError),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Failed to set logger: {0}")]
    Logger(#[from] tracing::log::SetLoggerError),
    #[error("IO error: {0}")]
    InputOutput(#[from] std::io::Error),
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tracing::dispatcher::SetGlobalDefaultError),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Represents errors related to Proxmox API operations.
///
#[derive(Debug, Display)]
pub enum ProxmoxError {
    Storages,
    Content,
    Download,
}
