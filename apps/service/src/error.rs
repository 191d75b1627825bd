use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0:#}")]
    Io(#[from] std::io::Error),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Metrics registration error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] botup::TransportError),
}
