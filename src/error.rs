use thiserror::Error;

use crate::config::ConfigError;
use crate::source::{FetchError, FixtureError};

#[derive(Debug, Error)]
pub enum DepgraphError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),
    #[error("repository error: {0}")]
    Fetch(#[from] FetchError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DepgraphError>;
