use std::path::PathBuf;

use thiserror::Error;

use crate::config::{Mode, Settings};
use crate::core::CoordinateError;
use crate::error::Result;

pub mod fixture;
pub mod maven;
pub mod pom;
pub mod traits;

pub use fixture::{FixtureError, FixtureSource};
pub use maven::{MavenSource, RepositoryLocation};
pub use traits::MetadataSource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("node id is not a coordinate: {0}")]
    InvalidId(#[from] CoordinateError),
    #[error("manifest not found: {0}")]
    NotFound(PathBuf),
    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("malformed manifest: {0}")]
    Manifest(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn source_for(settings: &Settings) -> Result<Box<dyn MetadataSource>> {
    match settings.mode {
        Mode::Test => {
            let source = FixtureSource::load(&settings.repository)?;
            if source.is_empty() {
                tracing::warn!(path = %settings.repository, "fixture file has no records");
            } else {
                tracing::debug!(records = source.len(), "loaded fixture");
            }
            Ok(Box::new(source))
        }
        Mode::Url => {
            let source = MavenSource::new(RepositoryLocation::parse(&settings.repository))?;
            tracing::debug!(location = ?source.location(), "using maven repository");
            Ok(Box::new(source))
        }
    }
}
