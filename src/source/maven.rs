use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::core::coordinates::Coordinates;
use crate::core::node::NodeId;
use crate::source::pom::PomModel;
use crate::source::traits::MetadataSource;
use crate::source::FetchError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryLocation {
    Local(PathBuf),
    /// Base URL, always ending in `/`.
    Remote(String),
}

impl RepositoryLocation {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if is_http_url(raw) {
            let base = if raw.ends_with('/') {
                raw.to_string()
            } else {
                format!("{raw}/")
            };
            Self::Remote(base)
        } else {
            Self::Local(PathBuf::from(raw))
        }
    }
}

pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Metadata source backed by a Maven layout repository.
#[derive(Debug, Clone)]
pub struct MavenSource {
    location: RepositoryLocation,
    client: Client,
}

impl MavenSource {
    pub fn new(location: RepositoryLocation) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(HTTP_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("depgraph/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { location, client })
    }

    pub fn location(&self) -> &RepositoryLocation {
        &self.location
    }

    pub fn load_pom(&self, coords: &Coordinates) -> Result<String, FetchError> {
        match &self.location {
            RepositoryLocation::Local(base) => {
                let path = base.join(coords.pom_path());
                if !path.is_file() {
                    return Err(FetchError::NotFound(path));
                }
                Ok(std::fs::read_to_string(&path)?)
            }
            RepositoryLocation::Remote(base) => {
                let url = format!("{base}{}", coords.pom_path());
                let response = self.client.get(&url).send()?;
                if response.status() != StatusCode::OK {
                    return Err(FetchError::Http {
                        status: response.status().as_u16(),
                        url,
                    });
                }
                Ok(response.text()?)
            }
        }
    }
}

impl MetadataSource for MavenSource {
    fn direct_dependencies(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError> {
        let coords = Coordinates::parse_published(id.as_str())?;
        tracing::debug!(node = %id, "fetching manifest");
        let xml = self.load_pom(&coords)?;
        let model = PomModel::parse(&xml)?;

        let mut seen = HashSet::new();
        Ok(model
            .resolved_dependencies(&coords)
            .into_iter()
            .map(|dep| dep.node_id())
            .filter(|dep| seen.insert(dep.clone()))
            .collect())
    }
}
