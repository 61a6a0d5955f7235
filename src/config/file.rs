use std::path::Path;

use serde::Deserialize;

use crate::source::maven::is_http_url;

/// On-disk layout of `depgraph.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub resolve: ResolveSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResolveSection {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub max_depth: Option<i64>,
    #[serde(default)]
    pub output: Option<String>,
}

impl ResolveSection {
    /// Values set in `overrides` win over values already present.
    pub fn merge(mut self, overrides: ResolveSection) -> Self {
        if overrides.package.is_some() {
            self.package = overrides.package;
        }
        if overrides.repository.is_some() {
            self.repository = overrides.repository;
        }
        if overrides.mode.is_some() {
            self.mode = overrides.mode;
        }
        if overrides.max_depth.is_some() {
            self.max_depth = overrides.max_depth;
        }
        if overrides.output.is_some() {
            self.output = overrides.output;
        }
        self
    }

    /// Anchors a relative repository path at `base`, the directory holding
    /// the config file it was read from.
    pub fn anchor_repository(mut self, base: &Path) -> Self {
        if let Some(repo) = self.repository.as_ref() {
            let trimmed = repo.trim();
            if !trimmed.is_empty() && !is_http_url(trimmed) && Path::new(trimmed).is_relative() {
                self.repository = Some(base.join(trimmed).to_string_lossy().into_owned());
            }
        }
        self
    }
}
