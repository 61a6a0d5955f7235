use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::{ConfigError, ResolveSection};
use crate::core::{Coordinates, NodeId};
use crate::source::fixture::is_fixture_id;
use crate::source::maven::is_http_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Maven repository on disk or behind an HTTP(S) base URL.
    Url,
    /// Fixture adjacency file.
    Test,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "url" => Ok(Mode::Url),
            "test" => Ok(Mode::Test),
            other => Err(format!("unknown mode '{other}' (expected 'url' or 'test')")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Url => f.write_str("url"),
            Mode::Test => f.write_str("test"),
        }
    }
}

/// Validated resolution settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub package: String,
    pub repository: String,
    pub mode: Mode,
    pub max_depth: usize,
    pub output: Option<String>,
}

impl Settings {
    /// Checks every value and reports all problems at once.
    pub fn validate(section: &ResolveSection) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();

        let mode = required(&section.mode, "mode", &mut errors).and_then(|raw| {
            raw.parse::<Mode>()
                .map_err(|err| errors.push(err))
                .ok()
        });

        let package = required(&section.package, "package", &mut errors);
        if let Some(package) = package.as_deref() {
            match mode {
                Some(Mode::Test) if !is_fixture_id(package) => errors.push(format!(
                    "package must be uppercase letters in test mode (e.g. 'A' or 'ROOT'): '{package}'"
                )),
                Some(Mode::Url) => {
                    if let Err(err) = Coordinates::parse(package) {
                        errors.push(format!("package: {err}"));
                    }
                }
                _ => {}
            }
        }

        let repository = required(&section.repository, "repository", &mut errors);
        if let (Some(repository), Some(mode)) = (repository.as_deref(), mode) {
            match mode {
                Mode::Test => {
                    if !Path::new(repository).is_file() {
                        errors.push(format!("fixture file not found: {repository}"));
                    }
                }
                Mode::Url if is_http_url(repository) => match reqwest::Url::parse(repository) {
                    Ok(url) if url.host_str().is_some() => {}
                    Ok(_) => errors.push(format!("repository URL has no host: {repository}")),
                    Err(err) => errors.push(format!("invalid repository URL '{repository}': {err}")),
                },
                Mode::Url => {
                    if !Path::new(repository).exists() {
                        errors.push(format!("repository path does not exist: {repository}"));
                    }
                }
            }
        }

        if let Some(output) = section.output.as_deref() {
            if !output_pattern().is_match(output.trim()) {
                errors.push(format!(
                    "output must be a file name ending in .svg or .dot: '{output}'"
                ));
            }
        }

        let max_depth = match section.max_depth {
            None => {
                errors.push("missing required value 'max_depth'".to_string());
                None
            }
            Some(depth) if depth <= 0 => {
                errors.push(format!("max_depth must be greater than 0, got {depth}"));
                None
            }
            Some(depth) => usize::try_from(depth).ok(),
        };

        match (package, repository, mode, max_depth) {
            (Some(package), Some(repository), Some(mode), Some(max_depth)) if errors.is_empty() => {
                Ok(Self {
                    package,
                    repository,
                    mode,
                    max_depth,
                    output: section.output.as_ref().map(|o| o.trim().to_string()),
                })
            }
            _ => Err(ConfigError::Invalid(errors)),
        }
    }

    /// Node the resolution starts from.
    pub fn root_node(&self) -> NodeId {
        match self.mode {
            Mode::Test => NodeId::new(self.package.clone()),
            Mode::Url => Coordinates::parse(&self.package)
                .map(|coords| coords.node_id())
                .unwrap_or_else(|_| NodeId::new(self.package.clone())),
        }
    }

    pub fn key_value_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("package", self.package.clone()),
            ("repository", self.repository.clone()),
            ("mode", self.mode.to_string()),
            ("max_depth", self.max_depth.to_string()),
            ("output", self.output.clone().unwrap_or_default()),
        ]
    }
}

fn required(value: &Option<String>, key: &str, errors: &mut Vec<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => {
            errors.push(format!("missing required value '{key}'"));
            None
        }
    }
}

fn output_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[A-Za-z0-9_.-]+\.(svg|dot)$").expect("valid output pattern")
    })
}
