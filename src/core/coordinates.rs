use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::core::node::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("expected groupId:artifactId:version, got '{0}'")]
    Shape(String),
    #[error("blank {part} in coordinates '{raw}'")]
    Blank { part: &'static str, raw: String },
    #[error("invalid {part} '{value}' in coordinates '{raw}'")]
    InvalidToken {
        part: &'static str,
        value: String,
        raw: String,
    },
}

/// Maven style `groupId:artifactId:version` triplet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinates {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// Strict parse for user supplied coordinates: every token must match
    /// `[A-Za-z0-9_.-]+`.
    pub fn parse(raw: &str) -> Result<Self, CoordinateError> {
        Self::split(raw, true)
    }

    /// Parse for ids taken from published manifests. Only the shape and
    /// non-blank tokens are checked, so versions like `1.0+build` survive.
    pub fn parse_published(raw: &str) -> Result<Self, CoordinateError> {
        Self::split(raw, false)
    }

    fn split(raw: &str, strict: bool) -> Result<Self, CoordinateError> {
        let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(CoordinateError::Shape(raw.to_string()));
        }

        for (part, value) in ["groupId", "artifactId", "version"].into_iter().zip(&parts) {
            if value.is_empty() {
                return Err(CoordinateError::Blank {
                    part,
                    raw: raw.to_string(),
                });
            }
            if strict && !token_pattern().is_match(value) {
                return Err(CoordinateError::InvalidToken {
                    part,
                    value: value.to_string(),
                    raw: raw.to_string(),
                });
            }
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    /// Path of this artifact's manifest relative to a repository root.
    pub fn pom_path(&self) -> String {
        let group_path = self.group_id.replace('.', "/");
        format!(
            "{group_path}/{artifact}/{version}/{artifact}-{version}.pom",
            artifact = self.artifact_id,
            version = self.version
        )
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::new(self.to_string())
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid coordinate pattern"))
}
