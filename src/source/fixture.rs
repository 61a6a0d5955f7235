use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::core::node::NodeId;
use crate::source::traits::MetadataSource;
use crate::source::FetchError;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: missing ':' separator")]
    MissingSeparator { line: usize },
    #[error("line {line}: invalid node id '{id}'")]
    InvalidId { line: usize, id: String },
    #[error("line {line}: invalid dependency '{dep}'")]
    InvalidDependency { line: usize, dep: String },
}

/// In-memory adjacency table read from a fixture file.
///
/// ```text
/// # comment
/// A:B,C
/// B:
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    graph: HashMap<NodeId, Vec<NodeId>>,
}

impl FixtureSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, FixtureError> {
        let mut graph = HashMap::new();
        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, deps_part) = match line.split_once(':') {
                Some((id, rest)) if !id.is_empty() => (id.trim(), rest.trim()),
                _ => return Err(FixtureError::MissingSeparator { line: line_no }),
            };
            if !id_pattern().is_match(id) {
                return Err(FixtureError::InvalidId {
                    line: line_no,
                    id: id.to_string(),
                });
            }

            let mut deps = Vec::new();
            for dep in deps_part.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                if !id_pattern().is_match(dep) {
                    return Err(FixtureError::InvalidDependency {
                        line: line_no,
                        dep: dep.to_string(),
                    });
                }
                deps.push(NodeId::new(dep));
            }
            graph.insert(NodeId::new(id), deps);
        }
        Ok(Self { graph })
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

impl MetadataSource for FixtureSource {
    fn direct_dependencies(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError> {
        Ok(self.graph.get(id).cloned().unwrap_or_default())
    }
}

pub fn is_fixture_id(value: &str) -> bool {
    id_pattern().is_match(value)
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]+$").expect("valid fixture id pattern"))
}

#[cfg(test)]
mod tests {
    use crate::core::node::NodeId;
    use crate::source::fixture::{FixtureError, FixtureSource};
    use crate::source::traits::MetadataSource;

    fn deps(source: &FixtureSource, id: &str) -> Vec<String> {
        source
            .direct_dependencies(&NodeId::new(id))
            .expect("fixture lookup")
            .into_iter()
            .map(|dep| dep.as_str().to_string())
            .collect()
    }

    #[test]
    fn parses_records_comments_and_blank_lines() {
        let source = FixtureSource::parse(
            "# sample graph\n\nA:B, C\nB:D\nC:\n  ROOT : A\n",
        )
        .expect("parse fixture");
        assert_eq!(source.len(), 4);
        assert_eq!(deps(&source, "A"), vec!["B", "C"]);
        assert_eq!(deps(&source, "ROOT"), vec!["A"]);
        assert!(deps(&source, "C").is_empty());
    }

    #[test]
    fn unknown_nodes_have_no_dependencies() {
        let source = FixtureSource::parse("A:B\n").expect("parse fixture");
        assert!(deps(&source, "B").is_empty());
        assert!(deps(&source, "ZZZ").is_empty());
    }

    #[test]
    fn missing_separator_is_fatal() {
        let err = FixtureSource::parse("A:B\nB C\n").expect_err("line without colon");
        assert!(matches!(err, FixtureError::MissingSeparator { line: 2 }));
        let err = FixtureSource::parse(":B\n").expect_err("empty id");
        assert!(matches!(err, FixtureError::MissingSeparator { line: 1 }));
    }

    #[test]
    fn lowercase_ids_are_rejected_with_line_number() {
        let err = FixtureSource::parse("# header\nab:B\n").expect_err("lowercase id");
        assert!(matches!(err, FixtureError::InvalidId { line: 2, .. }));

        let err = FixtureSource::parse("A:B,c1\n").expect_err("bad dependency");
        match err {
            FixtureError::InvalidDependency { line, dep } => {
                assert_eq!(line, 1);
                assert_eq!(dep, "c1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
