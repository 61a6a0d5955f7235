use roxmltree::{Document, Node};

use crate::core::coordinates::Coordinates;
use crate::core::properties::{has_placeholder, resolve_placeholders, PropertyMap};
use crate::source::FetchError;

/// The subset of a POM manifest needed to list direct dependencies.
#[derive(Debug, Clone, Default)]
pub struct PomModel {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<PomParent>,
    pub properties: PropertyMap,
    pub dependencies: Vec<PomDependency>,
}

#[derive(Debug, Clone, Default)]
pub struct PomParent {
    pub group_id: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PomDependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: bool,
}

impl PomModel {
    pub fn parse(xml: &str) -> Result<Self, FetchError> {
        let document =
            Document::parse(xml).map_err(|err| FetchError::Manifest(err.to_string()))?;
        let project = document.root_element();
        if project.tag_name().name() != "project" {
            return Err(FetchError::Manifest(format!(
                "expected <project> root element, found <{}>",
                project.tag_name().name()
            )));
        }

        let parent = child(&project, "parent").map(|node| PomParent {
            group_id: child_text(&node, "groupId"),
            version: child_text(&node, "version"),
        });

        let properties = child(&project, "properties")
            .map(|node| {
                node.children()
                    .filter(Node::is_element)
                    .filter_map(|prop| {
                        let key = prop.tag_name().name().to_string();
                        let value = prop.text().map(str::trim).unwrap_or_default();
                        if key.is_empty() || value.is_empty() {
                            return None;
                        }
                        Some((key, value.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let dependencies = child(&project, "dependencies")
            .map(|node| {
                node.children()
                    .filter(|dep| dep.is_element() && dep.tag_name().name() == "dependency")
                    .map(|dep| PomDependency {
                        group_id: child_text(&dep, "groupId"),
                        artifact_id: child_text(&dep, "artifactId"),
                        version: child_text(&dep, "version"),
                        scope: child_text(&dep, "scope"),
                        optional: child_text(&dep, "optional")
                            .map(|value| value.eq_ignore_ascii_case("true"))
                            .unwrap_or(false),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            group_id: child_text(&project, "groupId"),
            artifact_id: child_text(&project, "artifactId"),
            version: child_text(&project, "version"),
            parent,
            properties,
            dependencies,
        })
    }

    /// Properties visible to placeholders in this manifest.
    ///
    /// `project.*` (and the older `pom.*`) keys come first, taken from the
    /// manifest, then its parent, then the coordinates it was requested
    /// under. Declared `<properties>` override them.
    pub fn property_map(&self, requested: &Coordinates) -> PropertyMap {
        let group_id = self
            .group_id
            .clone()
            .or_else(|| self.parent.as_ref().and_then(|p| p.group_id.clone()))
            .unwrap_or_else(|| requested.group_id.clone());
        let artifact_id = self
            .artifact_id
            .clone()
            .unwrap_or_else(|| requested.artifact_id.clone());
        let version = self
            .version
            .clone()
            .or_else(|| self.parent.as_ref().and_then(|p| p.version.clone()))
            .unwrap_or_else(|| requested.version.clone());

        let mut props = PropertyMap::new();
        for prefix in ["project", "pom"] {
            props.insert(format!("{prefix}.groupId"), group_id.clone());
            props.insert(format!("{prefix}.artifactId"), artifact_id.clone());
            props.insert(format!("{prefix}.version"), version.clone());
        }
        props.extend(self.properties.clone());
        props
    }

    /// Declared dependencies with placeholders substituted.
    ///
    /// Entries without a group or artifact are skipped, as are entries whose
    /// version is absent or still holds an unresolved placeholder.
    pub fn resolved_dependencies(&self, requested: &Coordinates) -> Vec<Coordinates> {
        let props = self.property_map(requested);
        let mut out = Vec::new();
        for dep in &self.dependencies {
            let (Some(group), Some(artifact)) = (dep.group_id.as_deref(), dep.artifact_id.as_deref())
            else {
                continue;
            };
            let Some(version) = dep
                .version
                .as_deref()
                .map(|raw| resolve_placeholders(raw, &props))
                .filter(|version| !version.is_empty() && !has_placeholder(version))
            else {
                tracing::debug!(
                    %requested,
                    group,
                    artifact,
                    "skipping dependency without a resolvable version"
                );
                continue;
            };
            tracing::debug!(
                %requested,
                group,
                artifact,
                %version,
                scope = dep.scope.as_deref().unwrap_or("compile"),
                optional = dep.optional,
                "direct dependency"
            );
            out.push(Coordinates::new(
                resolve_placeholders(group, &props),
                resolve_placeholders(artifact, &props),
                version,
            ));
        }
        out
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == tag)
}

fn child_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
