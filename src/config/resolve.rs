use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, ConfigFile, ResolveSection, Settings};

pub const CONFIG_FILE_NAME: &str = "depgraph.toml";
pub const CONFIG_ENV: &str = "DEPGRAPH_CONFIG";

/// Finds the config file to use, if any.
///
/// An explicit path wins, then `DEPGRAPH_CONFIG`, then the nearest
/// `depgraph.toml` in `start` or one of its ancestors. Explicit and env
/// paths must exist; discovery may come up empty.
pub fn locate_config(
    start: impl AsRef<Path>,
    explicit: Option<PathBuf>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        return require_file(path).map(Some);
    }

    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return require_file(PathBuf::from(path)).map(Some);
        }
    }

    Ok(find_config_from(start.as_ref()))
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads, merges and validates settings. `overrides` come from the command
/// line and take precedence over the file.
pub fn load_settings(
    start: impl AsRef<Path>,
    explicit: Option<PathBuf>,
    overrides: ResolveSection,
) -> Result<Settings, ConfigError> {
    let section = match locate_config(start, explicit)? {
        Some(path) => {
            let base = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            load_config_file(&path)?.resolve.anchor_repository(&base)
        }
        None => ResolveSection::default(),
    };
    Settings::validate(&section.merge(overrides))
}

fn require_file(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::ConfigNotFound(path))
    }
}

fn find_config_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::config::resolve::{load_config_file, load_settings, locate_config, CONFIG_FILE_NAME};
    use crate::config::{ConfigError, Mode, ResolveSection};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("depgraph-{prefix}-{pid}-{nanos}"))
    }

    #[test]
    fn finds_config_in_ancestor_directory() {
        let root = unique_temp_dir("config-ancestor");
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).expect("create nested dirs");
        fs::write(root.join(CONFIG_FILE_NAME), "[resolve]\nmode = \"test\"\n")
            .expect("write config");

        let found = locate_config(&nested, None).expect("locate config");
        assert_eq!(found, Some(root.join(CONFIG_FILE_NAME)));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn explicit_path_must_exist() {
        let missing = unique_temp_dir("config-missing").join(CONFIG_FILE_NAME);
        let err = locate_config(std::env::temp_dir(), Some(missing)).expect_err("missing file");
        assert!(matches!(err, ConfigError::ConfigNotFound(_)));
    }

    #[test]
    fn reports_toml_errors_with_path() {
        let root = unique_temp_dir("config-bad-toml");
        fs::create_dir_all(&root).expect("create dir");
        let path = root.join(CONFIG_FILE_NAME);
        fs::write(&path, "[resolve\nmode = 1").expect("write config");
        let err = load_config_file(&path).expect_err("invalid toml");
        assert!(matches!(err, ConfigError::Toml { .. }));
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn fixture_paths_resolve_next_to_the_config_file() {
        let root = unique_temp_dir("config-relative");
        fs::create_dir_all(root.join("fixtures")).expect("create fixtures dir");
        fs::write(root.join("fixtures").join("graph.txt"), "A:B\n").expect("write fixture");
        fs::write(
            root.join(CONFIG_FILE_NAME),
            "[resolve]\npackage = \"A\"\nrepository = \"fixtures/graph.txt\"\nmode = \"test\"\nmax_depth = 2\n",
        )
        .expect("write config");

        let settings = load_settings(
            &root,
            Some(root.join(CONFIG_FILE_NAME)),
            ResolveSection {
                max_depth: Some(4),
                ..ResolveSection::default()
            },
        )
        .expect("load settings");
        assert_eq!(settings.mode, Mode::Test);
        assert_eq!(settings.max_depth, 4);
        assert_eq!(
            PathBuf::from(&settings.repository),
            root.join("fixtures/graph.txt")
        );

        let _ = fs::remove_dir_all(root);
    }
}
