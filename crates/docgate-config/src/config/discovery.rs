use std::collections::BTreeMap;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use docgate_utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    CliArgs, Config, ConfigSource, DEFAULT_CONTEXT_MAP, DEFAULT_EXCLUDE, DEFAULT_HISTORY_LIMIT,
    DEFAULT_TEST_ROOTS, DEFAULT_VALID_LAYERS,
};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfig {
    corpus: Option<CorpusSection>,
    history: Option<HistorySection>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct CorpusSection {
    context_map: Option<String>,
    test_roots: Option<Vec<String>>,
    valid_layers: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct HistorySection {
    limit: Option<usize>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults.
    ///
    /// Uses the current working directory as the project root when
    /// `cli_args.root` is absent.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let start_dir = std::env::current_dir().map_err(|e| ConfigError::DiscoveryFailed {
            reason: format!("failed to get current directory: {e}"),
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory.
    ///
    /// This is the path-driven variant used by tests to avoid process-global
    /// state. `start_dir` stands in for the current working directory.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let root = match &cli_args.root {
            Some(root) => root.clone(),
            None => Utf8PathBuf::from_path_buf(start_dir.to_path_buf()).map_err(|p| {
                ConfigError::DiscoveryFailed {
                    reason: format!("project root is not UTF-8: {}", p.display()),
                }
            })?,
        };

        let mut source_attribution: BTreeMap<String, ConfigSource> = BTreeMap::new();
        for key in [
            "context_map",
            "test_roots",
            "valid_layers",
            "exclude",
            "history_limit",
        ] {
            source_attribution.insert(key.to_string(), ConfigSource::Defaults);
        }

        let mut context_map = DEFAULT_CONTEXT_MAP.to_string();
        let mut test_roots: Vec<String> =
            DEFAULT_TEST_ROOTS.iter().map(|s| (*s).to_string()).collect();
        let mut valid_layers: Vec<String> = DEFAULT_VALID_LAYERS
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let mut exclude: Vec<String> =
            DEFAULT_EXCLUDE.iter().map(|s| (*s).to_string()).collect();
        let mut history_limit = DEFAULT_HISTORY_LIMIT;

        // Discover the config file unless an explicit path was given.
        let config_path = if let Some(explicit) = &cli_args.config_path {
            if !explicit.exists() {
                return Err(ConfigError::NotFound {
                    path: explicit.to_string(),
                });
            }
            Some(explicit.clone())
        } else {
            find_config_file(&root)
        };

        if let Some(path) = &config_path {
            debug!(path = %path, "loading config file");
            let file = load_config_file(path)?;
            let source = ConfigSource::ConfigFile(path.clone());

            if let Some(corpus) = file.corpus {
                if let Some(map) = corpus.context_map {
                    context_map = map;
                    source_attribution.insert("context_map".to_string(), source.clone());
                }
                if let Some(roots) = corpus.test_roots {
                    test_roots = roots;
                    source_attribution.insert("test_roots".to_string(), source.clone());
                }
                if let Some(layers) = corpus.valid_layers {
                    valid_layers = layers;
                    source_attribution.insert("valid_layers".to_string(), source.clone());
                }
                if let Some(patterns) = corpus.exclude {
                    exclude = patterns;
                    source_attribution.insert("exclude".to_string(), source.clone());
                }
            }
            if let Some(history) = file.history {
                if let Some(limit) = history.limit {
                    history_limit = limit;
                    source_attribution.insert("history_limit".to_string(), source.clone());
                }
            }
        }

        // Apply CLI overrides (highest priority)
        if let Some(map) = &cli_args.context_map {
            context_map = map.clone();
            source_attribution.insert("context_map".to_string(), ConfigSource::Cli);
        }
        if !cli_args.test_roots.is_empty() {
            test_roots = cli_args.test_roots.clone();
            source_attribution.insert("test_roots".to_string(), ConfigSource::Cli);
        }
        if let Some(limit) = cli_args.history_limit {
            history_limit = limit;
            source_attribution.insert("history_limit".to_string(), ConfigSource::Cli);
        }

        let config = Self {
            root,
            context_map,
            test_roots,
            valid_layers,
            exclude,
            history_limit,
            config_path,
            source_attribution,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.context_map.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "context_map".to_string(),
                value: self.context_map.clone(),
            });
        }
        if self.valid_layers.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "valid_layers".to_string(),
                value: "[]".to_string(),
            });
        }
        if let Some(bad) = self.valid_layers.iter().find(|l| l.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "valid_layers".to_string(),
                value: bad.clone(),
            });
        }
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "history_limit".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Walk upward from `start` looking for `.docgate/config.toml`.
///
/// Stops at the filesystem root, or at a repository root (`.git`, `.hg`,
/// `.svn`) so one project's config never leaks into a sibling checkout.
fn find_config_file(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(".docgate").join("config.toml");
        if candidate.exists() {
            return Some(candidate);
        }
        if current.join(".git").exists()
            || current.join(".hg").exists()
            || current.join(".svn").exists()
        {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

fn load_config_file(path: &Utf8Path) -> Result<TomlConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::InvalidFile(format!("{path}: {e}")))?;
    toml::from_str(&content).map_err(|e| ConfigError::InvalidFile(format!("{path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Root with a `.git` marker so discovery never escapes the temp dir.
    fn hermetic_root(tmp: &TempDir) -> Utf8PathBuf {
        fs::create_dir(tmp.path().join(".git")).unwrap();
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap()
    }

    fn write_config(root: &Utf8Path, body: &str) {
        let dir = root.join(".docgate");
        fs::create_dir_all(dir.as_std_path()).unwrap();
        fs::write(dir.join("config.toml").as_std_path(), body).unwrap();
    }

    fn args_for(root: &Utf8Path) -> CliArgs {
        CliArgs {
            root: Some(root.to_path_buf()),
            ..CliArgs::default()
        }
    }

    #[test]
    fn test_defaults_apply_without_config_file() {
        let tmp = TempDir::new().unwrap();
        let root = hermetic_root(&tmp);

        let config = Config::discover_from(tmp.path(), &args_for(&root)).unwrap();
        assert_eq!(config.context_map, DEFAULT_CONTEXT_MAP);
        assert_eq!(config.test_roots, vec!["tests", "src/__tests__"]);
        assert_eq!(config.valid_layers.len(), 5);
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(config.config_path.is_none());
        assert_eq!(
            config.source_attribution.get("context_map"),
            Some(&ConfigSource::Defaults)
        );
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        let root = hermetic_root(&tmp);
        write_config(
            &root,
            "[corpus]\ncontext_map = \"docs/map.yaml\"\ntest_roots = [\"spec\"]\n\n[history]\nlimit = 5\n",
        );

        let config = Config::discover_from(tmp.path(), &args_for(&root)).unwrap();
        assert_eq!(config.context_map, "docs/map.yaml");
        assert_eq!(config.test_roots, vec!["spec"]);
        assert_eq!(config.history_limit, 5);
        assert!(matches!(
            config.source_attribution.get("context_map"),
            Some(ConfigSource::ConfigFile(_))
        ));
        // Keys the file does not set keep their default attribution.
        assert_eq!(
            config.source_attribution.get("valid_layers"),
            Some(&ConfigSource::Defaults)
        );
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let tmp = TempDir::new().unwrap();
        let root = hermetic_root(&tmp);
        write_config(
            &root,
            "[corpus]\ncontext_map = \"docs/map.yaml\"\n\n[history]\nlimit = 5\n",
        );

        let args = CliArgs {
            root: Some(root.clone()),
            context_map: Some("cli-map.yaml".to_string()),
            test_roots: vec!["cli-tests".to_string()],
            history_limit: Some(3),
            ..CliArgs::default()
        };
        let config = Config::discover_from(tmp.path(), &args).unwrap();
        assert_eq!(config.context_map, "cli-map.yaml");
        assert_eq!(config.test_roots, vec!["cli-tests"]);
        assert_eq!(config.history_limit, 3);
        assert_eq!(
            config.source_attribution.get("context_map"),
            Some(&ConfigSource::Cli)
        );
    }

    #[test]
    fn test_explicit_config_path_must_exist() {
        let tmp = TempDir::new().unwrap();
        let root = hermetic_root(&tmp);
        let args = CliArgs {
            root: Some(root.clone()),
            config_path: Some(root.join("missing.toml")),
            ..CliArgs::default()
        };
        let err = Config::discover_from(tmp.path(), &args).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }), "{err}");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let tmp = TempDir::new().unwrap();
        let root = hermetic_root(&tmp);
        write_config(&root, "[corpus\ncontext_map = ");

        let err = Config::discover_from(tmp.path(), &args_for(&root)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFile(_)), "{err}");
    }

    #[test]
    fn test_walkup_finds_ancestor_config() {
        let tmp = TempDir::new().unwrap();
        let top = hermetic_root(&tmp);
        write_config(&top, "[history]\nlimit = 7\n");
        let nested = top.join("sub/project");
        fs::create_dir_all(nested.as_std_path()).unwrap();

        let config = Config::discover_from(tmp.path(), &args_for(&nested)).unwrap();
        assert_eq!(config.history_limit, 7);
    }

    #[test]
    fn test_walkup_stops_at_repository_root() {
        let tmp = TempDir::new().unwrap();
        let top = hermetic_root(&tmp);
        write_config(&top, "[history]\nlimit = 7\n");
        // Nested checkout: its own .git marker shadows the ancestor config.
        let repo = top.join("sub");
        let nested = repo.join("project");
        fs::create_dir_all(nested.as_std_path()).unwrap();
        fs::create_dir(repo.join(".git").as_std_path()).unwrap();

        let config = Config::discover_from(tmp.path(), &args_for(&nested)).unwrap();
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_zero_history_limit_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let root = hermetic_root(&tmp);
        write_config(&root, "[history]\nlimit = 0\n");

        let err = Config::discover_from(tmp.path(), &args_for(&root)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "history_limit"),
            "{err}"
        );
    }

    #[test]
    fn test_empty_layer_override_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let root = hermetic_root(&tmp);
        write_config(&root, "[corpus]\nvalid_layers = []\n");

        let err = Config::discover_from(tmp.path(), &args_for(&root)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "valid_layers"),
            "{err}"
        );
    }
}
