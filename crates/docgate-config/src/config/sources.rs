use std::collections::BTreeMap;

use super::{Config, ConfigSource};

fn stable_source_label(source: &ConfigSource) -> &'static str {
    match source {
        ConfigSource::Cli => "cli",
        ConfigSource::ConfigFile(_) => "config",
        ConfigSource::Defaults => "default",
    }
}

fn source_label(source: Option<&ConfigSource>) -> String {
    match source {
        Some(src) => stable_source_label(src).to_string(),
        None => stable_source_label(&ConfigSource::Defaults).to_string(),
    }
}

impl Config {
    /// Get effective configuration as key-value pairs with source attribution
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add_config = |key: &str, value: String| {
            let source = source_label(self.source_attribution.get(key));
            config.insert(key.to_string(), (value, source));
        };

        add_config("context_map", self.context_map.clone());
        add_config("test_roots", self.test_roots.join(","));
        add_config("valid_layers", self.valid_layers.join(","));
        add_config("exclude", self.exclude.join(","));
        add_config("history_limit", self.history_limit.to_string());

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn config_with(attr: &[(&str, ConfigSource)]) -> Config {
        let mut source_attribution = BTreeMap::new();
        for (key, source) in attr {
            source_attribution.insert((*key).to_string(), source.clone());
        }
        Config {
            root: Utf8PathBuf::from("/project"),
            context_map: "context-map.yaml".to_string(),
            test_roots: vec!["tests".to_string()],
            valid_layers: vec!["STRATEGY".to_string()],
            exclude: vec![],
            history_limit: 20,
            config_path: None,
            source_attribution,
        }
    }

    #[test]
    fn test_effective_config_labels_sources() {
        let config = config_with(&[
            ("context_map", ConfigSource::Cli),
            (
                "test_roots",
                ConfigSource::ConfigFile(Utf8PathBuf::from("x.toml")),
            ),
        ]);
        let effective = config.effective_config();
        assert_eq!(
            effective.get("context_map"),
            Some(&("context-map.yaml".to_string(), "cli".to_string()))
        );
        assert_eq!(
            effective.get("test_roots"),
            Some(&("tests".to_string(), "config".to_string()))
        );
        // Unattributed keys fall back to the default label.
        assert_eq!(
            effective.get("history_limit"),
            Some(&("20".to_string(), "default".to_string()))
        );
    }

    #[test]
    fn test_effective_config_covers_every_key() {
        let effective = config_with(&[]).effective_config();
        for key in [
            "context_map",
            "test_roots",
            "valid_layers",
            "exclude",
            "history_limit",
        ] {
            assert!(effective.contains_key(key), "missing {key}");
        }
    }
}
