use pagecraft_editor::HistoryOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding page documents, markup and metadata
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Page loaded when a requested slug does not exist
    #[serde(default = "default_slug")]
    pub default_slug: String,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

fn default_pages_dir() -> String {
    "public/pages".to_string()
}

fn default_slug() -> String {
    pagecraft_pages::DEFAULT_SLUG.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Undo levels kept (0 = unlimited)
    pub max_levels: usize,

    /// Pause after which edits of the same prop stop merging
    pub coalesce_window_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_levels: 100,
            coalesce_window_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Indent rendered markup
    pub pretty: bool,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the pages directory
    pub fn get_pages_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.pages_dir)
    }

    pub fn history_options(&self) -> HistoryOptions {
        HistoryOptions {
            max_levels: self.history.max_levels,
            coalesce_window: Some(Duration::from_millis(self.history.coalesce_window_ms)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            default_slug: default_slug(),
            history: HistoryConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "pagesDir": "site/pages",
            "defaultSlug": "index",
            "history": { "maxLevels": 20, "coalesceWindowMs": 250 },
            "render": { "pretty": true }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.pages_dir, "site/pages");
        assert_eq!(config.default_slug, "index");
        assert_eq!(config.history.max_levels, 20);
        assert!(config.render.pretty);
        assert_eq!(
            config.history_options().coalesce_window,
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "history": { "maxLevels": 5 } }"#).unwrap();

        assert_eq!(config.pages_dir, "public/pages");
        assert_eq!(config.default_slug, "home");
        assert_eq!(config.history.max_levels, 5);
        assert_eq!(config.history.coalesce_window_ms, 1000);
        assert!(!config.render.pretty);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pages_dir, "public/pages");
        assert_eq!(config.history_options(), HistoryOptions::default());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config, Config::default());
    }
}
