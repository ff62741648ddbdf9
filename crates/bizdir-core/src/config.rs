use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (saved set, session state, logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Catalog file; defaults to `<data_dir>/catalog.json`
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_path: None,
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Records appended per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Delay before preloading page 1 after a filter reset
    #[serde(default = "default_initial_preload_delay")]
    pub initial_preload_delay_ms: u64,
    /// Delay before preloading the following page after an advance
    #[serde(default = "default_next_preload_delay")]
    pub next_preload_delay_ms: u64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            initial_preload_delay_ms: default_initial_preload_delay(),
            next_preload_delay_ms: default_next_preload_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Normalized scroll ratio that triggers loading the next page
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Quiet period used to coalesce bursts of scroll events
    #[serde(default = "default_scroll_debounce")]
    pub debounce_ms: u64,
    /// Polling interval while waiting for content to regrow after a reload
    #[serde(default = "default_restore_poll")]
    pub restore_poll_ms: u64,
    /// Give up on reload restoration after this long
    #[serde(default = "default_restore_timeout")]
    pub restore_timeout_ms: u64,
    /// Trigger stays disabled this long after a reload restoration jump
    #[serde(default = "default_restore_settle")]
    pub restore_settle_ms: u64,
    /// Trigger stays disabled this long after returning from a detail view
    #[serde(default = "default_return_settle")]
    pub return_settle_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            debounce_ms: default_scroll_debounce(),
            restore_poll_ms: default_restore_poll(),
            restore_timeout_ms: default_restore_timeout(),
            restore_settle_ms: default_restore_settle(),
            return_settle_ms: default_return_settle(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Typed search text is committed after this quiet period
    #[serde(default = "default_search_debounce")]
    pub debounce_ms: u64,
    /// Number of recent searches kept
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_search_debounce(),
            recent_limit: default_recent_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Rows used by one record card in the list
    #[serde(default = "default_card_height")]
    pub card_height: u16,
    /// Show the spotlight record above the list
    #[serde(default = "default_true")]
    pub show_spotlight: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            card_height: default_card_height(),
            show_spotlight: default_true(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bizdir")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> usize {
    20
}

fn default_initial_preload_delay() -> u64 {
    200
}

fn default_next_preload_delay() -> u64 {
    100
}

fn default_threshold() -> f64 {
    0.8
}

fn default_scroll_debounce() -> u64 {
    50
}

fn default_restore_poll() -> u64 {
    100
}

fn default_restore_timeout() -> u64 {
    5000
}

fn default_restore_settle() -> u64 {
    200
}

fn default_return_settle() -> u64 {
    100
}

fn default_search_debounce() -> u64 {
    300
}

fn default_recent_limit() -> usize {
    5
}

fn default_tick_rate() -> u64 {
    100
}

fn default_card_height() -> u16 {
    4
}

fn default_true() -> bool {
    true
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl PagingConfig {
    pub fn initial_preload_delay(&self) -> Duration {
        Duration::from_millis(self.initial_preload_delay_ms)
    }

    pub fn next_preload_delay(&self) -> Duration {
        Duration::from_millis(self.next_preload_delay_ms)
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl ScrollConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn restore_poll(&self) -> Duration {
        Duration::from_millis(self.restore_poll_ms)
    }

    pub fn restore_timeout(&self) -> Duration {
        Duration::from_millis(self.restore_timeout_ms)
    }

    pub fn restore_settle(&self) -> Duration {
        Duration::from_millis(self.restore_settle_ms)
    }

    pub fn return_settle(&self) -> Duration {
        Duration::from_millis(self.return_settle_ms)
    }
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.paging.page_size == 0 {
            return Err(crate::Error::Config("paging.page_size must be > 0".into()));
        }
        if !(self.scroll.threshold > 0.0 && self.scroll.threshold <= 1.0) {
            return Err(crate::Error::Config(
                "scroll.threshold must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/bizdir/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("bizdir")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Catalog file to load at startup
    pub fn catalog_path(&self) -> PathBuf {
        match &self.general.catalog_path {
            Some(path) => expand_tilde(path),
            None => self.data_dir().join("catalog.json"),
        }
    }

    /// Durable store for the saved set and recent searches
    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir().join("local.json")
    }

    /// Durable store for session state such as the list scroll offset
    pub fn session_store_path(&self) -> PathBuf {
        self.data_dir().join("session.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("bizdir.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.paging.page_size, 20);
        assert!((config.scroll.threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.scroll.debounce_ms, 50);
        assert_eq!(config.scroll.restore_poll_ms, 100);
        assert_eq!(config.scroll.restore_timeout_ms, 5000);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search.recent_limit, 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [paging]
            page_size = 10

            [scroll]
            restore_timeout_ms = 2500
            "#,
        )
        .unwrap();
        assert_eq!(config.paging.page_size, 10);
        assert_eq!(config.paging.initial_preload_delay_ms, 200);
        assert_eq!(config.scroll.restore_timeout_ms, 2500);
        assert_eq!(config.scroll.debounce_ms, 50);
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let err = AppConfig::from_toml("[paging]\npage_size = 0\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_catalog_path_defaults_to_data_dir() {
        let mut config = AppConfig::default();
        config.general.data_dir = PathBuf::from("/tmp/bizdir-test");
        assert_eq!(
            config.catalog_path(),
            PathBuf::from("/tmp/bizdir-test/catalog.json")
        );

        config.general.catalog_path = Some(PathBuf::from("/srv/records.json"));
        assert_eq!(config.catalog_path(), PathBuf::from("/srv/records.json"));
    }
}
