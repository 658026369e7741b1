//! econwatch configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EconError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EconConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl EconConfig {
    /// Load config from the default path (~/.econwatch/config.toml).
    /// Missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EconError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| EconError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| EconError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the econwatch home directory (~/.econwatch).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".econwatch")
    }
}

/// Discord delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Channel that receives the alerts.
    #[serde(default)]
    pub channel_id: String,
    #[serde(default = "bool_true")]
    pub enabled: bool,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            enabled: true,
        }
    }
}

/// Calendar source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_calendar_url")]
    pub url: String,
    /// User agents rotated per request to look like a browser.
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_calendar_url(),
            user_agents: default_user_agents(),
        }
    }
}

fn default_calendar_url() -> String {
    "https://www.marketwatch.com/economy-politics/calendar".into()
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".into(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".into(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".into(),
    ]
}

/// Notifier (scheduling engine) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Pre-event alert offsets, minutes before the event instant,
    /// descending. The final (smallest) offset chains the results refresh.
    #[serde(default = "default_offsets")]
    pub offsets_minutes: Vec<i64>,
    /// Delay between the final pre-event alert and the results refresh.
    /// Tuned empirically; the source usually has numbers within a minute
    /// or two of the release.
    #[serde(default = "default_result_delay")]
    pub result_delay_secs: u64,
    /// Group by instant+title instead of instant only.
    #[serde(default)]
    pub strict_grouping: bool,
    /// Daily re-scrape trigger, 5-field cron (minute hour dom mon dow).
    #[serde(default = "default_scrape_cron")]
    pub daily_scrape_cron: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            offsets_minutes: default_offsets(),
            result_delay_secs: default_result_delay(),
            strict_grouping: false,
            daily_scrape_cron: default_scrape_cron(),
        }
    }
}

fn default_offsets() -> Vec<i64> {
    vec![30, 1]
}

fn default_result_delay() -> u64 {
    90
}

fn default_scrape_cron() -> String {
    "0 3 * * *".into()
}

/// Snapshot store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Directory holding events.json. Defaults to ~/.econwatch/data.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| EconConfig::home_dir().join("data"))
    }
}

fn bool_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = EconConfig::default();
        assert_eq!(cfg.notifier.offsets_minutes, vec![30, 1]);
        assert_eq!(cfg.notifier.result_delay_secs, 90);
        assert!(!cfg.notifier.strict_grouping);
        assert!(cfg.discord.enabled);
        assert!(cfg.source.url.contains("calendar"));
    }

    #[test]
    fn parses_partial_toml() {
        let cfg: EconConfig = toml::from_str(
            r#"
            [discord]
            bot_token = "t"
            channel_id = "123"

            [notifier]
            result_delay_secs = 75
            strict_grouping = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.discord.channel_id, "123");
        assert_eq!(cfg.notifier.result_delay_secs, 75);
        assert!(cfg.notifier.strict_grouping);
        // untouched sections fall back to defaults
        assert_eq!(cfg.notifier.offsets_minutes, vec![30, 1]);
    }
}
