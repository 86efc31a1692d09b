use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    pub path: Option<PathBuf>,
    #[serde(default = "default_users_key")]
    pub users_key: String,
    #[serde(default = "default_work_data_key")]
    pub work_data_key: String,
    pub quota_bytes: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatencyConfig {
    #[serde(default = "default_latency_enabled")]
    pub enabled: bool,
    #[serde(default = "default_auth_ms")]
    pub auth_ms: u64,
    #[serde(default = "default_save_ms")]
    pub save_ms: u64,
    #[serde(default = "default_load_ms")]
    pub load_ms: u64,
    #[serde(default = "default_delete_ms")]
    pub delete_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_max_username_attempts")]
    pub max_username_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            users_key: default_users_key(),
            work_data_key: default_work_data_key(),
            quota_bytes: None,
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: default_latency_enabled(),
            auth_ms: default_auth_ms(),
            save_ms: default_save_ms(),
            load_ms: default_load_ms(),
            delete_ms: default_delete_ms(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_username_attempts: default_max_username_attempts(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

// Default value functions
fn default_backend() -> StorageBackend {
    StorageBackend::Memory
}

fn default_users_key() -> String {
    "color-picker-users".to_string()
}

fn default_work_data_key() -> String {
    "color-picker-work-data".to_string()
}

fn default_latency_enabled() -> bool {
    true
}

fn default_auth_ms() -> u64 {
    500
}

fn default_save_ms() -> u64 {
    300
}

fn default_load_ms() -> u64 {
    300
}

fn default_delete_ms() -> u64 {
    200
}

fn default_max_username_attempts() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl LatencyConfig {
    pub fn auth(&self) -> Duration {
        Duration::from_millis(self.auth_ms)
    }

    pub fn save(&self) -> Duration {
        Duration::from_millis(self.save_ms)
    }

    pub fn load(&self) -> Duration {
        Duration::from_millis(self.load_ms)
    }

    pub fn delete(&self) -> Duration {
        Duration::from_millis(self.delete_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate storage config
        if self.storage.backend == StorageBackend::File && self.storage.path.is_none() {
            bail!("storage.path must be set when the file backend is selected");
        }

        if self.storage.users_key.is_empty() {
            bail!("users_key must not be empty");
        }

        if self.storage.work_data_key.is_empty() {
            bail!("work_data_key must not be empty");
        }

        if self.storage.users_key == self.storage.work_data_key {
            bail!(
                "users_key and work_data_key must differ (both are '{}')",
                self.storage.users_key
            );
        }

        if self.storage.quota_bytes == Some(0) {
            bail!("quota_bytes must be greater than 0");
        }

        // Validate auth config
        if self.auth.max_username_attempts == 0 {
            bail!("max_username_attempts must be greater than 0");
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").expect("Failed to parse empty config");

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.users_key, "color-picker-users");
        assert_eq!(config.storage.work_data_key, "color-picker-work-data");
        assert!(config.latency.enabled);
        assert_eq!(config.latency.auth(), Duration::from_millis(500));
        assert_eq!(config.latency.save(), Duration::from_millis(300));
        assert_eq!(config.latency.load(), Duration::from_millis(300));
        assert_eq!(config.latency.delete(), Duration::from_millis(200));
        assert_eq!(config.auth.max_username_attempts, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            [storage]
            backend = "file"
            path = "/tmp/colorvault.json"
            users_key = "users"
            work_data_key = "works"

            [latency]
            enabled = false
            auth_ms = 10

            [auth]
            max_username_attempts = 3

            [logging]
            level = "debug"
            format = "console"
            "#,
        )
        .expect("Failed to parse config");

        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/colorvault.json")));
        assert_eq!(config.storage.users_key, "users");
        assert!(!config.latency.enabled);
        assert_eq!(config.latency.auth_ms, 10);
        assert_eq!(config.latency.save_ms, 300);
        assert_eq!(config.auth.max_username_attempts, 3);
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn test_file_backend_requires_path() {
        let err = Config::from_toml("[storage]\nbackend = \"file\"\n").unwrap_err();
        assert!(err.to_string().contains("storage.path"));
    }

    #[test]
    fn test_rejects_same_keys() {
        let result = Config::from_toml(
            "[storage]\nusers_key = \"shared\"\nwork_data_key = \"shared\"\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let result = Config::from_toml("[auth]\nmax_username_attempts = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_invalid_log_level() {
        let result = Config::from_toml("[logging]\nlevel = \"verbose\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_backend() {
        let result = Config::from_toml("[storage]\nbackend = \"redis\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[latency]\nload_ms = 42\n").unwrap();

        let config = Config::from_file(&path).expect("Failed to load config");
        assert_eq!(config.latency.load(), Duration::from_millis(42));
    }

    #[test]
    fn test_from_missing_file() {
        let path = PathBuf::from("/nonexistent/colorvault.toml");
        assert!(Config::from_file(&path).is_err());
    }
}
