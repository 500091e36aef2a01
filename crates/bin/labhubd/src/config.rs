//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `labhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use labhub_app::task_queue::RetryPolicy;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Model file storage.
    pub uploads: UploadsConfig,
    /// Background task queue.
    pub queue: QueueConfig,
    /// First admin account.
    pub auth: AuthConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Upload storage configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Directory holding `uploads/`. Must not be served publicly.
    pub root: PathBuf,
}

/// Task queue configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Tasks buffered before dispatching waits for room.
    pub capacity: usize,
    /// Runs of a failing task before it is dropped.
    pub max_attempts: u32,
    /// Base delay between runs, multiplied by the attempt number.
    pub retry_delay_ms: u64,
}

/// Admin bootstrap configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token of the admin account created when no user exists yet.
    pub admin_token: Option<String>,
    /// Email of that admin account.
    pub admin_email: String,
}

impl Config {
    /// Load configuration from `labhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("labhub.toml")?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("LABHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("LABHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("LABHUB_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("LABHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("LABHUB_UPLOADS_ROOT") {
            self.uploads.root = PathBuf::from(val);
        }
        if let Some(val) = var("LABHUB_ADMIN_TOKEN") {
            self.auth.admin_token = Some(val);
        }
        if let Some(val) = var("LABHUB_ADMIN_EMAIL") {
            self.auth.admin_email = val;
        }
        if let Some(val) = var("LABHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.queue.capacity == 0 {
            return Err(ConfigError::Validation(
                "queue capacity must be non-zero".to_string(),
            ));
        }
        if self.queue.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "queue max_attempts must be non-zero".to_string(),
            ));
        }
        if self
            .auth
            .admin_token
            .as_deref()
            .is_some_and(|token| token.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "admin token must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Retry behaviour of the task worker.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.queue.max_attempts,
            retry_delay: Duration::from_millis(self.queue.retry_delay_ms),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:labhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "labhubd=info,labhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_token: None,
            admin_email: "admin@labhub.local".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:labhub.db?mode=rwc");
        assert_eq!(config.uploads.root, PathBuf::from("."));
        assert_eq!(config.queue.capacity, 256);
        assert!(config.auth.admin_token.is_none());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [uploads]
            root = '/var/lib/labhub'

            [queue]
            capacity = 16
            max_attempts = 5
            retry_delay_ms = 100

            [auth]
            admin_token = 'secret'
            admin_email = 'ops@example.com'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.uploads.root, PathBuf::from("/var/lib/labhub"));
        assert_eq!(config.queue.capacity, 16);
        assert_eq!(config.auth.admin_token.as_deref(), Some("secret"));
        assert_eq!(config.auth.admin_email, "ops@example.com");

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.retry_delay, Duration::from_millis(100));
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();

        config.apply_overrides(env(&[
            ("LABHUB_DATABASE_URL", "sqlite::memory:"),
            ("LABHUB_UPLOADS_ROOT", "/srv/labhub"),
            ("LABHUB_ADMIN_TOKEN", "bootstrap"),
            ("LABHUB_ADMIN_EMAIL", "root@example.com"),
            ("LABHUB_PORT", "8080"),
        ]));

        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.uploads.root, PathBuf::from("/srv/labhub"));
        assert_eq!(config.auth.admin_token.as_deref(), Some("bootstrap"));
        assert_eq!(config.auth.admin_email, "root@example.com");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn should_prefer_bind_over_host_and_port() {
        let mut config = Config::default();

        config.apply_overrides(env(&[
            ("LABHUB_HOST", "10.0.0.1"),
            ("LABHUB_PORT", "8080"),
            ("LABHUB_BIND", "127.0.0.1:4000"),
        ]));

        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
    }

    #[test]
    fn should_prefer_rust_log_over_labhub_log() {
        let mut config = Config::default();

        config.apply_overrides(env(&[("LABHUB_LOG", "debug"), ("RUST_LOG", "trace")]));

        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_port() {
        let mut config = Config::default();

        config.apply_overrides(env(&[("LABHUB_PORT", "http")]));

        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_queue() {
        let mut config = Config::default();
        config.queue.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.queue.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_blank_admin_token() {
        let mut config = Config::default();
        config.auth.admin_token = Some("  ".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
