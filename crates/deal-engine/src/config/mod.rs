use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    /// Optional `key=value` file holding analysis thresholds and multipliers.
    pub settings_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let settings_file = env::var("DEAL_SETTINGS_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            settings_file,
        })
    }

    /// Base analysis settings. Empty when no settings file is configured.
    pub fn analysis_settings(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        match &self.settings_file {
            Some(path) => load_settings_file(path),
            None => Ok(BTreeMap::new()),
        }
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Reads a flat settings file. Blank lines and `#` comments are skipped; later keys win.
pub fn load_settings_file(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&contents)
}

pub fn parse_settings(contents: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut settings = BTreeMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = parse_setting_pair(line)?;
        settings.insert(key, value);
    }
    Ok(settings)
}

/// Splits `key=value`, trimming both halves.
pub fn parse_setting_pair(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::MalformedSetting {
            entry: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    SettingsFile {
        path: PathBuf,
        source: std::io::Error,
    },
    MalformedSetting {
        entry: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::SettingsFile { path, .. } => {
                write!(f, "unable to read settings file {}", path.display())
            }
            ConfigError::MalformedSetting { entry } => {
                write!(f, "setting '{}' must take the form key=value", entry)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::MalformedSetting { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::SettingsFile { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("DEAL_SETTINGS_FILE");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.settings_file.is_none());
        assert!(config
            .analysis_settings()
            .expect("no file means no settings")
            .is_empty());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_invalid_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "http");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        reset_env();
    }

    #[test]
    fn missing_settings_file_is_reported() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DEAL_SETTINGS_FILE", "./no-such-settings.conf");
        let config = AppConfig::load().expect("config loads");
        match config.analysis_settings() {
            Err(ConfigError::SettingsFile { path, .. }) => {
                assert_eq!(path, PathBuf::from("./no-such-settings.conf"))
            }
            other => panic!("expected settings file error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn settings_parse_skips_comments_and_trims() {
        let settings = parse_settings(
            "# acquisition\narvMultiplier = 0.65\n\nhotMinSpread=30000\narvMultiplier=0.68\n",
        )
        .expect("settings parse");
        assert_eq!(settings.get("arvMultiplier").map(String::as_str), Some("0.68"));
        assert_eq!(settings.get("hotMinSpread").map(String::as_str), Some("30000"));
        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn setting_pair_requires_a_key() {
        assert!(matches!(
            parse_setting_pair("=5"),
            Err(ConfigError::MalformedSetting { .. })
        ));
        assert!(matches!(
            parse_setting_pair("holdingMonths"),
            Err(ConfigError::MalformedSetting { .. })
        ));
        assert_eq!(
            parse_setting_pair("exit.expenseRatio=0.35").expect("pair parses"),
            ("exit.expenseRatio".to_string(), "0.35".to_string())
        );
    }
}
