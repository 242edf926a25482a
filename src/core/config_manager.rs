// src/core/config_manager.rs
//! Configuration: environment variables layered over an optional config.yaml

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;


const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const DEFAULT_PORT: u16 = 4100;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONTACT_CONFIRM_MS: u64 = 2000;
const DEFAULT_LOG_FILTER: &str = "pazzle=info,rocket::server=off";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub supabase: SupabaseConfig,
    pub server: ServerSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub jwt_secret: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub contact_confirm_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub path: PathBuf,
    pub filter: String,
}

/// One environment's section of config.yaml; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileSection {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_jwt_secret: Option<String>,
    pub port: Option<u16>,
    pub log_path: Option<PathBuf>,
    pub log_filter: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub contact_confirm_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub local: FileSection,
    #[serde(default)]
    pub production: FileSection,
}

impl FileConfig {
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse configuration file")
    }

    fn section(&self, environment: &str) -> &FileSection {
        if environment == "production" {
            &self.production
        } else {
            &self.local
        }
    }
}

impl ConfigManager {
    /// Load from the process environment and `PAZZLE_CONFIG` (or ./config.yaml when present).
    pub fn load() -> Result<Self> {
        let path = std::env::var("PAZZLE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let file = Self::read_file(&path)?;
        Self::from_sources(|key| std::env::var(key).ok(), file)
    }

    fn read_file(path: &Path) -> Result<Option<FileConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        FileConfig::parse(&yaml).map(Some)
    }

    /// Environment values win over the file section for the active environment.
    pub fn from_sources<F>(env: F, file: Option<FileConfig>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = env("ENVIRONMENT").unwrap_or_else(|| "local".to_string());
        let file = file.unwrap_or_default();
        let section = file.section(&environment);

        let text = |key: &str, fallback: &Option<String>| {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| fallback.clone())
        };

        let url = match text("SUPABASE_URL", &section.supabase_url) {
            Some(url) => url,
            None => bail!("SUPABASE_URL is not set"),
        };
        let anon_key = match text("SUPABASE_ANON_KEY", &section.supabase_anon_key) {
            Some(key) => key,
            None => bail!("SUPABASE_ANON_KEY is not set"),
        };

        let port = match env("ROCKET_PORT") {
            Some(port) => port.parse().context("ROCKET_PORT must be a port number")?,
            None => section.port.unwrap_or(DEFAULT_PORT),
        };
        let timeout_seconds = match env("PAZZLE_REQUEST_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse()
                .context("PAZZLE_REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            None => section.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        let confirm_ms = match env("PAZZLE_CONTACT_CONFIRM_MS") {
            Some(ms) => ms
                .parse()
                .context("PAZZLE_CONTACT_CONFIRM_MS must be a number of milliseconds")?,
            None => section.contact_confirm_ms.unwrap_or(DEFAULT_CONTACT_CONFIRM_MS),
        };

        let log_path = env("PAZZLE_LOG_PATH")
            .map(PathBuf::from)
            .or_else(|| section.log_path.clone())
            .unwrap_or_else(|| Self::default_log_path(&environment));
        let log_filter = text("PAZZLE_LOG_FILTER", &section.log_filter)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            supabase: SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
                jwt_secret: text("SUPABASE_JWT_SECRET", &section.supabase_jwt_secret),
                timeout_seconds,
            },
            server: ServerSettings {
                port,
                contact_confirm_delay: Duration::from_millis(confirm_ms),
            },
            logging: LoggingConfig {
                path: log_path,
                filter: log_filter,
            },
            environment,
        })
    }

    fn default_log_path(environment: &str) -> PathBuf {
        if environment == "production" {
            PathBuf::from("/var/log/pazzle/pazzle.log")
        } else {
            PathBuf::from("logs/pazzle.log")
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn missing_store_url_is_an_error() {
        let err = ConfigManager::from_sources(env_from(&[("SUPABASE_ANON_KEY", "anon")]), None)
            .unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn env_only_uses_defaults() {
        let config = ConfigManager::from_sources(
            env_from(&[
                ("SUPABASE_URL", "https://abc.supabase.co/"),
                ("SUPABASE_ANON_KEY", "anon"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(config.environment, "local");
        assert_eq!(config.supabase.url, "https://abc.supabase.co");
        assert_eq!(config.supabase.jwt_secret, None);
        assert_eq!(config.supabase.timeout_seconds, 30);
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.server.contact_confirm_delay, Duration::from_millis(2000));
        assert_eq!(config.logging.path, PathBuf::from("logs/pazzle.log"));
    }

    #[test]
    fn env_overrides_file_section_for_active_environment() {
        let file = FileConfig::parse(
            r#"
local:
  supabase_url: https://local.example
  supabase_anon_key: local-key
  port: 5000
production:
  supabase_url: https://prod.example
  supabase_anon_key: prod-key
  port: 8080
  contact_confirm_ms: 500
"#,
        )
        .unwrap();

        let config = ConfigManager::from_sources(
            env_from(&[("ENVIRONMENT", "production"), ("ROCKET_PORT", "9000")]),
            Some(file),
        )
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.supabase.url, "https://prod.example");
        assert_eq!(config.supabase.anon_key, "prod-key");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.contact_confirm_delay, Duration::from_millis(500));
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = ConfigManager::from_sources(
            env_from(&[
                ("SUPABASE_URL", "https://abc.supabase.co"),
                ("SUPABASE_ANON_KEY", "anon"),
                ("ROCKET_PORT", "http"),
            ]),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ROCKET_PORT"));
    }
}
