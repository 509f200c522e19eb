//! Application settings and configuration
//!
//! This module provides configuration management for the relay,
//! loading settings from environment variables with sensible defaults.

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

/// Port used when `PORT` is unset or unparseable
pub const DEFAULT_PORT: u16 = 3033;

/// Base URL of the upstream provider API
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!("Invalid environment: {}. Expected: development, staging, or production", s),
        }
    }
}

/// External text extractor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextExtractorConfig {
    /// Program to run (looked up on PATH)
    pub program: String,
    /// Arguments placed before the target URL
    pub args: Vec<String>,
}

impl Default for TextExtractorConfig {
    fn default() -> Self {
        Self {
            program: "lynx".to_string(),
            args: vec!["--dump".to_string()],
        }
    }
}

/// Main application settings
///
/// Built once at process entry and shared read-only afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,

    // Upstream provider
    #[serde(skip_serializing)]
    pub openai_api_key: String,
    pub openai_base_url: String,
    /// `None` means upstream calls may wait indefinitely
    pub upstream_timeout_seconds: Option<u64>,

    // Text extraction
    pub text_extractor: TextExtractorConfig,
}

impl Settings {
    /// Load settings from environment variables with defaults
    ///
    /// A `.env` file in the working directory is honored when present.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let openai_api_key = lookup("OPENAI_API_KEY").unwrap_or_default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                eprintln!("Invalid PORT value {:?}, using {} as fallback", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let upstream_timeout_seconds = lookup("UPSTREAM_TIMEOUT_SECONDS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0);

        let text_extractor = TextExtractorConfig {
            program: var_or("TEXT_EXTRACTOR_PROGRAM", "lynx"),
            args: var_or("TEXT_EXTRACTOR_ARGS", "--dump")
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        };

        let settings = Self {
            app_name: var_or("APP_NAME", "genai-relay"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: var_or("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: var_or("LOG_LEVEL", "info"),
            host: var_or("HOST", "0.0.0.0"),
            port,
            openai_api_key,
            openai_base_url: var_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            upstream_timeout_seconds,
            text_extractor,
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    fn validate(&self) -> Result<()> {
        if self.openai_api_key.trim().is_empty() {
            anyhow::bail!("Unable to get OPENAI_API_KEY, check your env");
        }

        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.text_extractor.program.trim().is_empty() {
            anyhow::bail!("TEXT_EXTRACTOR_PROGRAM cannot be empty");
        }

        Ok(())
    }

    /// Upstream request timeout, if one is configured
    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_seconds.map(Duration::from_secs)
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "genai-relay".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            upstream_timeout_seconds: None,
            text_extractor: TextExtractorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, "genai-relay");
        assert_eq!(settings.port, 3033);
        assert_eq!(settings.openai_base_url, "https://api.openai.com/v1");
        assert!(settings.upstream_timeout().is_none());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = Settings::from_lookup(lookup_from(&[("PORT", "8080")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let err = Settings::from_lookup(lookup_from(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_load_from_lookup() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "8080"),
            ("UPSTREAM_TIMEOUT_SECONDS", "30"),
            ("TEXT_EXTRACTOR_PROGRAM", "w3m"),
            ("TEXT_EXTRACTOR_ARGS", "-dump -cols 120"),
        ]))
        .unwrap();

        assert_eq!(settings.openai_api_key, "sk-test");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.upstream_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.text_extractor.program, "w3m");
        assert_eq!(settings.text_extractor.args, vec!["-dump", "-cols", "120"]);
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "not-a-port"),
        ]))
        .unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn test_api_key_not_serialized() {
        let settings = Settings {
            openai_api_key: "sk-secret".to_string(),
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:3033");
    }
}
