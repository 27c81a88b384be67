use crate::core::resolver::{DEFAULT_TTL_HOURS, ResolverSettings};
use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateProviderKind {
    #[default]
    Yahoo,
    ExchangeRateApi,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RateConfig {
    pub provider: RateProviderKind,
    pub base_url: Option<String>,
    pub from: String,
    pub to: String,
    pub ttl_hours: i64,
    pub fallback: f64,
    pub timeout_secs: u64,
}

impl Default for RateConfig {
    fn default() -> Self {
        RateConfig {
            provider: RateProviderKind::default(),
            base_url: None,
            from: "USD".to_string(),
            to: "INR".to_string(),
            ttl_hours: DEFAULT_TTL_HOURS,
            fallback: 83.0,
            timeout_secs: 10,
        }
    }
}

impl RateConfig {
    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url.as_str(),
            (None, RateProviderKind::Yahoo) => "https://query1.finance.yahoo.com",
            (None, RateProviderKind::ExchangeRateApi) => "https://api.exchangerate-api.com",
        }
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            ttl: TimeDelta::try_hours(self.ttl_hours).unwrap_or(TimeDelta::MAX),
            fetch_timeout: Duration::from_secs(self.timeout_secs),
            ..ResolverSettings::new(&self.from, &self.to, self.fallback)
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Identity snapshots are stored and listed under.
    pub user: String,
    #[serde(default)]
    pub rate: RateConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "ratefold", "ratefold")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "ratefold", "ratefold")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            bail!("Config field `user` must not be empty");
        }
        if self.user.contains('/') {
            bail!("Config field `user` must not contain '/'");
        }
        let rate = &self.rate;
        if !rate.fallback.is_finite() || rate.fallback <= 0.0 {
            bail!("rate.fallback must be a positive number, got {}", rate.fallback);
        }
        if rate.ttl_hours < 0 {
            bail!("rate.ttl_hours must not be negative, got {}", rate.ttl_hours);
        }
        if rate.timeout_secs == 0 {
            bail!("rate.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization_with_defaults() {
        let yaml_str = r#"
user: "alice"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.user, "alice");
        assert_eq!(config.rate.provider, RateProviderKind::Yahoo);
        assert_eq!(config.rate.base_url(), "https://query1.finance.yahoo.com");
        assert_eq!(config.rate.from, "USD");
        assert_eq!(config.rate.to, "INR");
        assert_eq!(config.rate.ttl_hours, 24);
        assert_eq!(config.rate.fallback, 83.0);
        assert!(config.data_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization_with_rate_section() {
        let yaml_str = r#"
user: "bob"
rate:
  provider: exchange_rate_api
  from: "USD"
  to: "EUR"
  ttl_hours: 6
  fallback: 0.92
  timeout_secs: 3
data_path: "/tmp/ratefold"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.rate.provider, RateProviderKind::ExchangeRateApi);
        assert_eq!(config.rate.base_url(), "https://api.exchangerate-api.com");

        let settings = config.rate.resolver_settings();
        assert_eq!(settings.key, "rate_usd_eur");
        assert_eq!(settings.ttl, TimeDelta::hours(6));
        assert_eq!(settings.fallback, 0.92);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(3));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/ratefold")
        );
    }

    #[test]
    fn test_config_base_url_override() {
        let yaml_str = r#"
user: "carol"
rate:
  base_url: "http://localhost:9999"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.rate.base_url(), "http://localhost:9999");
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let mut config: AppConfig = serde_yaml::from_str("user: alice").unwrap();
        config.rate.fallback = 0.0;
        assert!(config.validate().is_err());

        config.rate.fallback = 83.0;
        config.rate.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.rate.timeout_secs = 10;
        config.user = "a/b".to_string();
        assert!(config.validate().is_err());

        config.user = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_user_fails_to_parse() {
        assert!(serde_yaml::from_str::<AppConfig>("data_path: /tmp").is_err());
    }
}
