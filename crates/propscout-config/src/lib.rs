//! Runtime configuration.
//!
//! One explicit `ScoutConfig` value is built at startup (TOML file plus
//! environment overrides) and handed to constructors. Nothing in the
//! workspace reads configuration from globals.

use secrecy::SecretString;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:8000".to_string() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. When absent the in-memory store is used.
    pub url: Option<String>,
}

/// A source that scrapes listing data out of a search-results page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeSourceConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for ScrapeSourceConfig {
    fn default() -> Self {
        Self { enabled: true, base_url: String::new() }
    }
}

/// A source backed by a keyed JSON API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSourceConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Value for the upstream host header, when the gateway requires one.
    pub api_host: String,
}

impl Default for ApiSourceConfig {
    fn default() -> Self {
        Self { enabled: true, base_url: String::new(), api_host: String::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub zillow: ScrapeSourceConfig,
    pub redfin: ScrapeSourceConfig,
    pub realtor: ApiSourceConfig,
    pub foreclosure: ApiSourceConfig,
    /// Shared gateway credential for the API-backed sources. Env only.
    #[serde(skip)]
    pub rapidapi_key: Option<SecretString>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            zillow: ScrapeSourceConfig {
                enabled: true,
                base_url: "https://www.zillow.com".to_string(),
            },
            redfin: ScrapeSourceConfig {
                enabled: true,
                base_url: "https://www.redfin.com".to_string(),
            },
            realtor: ApiSourceConfig {
                enabled: true,
                base_url: "https://realtor.p.rapidapi.com".to_string(),
                api_host: "realtor.p.rapidapi.com".to_string(),
            },
            foreclosure: ApiSourceConfig {
                enabled: true,
                base_url: "https://us-foreclosure-and-tax-deed-data.p.rapidapi.com".to_string(),
                api_host: "us-foreclosure-and-tax-deed-data.p.rapidapi.com".to_string(),
            },
            rapidapi_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Randomized wait between successive postal codes, in seconds.
    /// Set both bounds to zero in tests.
    pub courtesy_delay_min_secs: f64,
    pub courtesy_delay_max_secs: f64,
    /// Cap on comparable listings fetched per subject property.
    pub max_comps: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            courtesy_delay_min_secs: 1.0,
            courtesy_delay_max_secs: 3.0,
            max_comps: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Env only; when absent the deterministic template is used.
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        }
    }
}

// ── Top level ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sources: SourcesConfig,
    pub pipeline: PipelineConfig,
    pub scoring: propscout_scoring::ScoreWeights,
    pub llm: LlmConfig,
}

impl ScoutConfig {
    /// Load configuration: defaults ← optional TOML file ← environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut cfg = match path {
            Some(p) if p.exists() => {
                let raw = std::fs::read_to_string(p)?;
                toml::from_str(&raw)?
            }
            _ => Self::default(),
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("PROPSCOUT_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Ok(key) = std::env::var("RAPIDAPI_KEY") {
            self.sources.rapidapi_key = Some(SecretString::from(key));
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.llm.api_key = Some(SecretString::from(key));
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.courtesy_delay_min_secs > self.pipeline.courtesy_delay_max_secs {
            return Err(ConfigError::Invalid(
                "courtesy_delay_min_secs exceeds courtesy_delay_max_secs".into(),
            ));
        }
        if self.pipeline.max_comps == 0 {
            return Err(ConfigError::Invalid("max_comps must be at least 1".into()));
        }
        if !self.scoring.validate() {
            return Err(ConfigError::Invalid("scoring weights fail validation".into()));
        }
        let endpoints = [
            ("zillow", self.sources.zillow.enabled, &self.sources.zillow.base_url),
            ("redfin", self.sources.redfin.enabled, &self.sources.redfin.base_url),
            ("realtor", self.sources.realtor.enabled, &self.sources.realtor.base_url),
            ("foreclosure", self.sources.foreclosure.enabled, &self.sources.foreclosure.base_url),
        ];
        for (name, enabled, base_url) in endpoints {
            if enabled && base_url.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "source {name} is enabled but has no base_url"
                )));
            }
        }
        Ok(())
    }

    /// Hostnames of every enabled source endpoint, for the client allowlist.
    pub fn allowed_hosts(&self) -> Vec<String> {
        let urls = [
            (self.sources.zillow.enabled, self.sources.zillow.base_url.as_str()),
            (self.sources.redfin.enabled, self.sources.redfin.base_url.as_str()),
            (self.sources.realtor.enabled, self.sources.realtor.base_url.as_str()),
            (self.sources.foreclosure.enabled, self.sources.foreclosure.base_url.as_str()),
            (true, self.llm.base_url.as_str()),
        ];
        let mut hosts = BTreeSet::new();
        for (enabled, raw) in urls {
            if !enabled {
                continue;
            }
            match url::Url::parse(raw) {
                Ok(u) => {
                    if let Some(host) = u.host_str() {
                        hosts.insert(host.to_string());
                    }
                }
                Err(e) => debug!(url = raw, error = %e, "skipping unparsable endpoint"),
            }
        }
        hosts.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = ScoutConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.pipeline.max_comps, 5);
        assert!(cfg.database.url.is_none());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let raw = r#"
            [server]
            bind_addr = "127.0.0.1:9100"

            [pipeline]
            courtesy_delay_min_secs = 0.0
            courtesy_delay_max_secs = 0.0
            max_comps = 3

            [sources.redfin]
            enabled = false
        "#;
        let cfg: ScoutConfig = toml::from_str(raw).unwrap();
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:9100");
        assert_eq!(cfg.pipeline.max_comps, 3);
        assert!(!cfg.sources.redfin.enabled);
        // untouched sections keep their defaults
        assert!(cfg.sources.zillow.enabled);
    }

    #[test]
    fn test_scoring_overrides_via_toml() {
        let raw = r#"
            [scoring]
            offer_discount = 0.8
        "#;
        let cfg: ScoutConfig = toml::from_str(raw).unwrap();
        assert_eq!(cfg.scoring.offer_discount, 0.8);
        // untouched knobs keep their priors
        assert_eq!(cfg.scoring.dom_long_threshold, 90);
    }

    #[test]
    fn test_delay_bounds_validated() {
        let mut cfg = ScoutConfig::default();
        cfg.pipeline.courtesy_delay_min_secs = 5.0;
        cfg.pipeline.courtesy_delay_max_secs = 2.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_enabled_source_without_endpoint_rejected() {
        let mut cfg = ScoutConfig::default();
        cfg.sources.zillow.base_url = String::new();
        assert!(cfg.validate().is_err());
        cfg.sources.zillow.enabled = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_allowed_hosts_skip_disabled_sources() {
        let mut cfg = ScoutConfig::default();
        cfg.sources.redfin.enabled = false;
        let hosts = cfg.allowed_hosts();
        assert!(hosts.iter().any(|h| h == "www.zillow.com"));
        assert!(!hosts.iter().any(|h| h == "www.redfin.com"));
    }
}
