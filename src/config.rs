use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::services::impression::DedupPolicy;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,

    // Backends
    pub api_url: String,
    pub account_api_url: String,

    // Video CDN
    pub upload_url: String,
    pub cdn_url: String,
    pub public_base_url: String,
    pub max_upload_bytes: u64,
    pub upload_chunk_size: usize,

    // Player
    pub ip_lookup_url: String,
    pub impression_dedup: DedupPolicy,

    // Payments
    pub min_withdrawal: f64,

    pub http_timeout: Duration,
    pub session_file: PathBuf,
}

const DEFAULT_API_URL: &str = "https://videyhost.my.id";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment = Self::parse_environment(&var("ENVIRONMENT", "development"))?;
        let api_url = trim_url(var("API_URL", DEFAULT_API_URL));

        let config = Self {
            environment,
            account_api_url: trim_url(var("ACCOUNT_API_URL", &api_url)),
            api_url,

            upload_url: trim_url(var("UPLOAD_URL", "https://videy.co")),
            cdn_url: trim_url(var("CDN_URL", "https://cdn.videy.co")),
            public_base_url: trim_url(var("PUBLIC_BASE_URL", DEFAULT_API_URL)),
            max_upload_bytes: var("MAX_UPLOAD_MB", "100")
                .parse::<u64>()
                .context("Invalid MAX_UPLOAD_MB")?
                .checked_mul(1024 * 1024)
                .context("MAX_UPLOAD_MB too large")?,
            upload_chunk_size: var("UPLOAD_CHUNK_SIZE", "65536")
                .parse()
                .context("Invalid UPLOAD_CHUNK_SIZE")?,

            ip_lookup_url: var("IP_LOOKUP_URL", "https://api.ipify.org?format=json"),
            impression_dedup: var("IMPRESSION_DEDUP", "shared")
                .parse()
                .context("Invalid IMPRESSION_DEDUP")?,

            min_withdrawal: var("MIN_WITHDRAWAL", "100000")
                .parse()
                .context("Invalid MIN_WITHDRAWAL")?,

            http_timeout: Duration::from_secs(
                var("HTTP_TIMEOUT_SECS", "30")
                    .parse()
                    .context("Invalid HTTP_TIMEOUT_SECS")?,
            ),
            session_file: PathBuf::from(var("SESSION_FILE", ".videyhost-session.json")),
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment(env: &str) -> Result<Environment> {
        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("API_URL", &self.api_url),
            ("ACCOUNT_API_URL", &self.account_api_url),
            ("UPLOAD_URL", &self.upload_url),
            ("CDN_URL", &self.cdn_url),
            ("PUBLIC_BASE_URL", &self.public_base_url),
            ("IP_LOOKUP_URL", &self.ip_lookup_url),
        ] {
            if !url.starts_with("http") {
                bail!("{} must be HTTP(S) URL", name);
            }
        }

        if self.max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_MB must be greater than zero");
        }
        if self.upload_chunk_size == 0 {
            bail!("UPLOAD_CHUNK_SIZE must be greater than zero");
        }
        if !self.min_withdrawal.is_finite() || self.min_withdrawal <= 0.0 {
            bail!("MIN_WITHDRAWAL must be a positive number");
        }

        tracing::debug!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_production_hosts() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.api_url, "https://videyhost.my.id");
        assert_eq!(config.account_api_url, config.api_url);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.min_withdrawal, 100_000.0);
        assert_eq!(config.impression_dedup, DedupPolicy::Shared);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn account_api_follows_api_url_and_trims_slash() {
        let config = config_from(&[("API_URL", "http://localhost:9000/")]).unwrap();
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.account_api_url, "http://localhost:9000");

        let config = config_from(&[
            ("API_URL", "http://localhost:9000"),
            ("ACCOUNT_API_URL", "http://accounts.local"),
        ])
        .unwrap();
        assert_eq!(config.account_api_url, "http://accounts.local");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("ENVIRONMENT", "moon")]).is_err());
        assert!(config_from(&[("UPLOAD_URL", "ftp://videy.co")]).is_err());
        assert!(config_from(&[("MAX_UPLOAD_MB", "0")]).is_err());
        assert!(config_from(&[("MIN_WITHDRAWAL", "-5")]).is_err());
        assert!(config_from(&[("MIN_WITHDRAWAL", "NaN")]).is_err());
        assert!(config_from(&[("MIN_WITHDRAWAL", "inf")]).is_err());
        assert!(config_from(&[("MAX_UPLOAD_MB", "18446744073709551615")]).is_err());
        assert!(config_from(&[("IMPRESSION_DEDUP", "sometimes")]).is_err());
    }

    #[test]
    fn parses_per_kind_dedup() {
        let config = config_from(&[("IMPRESSION_DEDUP", "per-kind"), ("ENVIRONMENT", "prod")]).unwrap();
        assert_eq!(config.impression_dedup, DedupPolicy::PerKind);
        assert_eq!(config.environment, Environment::Production);
    }
}
