use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::adapters::GithubCredentials;
use crate::app::{FailurePolicy, ImportSettings};
use crate::domain::entities::RuleSet;
use crate::error::{ConfigError, RuleError};

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// YAML rules file; no rules are applied when unset
    pub rules_file: Option<PathBuf>,
    /// Endpoint receiving emitted promotions
    pub collector_api: String,
    /// Source identifier stamped on every promotion
    pub source: String,
    /// Amount awarded per detected language
    pub default_amount: f64,
    pub github_api_url: String,
    pub github_credentials: GithubCredentials,
    pub import: ImportSettings,
    /// Deadline for every outbound HTTP request
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut port = parse_or(&lookup, "PORT", 3000u16)?;
        // Cloud Foundry style override, ignored when unusable
        if let Some(vcap) = var("VCAP_APP_PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            if vcap > 0 {
                port = vcap;
            }
        }

        let default_amount = parse_or(&lookup, "DEFAULT_AMOUNT", 2.0f64)?;
        if !default_amount.is_finite() || default_amount < 0.0 {
            return Err(invalid("DEFAULT_AMOUNT", default_amount, "must be non-negative"));
        }

        let import = ImportSettings {
            page_size: at_least_one(&lookup, "IMPORT_PAGE_SIZE", 50u32)?,
            concurrency: at_least_one(&lookup, "IMPORT_CONCURRENCY", 20usize)?,
            max_pages: var("IMPORT_MAX_PAGES")
                .map(|_| at_least_one(&lookup, "IMPORT_MAX_PAGES", 1u32))
                .transpose()?,
            max_retries: parse_or(&lookup, "IMPORT_MAX_RETRIES", 2u32)?,
            retry_backoff: Duration::from_millis(parse_or(
                &lookup,
                "IMPORT_RETRY_BACKOFF_MS",
                250u64,
            )?),
            failure_policy: parse_or(&lookup, "IMPORT_FAILURE_POLICY", FailurePolicy::FailFast)?,
        };

        let http_timeout = Duration::from_secs(at_least_one(&lookup, "HTTP_TIMEOUT_SECS", 30u64)?);

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            rules_file: var("RULES_FILE").map(PathBuf::from),
            collector_api: var("COLLECTOR_API")
                .unwrap_or_else(|| "http://localhost:10100".to_string()),
            source: var("PROMOTION_SOURCE").unwrap_or_else(|| "github".to_string()),
            default_amount,
            github_api_url: var("GITHUB_API_URL")
                .unwrap_or_else(|| "https://api.github.com".to_string()),
            github_credentials: github_credentials(&var)?,
            import,
            http_timeout,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load and compile the configured rule set
    pub fn load_rules(&self) -> Result<RuleSet, RuleError> {
        match &self.rules_file {
            Some(path) => load_rules(path),
            None => {
                tracing::warn!("RULES_FILE not set, no rule promotions will be awarded");
                Ok(RuleSet::default())
            }
        }
    }
}

/// Read a YAML rules file and compile every pattern in it
pub fn load_rules(path: &Path) -> Result<RuleSet, RuleError> {
    let yaml = std::fs::read_to_string(path).map_err(|source| RuleError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let rules = RuleSet::from_yaml_str(&yaml)?;
    tracing::info!(path = %path.display(), rules = rules.len(), "Rules loaded");
    Ok(rules)
}

fn github_credentials<V>(var: &V) -> Result<GithubCredentials, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    if let Some(token) = var("GITHUB_TOKEN") {
        return Ok(GithubCredentials::Token(token));
    }
    match (var("GITHUB_CLIENT_ID"), var("GITHUB_CLIENT_SECRET")) {
        (Some(client_id), Some(client_secret)) => Ok(GithubCredentials::OAuthApp {
            client_id,
            client_secret,
        }),
        (None, None) => Ok(GithubCredentials::Anonymous),
        _ => Err(ConfigError::Credentials(
            "GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET must be set together".to_string(),
        )),
    }
}

fn invalid(key: &'static str, value: impl Display, reason: impl Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e| invalid(key, &raw, e))
        }
        _ => Ok(default),
    }
}

fn at_least_one<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + From<u8> + Display + Copy,
    T::Err: Display,
{
    let value = parse_or(lookup, key, default)?;
    if value < T::from(1) {
        return Err(invalid(key, value, "must be at least 1"));
    }
    Ok(value)
}
