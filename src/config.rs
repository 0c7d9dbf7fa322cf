use std::env;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::retry::RetryPolicy;
use crate::Args;

pub const CLIENT_IP_VAR: &str = "CLIENT_IP";
pub const ELASTIC_URL_VAR: &str = "ELASTIC_URL";
pub const USERNAME_VAR: &str = "ELASTIC_USERNAME";
pub const PASSWORD_VAR: &str = "ELASTIC_PASSWORD";
pub const INSECURE_VAR: &str = "ELASTIC_INSECURE";

const REQUIRED_VARS: [&str; 4] = [USERNAME_VAR, PASSWORD_VAR, ELASTIC_URL_VAR, CLIENT_IP_VAR];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variables are not set: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("ELASTIC_URL is not a valid http(s) URL: {0}")]
    InvalidUrl(String),
}

/// Immutable run configuration, built once before anything talks to the
/// network.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_ip: String,
    pub elastic_url: Url,
    pub username: String,
    pub password: String,
    pub index_pattern: String,
    pub insecure: bool,
    pub timeout: Duration,
    pub max_hits: Option<u32>,
    pub retry: RetryPolicy,
    pub error_pause: Duration,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` from
    /// the working directory first when one is present. Parent directories
    /// are never searched.
    pub fn from_env(args: &Args) -> Result<Self, ConfigError> {
        let _ = dotenvy::from_path(Path::new(".env"));
        Self::from_lookup(args, |key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. All four
    /// required variables are checked together so one run reports every gap.
    pub fn from_lookup<F>(args: &Args, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let raw_url = get(ELASTIC_URL_VAR).unwrap_or_default();
        let elastic_url = parse_base_url(&raw_url)?;

        let insecure = args.insecure
            || get(INSECURE_VAR)
                .map(|value| is_truthy(&value))
                .unwrap_or(false);

        Ok(Self {
            client_ip: get(CLIENT_IP_VAR).unwrap_or_default(),
            elastic_url,
            username: get(USERNAME_VAR).unwrap_or_default(),
            password: get(PASSWORD_VAR).unwrap_or_default(),
            index_pattern: args.index_pattern.clone(),
            insecure,
            timeout: Duration::from_secs(args.timeout),
            max_hits: args.max_hits,
            retry: RetryPolicy::new(args.max_attempts, Duration::from_secs(args.retry_delay)),
            error_pause: Duration::from_secs(args.error_pause),
        })
    }

    /// `<ELASTIC_URL>/<index pattern>/_search`
    pub fn search_url(&self) -> Result<Url, ConfigError> {
        let base = self.elastic_url.as_str().trim_end_matches('/');
        let joined = format!("{}/{}/_search", base, self.index_pattern);
        Url::parse(&joined).map_err(|e| ConfigError::InvalidUrl(format!("{joined}: {e}")))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(format!(
            "{raw}: unsupported scheme '{other}'"
        ))),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
