use std::path::PathBuf;
use std::time::Duration;

use crate::{
    Error, Result, ALLOWED_DOMAIN, BROWSER_USER_AGENT, CRAWL_CONCURRENCY, CRAWL_USER_AGENT,
    HTML_FILE_PATH, JSON_FILE_PATH, MOVIES_FILE_PATH, PROFILE_URL, REQUEST_TIMEOUT_SECS, SEED_URL,
};

pub const PROXY_HOST_VAR: &str = "IMDB_PROXY_HOST";
pub const PROXY_USERNAME_VAR: &str = "IMDB_PROXY_USERNAME";
pub const PROXY_PASSWORD_VAR: &str = "IMDB_PROXY_PASSWORD";

/// Settings for the listing crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed_url: String,
    pub allowed_domains: Vec<String>,
    pub user_agent: String,
    pub out_path: PathBuf,
    /// `None` means crawl until pagination runs out.
    pub max_pages: Option<usize>,
    pub concurrency: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: SEED_URL.to_string(),
            allowed_domains: vec![ALLOWED_DOMAIN.to_string()],
            user_agent: CRAWL_USER_AGENT.to_string(),
            out_path: PathBuf::from(MOVIES_FILE_PATH),
            max_pages: None,
            concurrency: CRAWL_CONCURRENCY,
        }
    }
}

/// Forward proxy endpoint plus its basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// `host:port`, a scheme is optional.
    pub host: String,
    pub username: String,
    pub password: String,
}

// Keeps the password out of logs.
impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl ProxyConfig {
    /// Reads the proxy from `IMDB_PROXY_HOST`, `IMDB_PROXY_USERNAME` and `IMDB_PROXY_PASSWORD`.
    /// Returns `Ok(None)` when no host is set.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let Some(host) = lookup(PROXY_HOST_VAR).filter(|h| !h.trim().is_empty()) else {
            return Ok(None);
        };
        let username = lookup(PROXY_USERNAME_VAR).ok_or_else(|| {
            Error::Config(format!("{PROXY_HOST_VAR} is set but {PROXY_USERNAME_VAR} is missing"))
        })?;
        let password = lookup(PROXY_PASSWORD_VAR).ok_or_else(|| {
            Error::Config(format!("{PROXY_HOST_VAR} is set but {PROXY_PASSWORD_VAR} is missing"))
        })?;

        Ok(Some(Self {
            host: host.trim().to_string(),
            username,
            password,
        }))
    }

    /// Proxy url without credentials, they are sent as basic auth instead.
    pub fn url(&self) -> String {
        if self.host.contains("://") {
            self.host.clone()
        } else {
            format!("http://{}", self.host)
        }
    }
}

/// Settings for the single profile fetch.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    pub url: String,
    pub proxy: Option<ProxyConfig>,
    pub user_agent: String,
    pub timeout: Duration,
    pub html_path: PathBuf,
    pub json_path: PathBuf,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            url: PROFILE_URL.to_string(),
            proxy: None,
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            html_path: PathBuf::from(HTML_FILE_PATH),
            json_path: PathBuf::from(JSON_FILE_PATH),
        }
    }
}
