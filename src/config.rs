use crate::errors::{Error, Result};
use reqwest::header::HeaderValue;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const BASE_URL_ENV: &str = "WEBUI_BASE_URL";
pub const USER_AGENT_ENV: &str = "VOICEMODE_USER_AGENT";
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Where the web UI server lives and how we present ourselves to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Read `WEBUI_BASE_URL` and `VOICEMODE_USER_AGENT`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV) {
            config.base_url = url;
        }
        if let Some(agent) = lookup(USER_AGENT_ENV).filter(|a| !a.trim().is_empty()) {
            config.user_agent = agent;
        }
        config.validate()?;
        Ok(config)
    }

    /// The base url must be an absolute http(s) url and the user agent a
    /// valid header value.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(Error::Config(format!("{} is empty", BASE_URL_ENV)));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "base url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if HeaderValue::from_str(&self.user_agent).is_err() {
            return Err(Error::Config(format!(
                "user agent is not a valid header value: {:?}",
                self.user_agent
            )));
        }
        Ok(())
    }
}
