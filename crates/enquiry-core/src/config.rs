use enquiry_error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/enquiries";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "enquiry-wizard";
pub const ENDPOINT_ENV: &str = "ENQUIRY_ENDPOINT";

/// Where and how enquiries are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnquiryConfig {
    pub endpoint: Url,
    /// Enforced by the HTTP transport only. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for EnquiryConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

impl EnquiryConfig {
    /// Defaults, then the optional TOML file, then `ENQUIRY_ENDPOINT`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, env::var(ENDPOINT_ENV).ok())
    }

    fn load_with_env(path: Option<&Path>, env_endpoint: Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = path {
            let content = fs::read_to_string(path)?;
            let file: ConfigFile =
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
            config = config.merge(file)?;
        }
        if let Some(endpoint) = env_endpoint.filter(|e| !e.trim().is_empty()) {
            config = config.with_endpoint(&endpoint)?;
        }
        Ok(config)
    }

    pub fn with_endpoint(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.endpoint = parse_endpoint(raw)?;
        Ok(self)
    }

    fn merge(mut self, file: ConfigFile) -> Result<Self, ConfigError> {
        if let Some(endpoint) = file.endpoint {
            self.endpoint = parse_endpoint(&endpoint)?;
        }
        if let Some(secs) = file.timeout_secs {
            // 0 disables the transport timeout
            self.timeout_secs = (secs > 0).then_some(secs);
        }
        if let Some(agent) = file.user_agent {
            self.user_agent = agent;
        }
        Ok(self)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}
