use crate::error::{ClientError, ClientResult};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// Production endpoint root. The resource path is appended to it.
pub const DEFAULT_BASE_URL: &str = "https://api.apiverve.com/v1";
pub const DEFAULT_RESOURCE_PATH: &str = "slotmachine";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
/// Upper bound for opt-in retries; larger requests are clamped.
pub const MAX_RETRIES: u32 = 3;

pub const API_KEY_ENV: &str = "APIVERVE_API_KEY";
pub const BASE_URL_ENV: &str = "APIVERVE_BASE_URL";

pub(crate) const API_KEY_HEADER: &str = "x-api-key";
pub(crate) const AUTH_MODE_HEADER: &str = "auth-mode";
pub(crate) const AUTH_MODE: &str = "rust";

/// Immutable settings for one [`SlotMachineClient`](crate::api_client::SlotMachineClient).
///
/// Only obtainable through [`ClientConfigBuilder::build`], so holding one means the
/// API key and endpoint were already validated.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    endpoint: Url,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::default().api_key(api_key)
    }

    /// Shorthand for a config with every default and the given key.
    pub fn new(api_key: impl Into<String>) -> ClientResult<Self> {
        Self::builder(api_key).build()
    }

    /// Reads `APIVERVE_API_KEY` and, if set, `APIVERVE_BASE_URL`.
    pub fn from_env() -> ClientResult<Self> {
        ClientConfigBuilder::default()
            .apply_env(|name| std::env::var(name).ok())
            .build()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Full request URL without a query string.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("headers", &self.headers)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    resource_path: Option<String>,
    timeout: Option<Duration>,
    max_retries: u32,
    retry_delay: Option<Duration>,
    headers: Vec<(String, String)>,
}

impl ClientConfigBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Retries apply to network failures only and are off unless set here.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.min(MAX_RETRIES);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Extra header sent with every request. Later values for the same name replace earlier ones.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Overrides the key and base URL with `APIVERVE_API_KEY` and
    /// `APIVERVE_BASE_URL` when `lookup` has them.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV) {
            self = self.api_key(key);
        }
        if let Some(url) = lookup(BASE_URL_ENV) {
            self = self.base_url(url);
        }
        self
    }

    pub fn build(self) -> ClientResult<ClientConfig> {
        let api_key = match self.api_key {
            Some(key) if !key.trim().is_empty() => key,
            Some(_) => return Err(ClientError::configuration("API key must not be empty")),
            None => return Err(ClientError::configuration("API key is required")),
        };
        if HeaderValue::from_str(&api_key).is_err() {
            return Err(ClientError::configuration(
                "API key contains characters that cannot be sent in a header",
            ));
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let resource_path = self
            .resource_path
            .unwrap_or_else(|| DEFAULT_RESOURCE_PATH.to_string());
        let endpoint = join_endpoint(&base_url, &resource_path)?;

        for (name, value) in &self.headers {
            validate_header(name, value)?;
        }

        Ok(ClientConfig {
            api_key,
            endpoint,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_retries: self.max_retries,
            retry_delay: self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            headers: self.headers,
        })
    }
}

fn join_endpoint(base_url: &str, resource_path: &str) -> ClientResult<Url> {
    let base = base_url.trim();
    let path = resource_path.trim().trim_matches('/');
    let joined = if path.is_empty() {
        base.trim_end_matches('/').to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    };

    let url = Url::parse(&joined)
        .map_err(|e| ClientError::configuration(format!("invalid base URL '{base}': {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ClientError::configuration(format!(
                "unsupported URL scheme '{other}', expected http or https"
            )))
        }
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ClientError::configuration(
            "base URL must not carry a query string or fragment",
        ));
    }
    Ok(url)
}

fn validate_header(name: &str, value: &str) -> ClientResult<()> {
    if name.trim().is_empty() {
        return Err(ClientError::configuration("header name cannot be empty"));
    }
    if name.eq_ignore_ascii_case(API_KEY_HEADER) || name.eq_ignore_ascii_case(AUTH_MODE_HEADER) {
        return Err(ClientError::configuration(format!(
            "header '{name}' is managed by the client"
        )));
    }
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ClientError::configuration(format!("invalid header name '{name}'")))?;
    HeaderValue::from_str(value)
        .map_err(|_| ClientError::configuration(format!("invalid value for header '{name}'")))?;
    Ok(())
}
