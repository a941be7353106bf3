use crate::config::client::{ClientConfig, API_KEY_HEADER, AUTH_MODE, AUTH_MODE_HEADER};
use crate::error::{ClientError, ClientResult};
use crate::query::{QueryOptions, QueryValue};
use crate::response::ApiResponse;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport, TransportError};
use serde_json::Value;
use std::thread;
use tracing::{debug, warn};

/// Client for the Slot Machine Simulator endpoint.
///
/// Holds nothing but its configuration and transport, so one instance can serve
/// any number of independent `execute` calls, from any number of threads.
#[derive(Debug, Clone)]
pub struct SlotMachineClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl SlotMachineClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(config.timeout()).map_err(|e| {
            ClientError::configuration(format!("failed to initialize HTTP client: {e}"))
        })?;
        Ok(Self { config, transport })
    }

    pub fn with_api_key(api_key: impl Into<String>) -> ClientResult<Self> {
        Self::new(ClientConfig::new(api_key)?)
    }

    /// See [`ClientConfig::from_env`].
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: Transport> SlotMachineClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the request `execute` would send, without sending it.
    pub fn build_request(&self, options: &QueryOptions) -> HttpRequest {
        let mut url = self.config.endpoint().clone();
        let pairs = options.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let mut headers = Vec::with_capacity(self.config.headers().len() + 3);
        // A caller-supplied Accept replaces the default instead of adding a second value.
        if !self
            .config
            .headers()
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("accept"))
        {
            headers.push(("accept".to_string(), "application/json".to_string()));
        }
        headers.extend(self.config.headers().iter().cloned());
        headers.push((API_KEY_HEADER.to_string(), self.config.api_key().to_string()));
        headers.push((AUTH_MODE_HEADER.to_string(), AUTH_MODE.to_string()));

        HttpRequest { url, headers }
    }

    /// Runs one simulation request and returns the response object.
    ///
    /// Network failures are retried only when the config opted in; everything
    /// else surfaces on the first attempt.
    pub fn execute(&self, options: &QueryOptions) -> ClientResult<ApiResponse> {
        let request = self.build_request(options);
        debug!(target: "slotmachine", "GET {}", request.url);

        let mut attempt = 0;
        loop {
            match self.send_once(&request) {
                Err(err) if err.is_network() && attempt < self.config.max_retries() => {
                    attempt += 1;
                    warn!(
                        target: "slotmachine",
                        "{err}; retry attempt {attempt} of {}",
                        self.config.max_retries()
                    );
                    thread::sleep(self.config.retry_delay());
                }
                result => return result,
            }
        }
    }

    /// Same as [`execute`](Self::execute) for an untyped parameter map.
    pub fn execute_params<I, K, V>(&self, params: I) -> ClientResult<ApiResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        self.execute(&QueryOptions::from_params(params))
    }

    fn send_once(&self, request: &HttpRequest) -> ClientResult<ApiResponse> {
        let response = self.transport.send(request).map_err(network_error)?;
        debug!(
            target: "slotmachine",
            "HTTP {} ({} bytes)",
            response.status,
            response.body.len()
        );
        parse_response(response)
    }
}

fn network_error(err: TransportError) -> ClientError {
    ClientError::Network {
        timed_out: err.is_timeout(),
        message: err.to_string(),
    }
}

fn parse_response(response: HttpResponse) -> ClientResult<ApiResponse> {
    let status = response.status;

    if !response.is_success() {
        let body = Some(response.body).filter(|b| !b.is_empty());
        return Err(ClientError::invalid_response(
            Some(status),
            format!("unexpected HTTP status {status}"),
            body,
        ));
    }

    if response.body.trim().is_empty() {
        return Err(ClientError::invalid_response(
            Some(status),
            "empty response body",
            None,
        ));
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(map)) => Ok(ApiResponse::new(map)),
        Ok(_) => Err(ClientError::invalid_response(
            Some(status),
            "expected a JSON object",
            Some(response.body),
        )),
        Err(e) => Err(ClientError::invalid_response(
            Some(status),
            format!("body is not valid JSON: {e}"),
            Some(response.body),
        )),
    }
}
