//! A ready-made executor over `ureq` with a static bearer token.
//!
//! # Design
//! Routes only need something implementing [`Executor`]; this module is one
//! such thing. `BearerTokenClient` fixes the base URL at construction and
//! sets `Authorization: Bearer <token>` on every request it sends. A plain
//! `ureq::Agent` is also an executor, without a base URL or credentials.
//!
//! Status codes are left to the caller unless `status_as_error` is set.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use ureq::Agent;

use crate::executor::Executor;
use crate::http::{Body, Headers, HttpMethod, HttpRequest, HttpResponse};

/// Errors returned by the ureq-backed executors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The request body could not be read.
    #[error("reading request body: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} requests cannot carry a body")]
    BodyNotAllowed(HttpMethod),

    /// Non-2xx response, only produced when `status_as_error` is enabled.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Settings for [`BearerTokenClient`].
///
/// Deserializable so it can be embedded in a larger config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub status_as_error: bool,
}

impl ClientConfig {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            token: token.to_string(),
            timeout_secs: None,
            status_as_error: false,
        }
    }

    /// Read `REST_BASE_URL`, `REST_TOKEN`, and optionally
    /// `REST_TIMEOUT_SECS` and `REST_STATUS_AS_ERROR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("REST_BASE_URL").ok_or(ConfigError::Missing("REST_BASE_URL"))?;
        let token = lookup("REST_TOKEN").ok_or(ConfigError::Missing("REST_TOKEN"))?;

        let timeout_secs = match lookup("REST_TIMEOUT_SECS") {
            Some(value) => Some(value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "REST_TIMEOUT_SECS",
                value,
            })?),
            None => None,
        };
        let status_as_error = match lookup("REST_STATUS_AS_ERROR") {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "" | "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "REST_STATUS_AS_ERROR",
                        value,
                    })
                }
            },
            None => false,
        };

        Ok(Self {
            base_url,
            token,
            timeout_secs,
            status_as_error,
        })
    }
}

/// Executor that authenticates every request with a static bearer token.
#[derive(Clone)]
pub struct BearerTokenClient {
    agent: Agent,
    base_url: String,
    authorization: String,
    status_as_error: bool,
}

impl BearerTokenClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url, token))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        // Status handling is ours, not ureq's.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout_secs.map(Duration::from_secs))
            .build()
            .new_agent();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {}", config.token),
            status_as_error: config.status_as_error,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for BearerTokenClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenClient")
            .field("base_url", &self.base_url)
            .field("authorization", &"Bearer <redacted>")
            .field("status_as_error", &self.status_as_error)
            .finish()
    }
}

impl Executor for BearerTokenClient {
    type Error = ClientError;

    fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse, ClientError> {
        request.headers.insert("authorization", self.authorization.as_str());
        let response = send(&self.agent, request)?;

        if self.status_as_error && !response.is_success() {
            return Err(status_error(response));
        }
        Ok(response)
    }

    fn base_url(&self) -> Option<&str> {
        Some(&self.base_url)
    }
}

impl Executor for Agent {
    type Error = ClientError;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        send(self, request)
    }
}

fn send(agent: &Agent, request: HttpRequest) -> Result<HttpResponse, ClientError> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;
    tracing::debug!(%method, %url, "sending request");

    if body.is_some() && !method.allows_body() {
        return Err(ClientError::BodyNotAllowed(method));
    }

    let response = if method.allows_body() {
        let builder = match method {
            HttpMethod::Post => agent.post(&url),
            HttpMethod::Put => agent.put(&url),
            _ => agent.patch(&url),
        };
        let builder = with_headers(builder, &headers);
        match body {
            Some(body) => builder.send(&body.read_to_vec()?[..])?,
            None => builder.send_empty()?,
        }
    } else {
        let builder = match method {
            HttpMethod::Delete => agent.delete(&url),
            _ => agent.get(&url),
        };
        with_headers(builder, &headers).call()?
    };

    let status = response.status().as_u16();
    let headers: Headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    tracing::debug!(status, "received response");

    Ok(HttpResponse {
        status,
        headers,
        body: Body::from_reader(response.into_body().into_reader()),
    })
}

/// The body is best effort; a read failure leaves it empty.
fn status_error(response: HttpResponse) -> ClientError {
    let status = response.status;
    let body = match response.body.read_to_string() {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(status, error = %e, "could not read error response body");
            String::new()
        }
    };
    ClientError::Status { status, body }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &Headers) -> ureq::RequestBuilder<B> {
    for (name, value) in headers.iter() {
        builder = builder.header(name, value);
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = BearerTokenClient::new("http://localhost:3000/", "secret");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(Executor::base_url(&client), Some("http://localhost:3000"));
    }

    #[test]
    fn debug_redacts_token() {
        let client = BearerTokenClient::new("http://localhost:3000", "secret");
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("localhost:3000"));
    }

    #[test]
    fn plain_agent_has_no_base_url() {
        let agent: Agent = Agent::config_builder().build().new_agent();
        assert_eq!(agent.base_url(), None);
    }

    #[test]
    fn get_with_body_is_rejected_before_sending() {
        let client = BearerTokenClient::new("http://127.0.0.1:9", "secret");
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/users".to_string(),
            headers: Headers::new(),
            body: Some(Body::from("{}")),
        };
        let err = client.execute(request).unwrap_err();
        assert!(matches!(err, ClientError::BodyNotAllowed(HttpMethod::Get)));
    }

    #[test]
    fn delete_with_body_is_rejected_before_sending() {
        let agent: Agent = Agent::config_builder().build().new_agent();
        let request = HttpRequest {
            method: HttpMethod::Delete,
            url: "http://127.0.0.1:9/users/1".to_string(),
            headers: Headers::new(),
            body: Some(Body::from("{}")),
        };
        let err = agent.execute(request).unwrap_err();
        assert!(matches!(err, ClientError::BodyNotAllowed(HttpMethod::Delete)));
    }

    struct Broken;

    impl std::io::Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn status_error_keeps_readable_body() {
        let mut response = HttpResponse::ok("not found");
        response.status = 404;
        match status_error(response) {
            ClientError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn status_error_survives_unreadable_body() {
        let mut response = HttpResponse::ok(Body::from_reader(Broken));
        response.status = 502;
        match status_error(response) {
            ClientError::Status { status, body } => {
                assert_eq!(status, 502);
                assert!(body.is_empty());
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn config_from_env_reads_all_fields() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("REST_BASE_URL", "https://api.example.com"),
            ("REST_TOKEN", "t0k"),
            ("REST_TIMEOUT_SECS", "30"),
            ("REST_STATUS_AS_ERROR", "true"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.token, "t0k");
        assert_eq!(config.timeout_secs, Some(30));
        assert!(config.status_as_error);
    }

    #[test]
    fn config_from_env_defaults_optional_fields() {
        let config =
            ClientConfig::from_lookup(lookup(&[("REST_BASE_URL", "http://x"), ("REST_TOKEN", "t")])).unwrap();
        assert_eq!(config, ClientConfig::new("http://x", "t"));
    }

    #[test]
    fn config_from_env_reports_missing_and_invalid() {
        let err = ClientConfig::from_lookup(lookup(&[("REST_TOKEN", "t")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("REST_BASE_URL"));

        let err = ClientConfig::from_lookup(lookup(&[
            ("REST_BASE_URL", "http://x"),
            ("REST_TOKEN", "t"),
            ("REST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "REST_TIMEOUT_SECS",
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn config_deserializes_from_json() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://x","token":"t","timeout_secs":5}"#).unwrap();
        assert_eq!(config.timeout_secs, Some(5));
        assert!(!config.status_as_error);
    }
}
