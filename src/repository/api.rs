use crate::error::{BuildError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::debug;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Status code and decoded JSON body of one API call; empty bodies decode to `Null`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, Value::Null)
    }

    /// Error reporting this response as unexpected for `method path`
    pub fn unexpected(&self, method: &'static str, path: &str) -> BuildError {
        let message = self
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unexpected response")
            .to_string();
        BuildError::Remote {
            method,
            path: path.to_string(),
            status: self.status,
            message,
        }
    }
}

/// The subset of the GitHub REST API used to validate repository settings
///
/// Transport failures are errors; every HTTP status, including 4xx and 5xx, is returned
/// to the caller to interpret.
pub trait GitHubApi {
    fn get(&self, path: &str) -> Result<ApiResponse>;
    fn put(&self, path: &str, body: &Value) -> Result<ApiResponse>;
    fn patch(&self, path: &str, body: &Value) -> Result<ApiResponse>;
}

/// Blocking HTTP implementation authenticated with a personal or app token
pub struct HttpGitHubApi {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpGitHubApi {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: GITHUB_API_URL.to_string(),
            token: token.into(),
        })
    }

    /// Reads the token from `GITHUB_TOKEN`, which must be set and non-empty
    pub fn from_env() -> Result<Self> {
        match env::var(GITHUB_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Self::new(token),
            _ => Err(BuildError::Config(format!(
                "{} must be set to check repository settings",
                GITHUB_TOKEN_ENV
            ))),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, method: &'static str, path: &str, request: RequestBuilder) -> Result<ApiResponse> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("github-build/", env!("CARGO_PKG_VERSION")))
            .send()?;

        let status = response.status().as_u16();
        let text = response.text()?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        debug!(method, path, status, "GitHub API call");
        Ok(ApiResponse { status, body })
    }
}

impl GitHubApi for HttpGitHubApi {
    fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send("GET", path, self.client.get(self.url(path)))
    }

    fn put(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.send("PUT", path, self.client.put(self.url(path)).json(body))
    }

    fn patch(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        self.send("PATCH", path, self.client.patch(self.url(path)).json(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn test_unexpected_uses_api_message() {
        let response = ApiResponse::new(403, json!({"message": "Resource not accessible"}));
        let err = response.unexpected("PUT", "/repos/o/r/vulnerability-alerts");
        assert_eq!(
            err.to_string(),
            "GitHub API PUT /repos/o/r/vulnerability-alerts failed with status 403: Resource not accessible"
        );
    }

    #[test]
    fn test_unexpected_without_body() {
        let err = ApiResponse::empty(500).unexpected("GET", "/repos/o/r");
        assert!(matches!(err, BuildError::Remote { status: 500, .. }));
    }

    #[test]
    #[serial]
    fn test_from_env_requires_token() {
        env::remove_var(GITHUB_TOKEN_ENV);
        assert!(matches!(HttpGitHubApi::from_env(), Err(BuildError::Config(_))));

        env::set_var(GITHUB_TOKEN_ENV, "ghp_test");
        assert!(HttpGitHubApi::from_env().is_ok());
        env::remove_var(GITHUB_TOKEN_ENV);
    }

    #[test]
    fn test_base_url_normalized() {
        let api = HttpGitHubApi::new("t").unwrap().with_base_url("http://localhost:8080/");
        assert_eq!(api.url("/repos/o/r"), "http://localhost:8080/repos/o/r");
    }
}
