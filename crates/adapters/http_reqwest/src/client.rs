//! reqwest implementation of [`ApiClient`].

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;

use badger_app::ports::ApiClient;
use badger_domain::error::BadgerError;

use crate::error::HttpClientError;

const PREVIEW_LIMIT: usize = 500;

/// Configuration for the remote API adapter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix of every endpoint, e.g. `https://badgerapis.badgermapping.com/api/2`.
    pub base_url: String,
    /// Sent as `Authorization: Token <key>` when non-empty.
    pub api_key: String,
    pub timeout: Duration,
}

impl Config {
    /// Build a [`ReqwestApiClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::Transport`] if the HTTP client cannot be
    /// initialized.
    pub fn build(self) -> Result<ReqwestApiClient, HttpClientError> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(ReqwestApiClient {
            http,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key,
        })
    }
}

/// Remote API client issuing raw requests on behalf of `api` actions.
pub struct ReqwestApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ReqwestApiClient {
    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}", self.base_url)
        }
    }

    async fn send(
        &self,
        method: &str,
        endpoint: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>, HttpClientError> {
        let method = parse_method(method)?;
        let with_body = method == Method::POST || method == Method::PATCH;
        let url = self.url(endpoint);

        let mut request = self.http.request(method.clone(), &url);
        if !self.api_key.is_empty() {
            request = request.header(AUTHORIZATION, format!("Token {}", self.api_key));
        }
        if with_body && !data.is_empty() {
            request = request.form(data);
        }

        tracing::debug!(%method, %url, "sending api request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(HttpClientError::UnexpectedStatus {
                status: status.as_u16(),
                preview: preview(&body),
            });
        }
        Ok(body.to_vec())
    }
}

impl ApiClient for ReqwestApiClient {
    async fn raw_request(
        &self,
        method: &str,
        endpoint: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>, BadgerError> {
        Ok(self.send(method, endpoint, data).await?)
    }
}

fn parse_method(method: &str) -> Result<Method, HttpClientError> {
    match method.trim().to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        _ => Err(HttpClientError::UnsupportedMethod(method.to_string())),
    }
}

/// First [`PREVIEW_LIMIT`] characters of a response body.
fn preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}
