//! Remote server-generation API client.
//!
//! Thin glue around the generation service: one call collects page data for
//! a set of documentation URLs, a second call turns that page data into the
//! server artifacts (source, Dockerfile, dependency manifest) plus the list
//! of environment variable names the generated server needs. The pipeline
//! core only consumes these outputs; the service's internals are out of
//! scope here.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Generation API errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Transport-level request failure
    #[error("Generation API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a structured error payload
    #[error("Generation API error: {message}")]
    Api {
        /// Human-readable error message from the API
        message: String,
        /// URLs the API could not process, if reported
        failed_urls: Vec<String>,
    },

    /// The documentation yielded no usable endpoints
    #[error("No endpoints found in the supplied documentation")]
    NoEndpoints,
}

/// Result type for generation API operations.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Page data collected from documentation URLs, with remaining quota.
#[derive(Debug, Clone)]
pub struct PagesData {
    /// Opaque page data to feed into [`GenerationClient::generate`]
    pub pages: Value,
    /// URLs remaining in the caller's quota, if the API reports it
    pub urls_left: Option<u64>,
}

/// Artifacts produced for one generated server.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedServer {
    /// Generated server source code
    pub server_code: String,
    /// Image build descriptor
    pub dockerfile: String,
    /// Dependency manifest
    pub requirements: String,
    /// Names of environment variables the server needs at runtime
    #[serde(default)]
    pub env_vars: Vec<String>,
}

impl GeneratedServer {
    /// Map the artifacts onto the workspace file-name contract.
    pub fn files(&self) -> HashMap<String, String> {
        HashMap::from([
            (
                crate::env::files::SERVER_SOURCE.to_string(),
                self.server_code.clone(),
            ),
            (
                crate::env::files::BUILD_DESCRIPTOR.to_string(),
                self.dockerfile.clone(),
            ),
            (
                crate::env::files::DEPENDENCY_MANIFEST.to_string(),
                self.requirements.clone(),
            ),
        ])
    }
}

#[derive(Debug, Deserialize)]
struct MainResponse {
    data: Option<Value>,
    urls_left: Option<u64>,
}

/// Client for the remote generation API.
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GenerationClient {
    /// Create a client for the given API base URL and key.
    pub fn new<S: Into<String>, K: Into<String>>(base_url: S, api_key: K) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Collect page data for a set of documentation URLs.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Api`] for structured API errors,
    /// [`GenerateError::NoEndpoints`] if the response carries no data, and
    /// [`GenerateError::Http`] for transport failures.
    pub async fn fetch_pages(&self, urls: &[String]) -> Result<PagesData> {
        debug!("Fetching page data for {} URLs", urls.len());

        let response = self
            .http
            .post(format!("{}/v1/main", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "urls": urls }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: MainResponse = response.json().await?;
        match body.data {
            Some(pages) => Ok(PagesData {
                pages,
                urls_left: body.urls_left,
            }),
            None => Err(GenerateError::NoEndpoints),
        }
    }

    /// Generate server artifacts from collected page data.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Api`] for structured API errors and
    /// [`GenerateError::Http`] for transport failures.
    pub async fn generate(&self, pages: &Value, name: &str, port: u16) -> Result<GeneratedServer> {
        debug!("Requesting server generation for '{}'", name);

        let response = self
            .http
            .post(format!("{}/v1/gen", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "pages_data": pages,
                "name": name,
                "port": port,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json().await?)
    }
}

/// Turn a non-success response into a structured API error.
///
/// The API reports errors as `{"detail": ...}` where `detail` is either a
/// plain string or an object with `message` and optional `failed_urls`.
async fn api_error(response: reqwest::Response) -> GenerateError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    api_error_from_body(status.as_u16(), &body)
}

fn api_error_from_body(status: u16, body: &str) -> GenerateError {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(message)) => {
                return GenerateError::Api {
                    message: message.clone(),
                    failed_urls: Vec::new(),
                };
            }
            Some(Value::Object(detail)) => {
                let message = detail
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string();
                let failed_urls = detail
                    .get("failed_urls")
                    .and_then(Value::as_array)
                    .map(|urls| {
                        urls.iter()
                            .filter_map(Value::as_str)
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default();
                return GenerateError::Api {
                    message,
                    failed_urls,
                };
            }
            _ => {}
        }
    }

    GenerateError::Api {
        message: format!("HTTP {}", status),
        failed_urls: Vec::new(),
    }
}
