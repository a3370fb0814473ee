//! Cloudflare API client
//!
//! Direct Cloudflare v4 API access with Bearer token authentication.
//! Endpoint-specific operations live next to their entity types.

use crate::error::{CloudflareError, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct CloudflareConfig {
    pub api_token: String,
    pub base_url: String,
}

impl CloudflareConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: CLOUDFLARE_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create CloudflareConfig from environment variables
    ///
    /// `CLOUDFLARE_API_TOKEN` is required, `CLOUDFLARE_API_BASE_URL` overrides
    /// the API endpoint.
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var("CLOUDFLARE_API_TOKEN")
            .map_err(|_| CloudflareError::MissingEnvVar("CLOUDFLARE_API_TOKEN".to_string()))?;

        let mut config = Self::new(api_token);
        if let Ok(base_url) = std::env::var("CLOUDFLARE_API_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }
}

/// Cloudflare API client
#[derive(Clone)]
pub struct CloudflareClient {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
}

impl CloudflareClient {
    pub fn new(config: CloudflareConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_token: config.api_token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send a request and unwrap the Cloudflare response envelope
    ///
    /// HTTP 404 becomes [`CloudflareError::NotFound`] carrying `what`.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = request.bearer_auth(&self.api_token).send().await?;
        let status = response.status();
        tracing::debug!("Cloudflare API responded {} for {}", status, what);

        if status == StatusCode::NOT_FOUND {
            return Err(CloudflareError::NotFound(what.to_string()));
        }

        let body = response.text().await?;
        let api_response: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            // proxies answer with HTML error pages
            Err(_) if !status.is_success() => {
                return Err(CloudflareError::ApiError {
                    status: status.as_u16(),
                    message: format!("unexpected response body: {}", body_excerpt(&body)),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !api_response.success || !status.is_success() {
            let message = api_response
                .errors
                .first()
                .map(|e| format!("{} (code {})", e.message, e.code))
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(CloudflareError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        api_response.result.ok_or_else(|| CloudflareError::ApiError {
            status: status.as_u16(),
            message: format!("empty result for {}", what),
        })
    }
}

const BODY_EXCERPT_CHARS: usize = 200;

fn body_excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > BODY_EXCERPT_CHARS {
        let excerpt: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{}...", excerpt)
    } else {
        trimmed.to_string()
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    result: Option<T>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i32,
    message: String,
}
