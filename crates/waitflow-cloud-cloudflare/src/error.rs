//! Cloudflare provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudflareError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cloudflare API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid import id `{0}`, expected <zone_id>/<waiting_room_id>/<event_id>")]
    InvalidImportId(String),

    #[error("Template render error: {0}")]
    Template(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] waitflow_cloud::CloudError),
}

impl CloudflareError {
    /// Whether the API reported that the object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudflareError::NotFound(_))
    }
}

impl From<CloudflareError> for waitflow_cloud::CloudError {
    fn from(e: CloudflareError) -> Self {
        use waitflow_cloud::CloudError;
        match e {
            CloudflareError::NotFound(what) => CloudError::ResourceNotFound(what),
            CloudflareError::InvalidConfig(msg) => CloudError::InvalidConfig(msg),
            CloudflareError::InvalidImportId(id) => {
                CloudError::InvalidConfig(format!("invalid import id: {id}"))
            }
            CloudflareError::CloudError(inner) => inner,
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudflareError>;

/// Failures of post-destroy verification
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("waiting room event still exists: {address} (id {event_id})")]
    StillExists { address: String, event_id: String },

    #[error("invalid recorded state: {0}")]
    InvalidState(#[from] waitflow_cloud::CloudError),

    #[error("could not verify {address} was destroyed: {source}")]
    Api {
        address: String,
        #[source]
        source: CloudflareError,
    },
}
