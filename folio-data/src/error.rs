use std::time::Duration;

use thiserror::Error;

/*----- */
// Client Error
/*----- */
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Deserialising JSON error: {error} for binary payload: {payload:?}")]
    DeserialiseBinary {
        error: serde_json::Error,
        payload: Vec<u8>,
    },

    #[error("Serialising JSON error: {0}")]
    Serialise(serde_json::Error),

    #[error("Url encoding error: {0}")]
    UrlEncode(#[from] serde_urlencoded::ser::Error),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("HTTP request timed out")]
    HttpTimeout(reqwest::Error),

    /// REST http response error
    #[error("HTTP response (status={0}) error: {1}")]
    HttpResponse(reqwest::StatusCode, String),

    #[error("Unauthorised: {0}")]
    Unauthorised(String),

    #[error("Rate limited by {base_url}")]
    RateLimited {
        base_url: String,
        retry_after: Option<Duration>,
    },

    #[error("{exchange} API error {code}: {msg}")]
    Api {
        exchange: &'static str,
        code: String,
        msg: String,
    },

    #[error("No base url configured for {0}")]
    NoBaseUrl(&'static str),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        match error {
            error if error.is_timeout() => ClientError::HttpTimeout(error),
            error => ClientError::Http(error),
        }
    }
}

impl ClientError {
    // Errors that justify trying the next base url rather than surfacing to the caller
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::Http(_) => true,
            ClientError::HttpTimeout(_) => true,
            ClientError::HttpResponse(status, _) if status.is_server_error() => true,
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::RateLimited { .. })
    }

    pub fn api_code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}
