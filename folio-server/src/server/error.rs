use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use folio_data::{error::ClientError, exchange::ExchangeId};
use thiserror::Error;
use tracing::warn;

use crate::{ledger::LedgerError, store::StoreError};

/*----- */
// Server Error
/*----- */
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("missing or invalid X-API-KEY header")]
    Unauthorised,

    #[error("{0} credentials are not configured")]
    NotConfigured(ExchangeId),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("upstream error: {0}")]
    Upstream(#[from] ClientError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Unauthorised => StatusCode::UNAUTHORIZED,
            ServerError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Upstream(error) if error.is_rate_limited() => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ServerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServerError::Ledger(LedgerError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Ledger(_) => StatusCode::BAD_REQUEST,
            ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            warn!(status = status.as_u16(), error = %self, "request failed");
        }

        HttpResponse::build(status).json(serde_json::json!({ "error": self.to_string() }))
    }
}
