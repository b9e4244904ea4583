//! Errors surfaced to HTTP clients. Every variant renders as `{"error": "<message>"}`.

use crate::flight_api::QueryError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use flight_finder_shared::results::ErrorResponse;
use thiserror::Error;

pub const GENERIC_UPSTREAM: &str = "Failed to fetch data from the flight provider. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Server configuration error: {0} is not set")]
    MissingKey(&'static str),
    #[error(transparent)]
    Upstream(#[from] QueryError),
}

impl ApiError {
    fn message(&self) -> String {
        match self {
            ApiError::InvalidInput(_) | ApiError::MissingKey(_) => self.to_string(),
            ApiError::Upstream(err) => match err {
                QueryError::Unauthorized(msg) => msg
                    .clone()
                    .unwrap_or_else(|| "Invalid API key for the flight provider.".to_string()),
                QueryError::RateLimitExceeded(msg) => msg
                    .clone()
                    .unwrap_or_else(|| "Rate limit exceeded. Please try again later.".to_string()),
                QueryError::BadResponse(_, msg) => {
                    msg.clone().unwrap_or_else(|| GENERIC_UPSTREAM.to_string())
                }
                QueryError::Provider(msg) => msg.clone(),
                QueryError::ReqwestErr(_) | QueryError::ResponseConversionErr(..) => {
                    GENERIC_UPSTREAM.to_string()
                }
            },
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingKey(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(err) => match err {
                QueryError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                QueryError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
                QueryError::BadResponse(code, _) => StatusCode::from_u16(*code)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                QueryError::Provider(_) => StatusCode::BAD_REQUEST,
                QueryError::ReqwestErr(_) | QueryError::ResponseConversionErr(..) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::MissingKey(var) => {
                tracing::error!("Provider key {} missing from environment", var)
            }
            ApiError::Upstream(QueryError::ReqwestErr(e)) => {
                tracing::error!("Provider request failed: {}", e)
            }
            ApiError::Upstream(QueryError::ResponseConversionErr(e, body)) => {
                tracing::error!("Provider response could not be decoded: {} ({})", e, body)
            }
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.message(),
        })
    }
}
