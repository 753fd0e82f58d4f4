use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Every way a generation request can fail. `Display` is the bare message that
/// ends up in the `{ "error": ... }` envelope.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Missing server-side secret. Operator-fixable.
    #[error("{0}")]
    ConfigError(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    UnsupportedModel(String),
    /// An uploaded file could not be turned into an inline image part.
    #[error("{0}")]
    EncodingError(String),
    /// Transport failure or non-2xx answer from the chat-completions API.
    #[error("{message}")]
    UpstreamError { status: Option<u16>, message: String },
    /// Upstream answered successfully but no image could be extracted.
    #[error("{0}")]
    EmptyResult(String),
    #[error("{0}")]
    InternalError(String),
}

impl GenerationError {
    pub fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn status(&self) -> StatusCode {
        match self {
            GenerationError::InvalidInput(_) | GenerationError::UnsupportedModel(_) => {
                StatusCode::BAD_REQUEST
            }
            GenerationError::UpstreamError { .. } | GenerationError::EmptyResult(_) => {
                StatusCode::BAD_GATEWAY
            }
            GenerationError::ConfigError(_)
            | GenerationError::EncodingError(_)
            | GenerationError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message for the error envelope, falling back when the failure carries none.
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for GenerationError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).json(ErrorBody {
            error: self.public_message(),
        })
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
