use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use super::schemas::{ImageTraceData, TraceStep};
use crate::schemas::GenericResponse;
use crate::utils::error_chain_fmt;

/// Failures of the image lookups. The trace is only filled when the caller
/// asked for `debug=1`.
#[allow(clippy::enum_variant_names)]
#[derive(thiserror::Error)]
pub enum ImageResolveError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Image not found")]
    NotFoundError(Option<Vec<TraceStep>>),
    #[error("{message}")]
    UpstreamError {
        message: String,
        #[source]
        source: anyhow::Error,
        trace: Option<Vec<TraceStep>>,
    },
    #[error("{0}")]
    NotImplementedError(String),
}

impl std::fmt::Debug for ImageResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ImageResolveError {
    fn status_code(&self) -> StatusCode {
        match self {
            ImageResolveError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ImageResolveError::NotFoundError(_) => StatusCode::NOT_FOUND,
            ImageResolveError::UpstreamError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ImageResolveError::NotImplementedError(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let (message, trace) = match self {
            ImageResolveError::ValidationError(message)
            | ImageResolveError::NotImplementedError(message) => (message.to_string(), None),
            ImageResolveError::NotFoundError(trace) => (self.to_string(), trace.clone()),
            ImageResolveError::UpstreamError {
                message,
                source,
                trace,
            } => (format!("{}: {}", message, source), trace.clone()),
        };
        HttpResponse::build(status_code).json(GenericResponse::error(
            &message,
            status_code.as_str(),
            trace.map(|trace| ImageTraceData { trace }),
        ))
    }
}
