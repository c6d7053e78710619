use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use validator::ValidationErrors;

use crate::schemas::GenericResponse;
use crate::utils::error_chain_fmt;

#[allow(clippy::enum_variant_names)]
#[derive(thiserror::Error)]
pub enum GenericError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("{0}")]
    InsufficientPrivilegeError(String),
    #[error("{0}")]
    SerializationError(String),
    #[error("{0}")]
    DatabaseError(String, anyhow::Error),
    #[error("{0}")]
    UpstreamError(String, anyhow::Error),
    #[error("{0}")]
    ConfigurationError(String),
    #[error("{0}")]
    NotImplementedError(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for GenericError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<serde_json::Error> for GenericError {
    fn from(err: serde_json::Error) -> Self {
        GenericError::SerializationError(err.to_string())
    }
}

impl ResponseError for GenericError {
    fn status_code(&self) -> StatusCode {
        match self {
            GenericError::ValidationError(_) => StatusCode::BAD_REQUEST,
            GenericError::SerializationError(_) => StatusCode::BAD_REQUEST,
            GenericError::NotFoundError(_) => StatusCode::NOT_FOUND,
            GenericError::ConflictError(_) => StatusCode::CONFLICT,
            GenericError::InsufficientPrivilegeError(_) => StatusCode::UNAUTHORIZED,
            GenericError::DatabaseError(_, _) => StatusCode::INTERNAL_SERVER_ERROR,
            GenericError::UpstreamError(_, _) => StatusCode::INTERNAL_SERVER_ERROR,
            GenericError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GenericError::NotImplementedError(_) => StatusCode::NOT_IMPLEMENTED,
            GenericError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let status_code_str = status_code.as_str();
        let inner_error_msg = match self {
            GenericError::ValidationError(message)
            | GenericError::NotFoundError(message)
            | GenericError::ConflictError(message)
            | GenericError::InsufficientPrivilegeError(message)
            | GenericError::SerializationError(message)
            | GenericError::ConfigurationError(message)
            | GenericError::NotImplementedError(message) => message.to_string(),
            GenericError::DatabaseError(message, _err) => message.to_string(),
            GenericError::UpstreamError(message, _err) => message.to_string(),
            GenericError::UnexpectedError(error) => error.to_string(),
        };

        HttpResponse::build(status_code).json(GenericResponse::error(
            &inner_error_msg,
            status_code_str,
            Some(()),
        ))
    }
}

/// Flattens `validator` errors into one customer facing line.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect::<Vec<_>>()
                .join(", ");
            if detail.is_empty() {
                format!("{} is invalid", field)
            } else {
                format!("{}: {}", field, detail)
            }
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
