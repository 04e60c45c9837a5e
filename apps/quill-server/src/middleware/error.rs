//! Error responses.
//!
//! Read endpoints answer with RFC 7807 problem details ([`AppError`]).
//! Actions answer with the same `{ success, message, redirect? }` body they
//! use on success ([`ActionError`]), so forms can always show `message`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use quill_core::DomainError;
use quill_shared::{ActionResponse, ErrorResponse};

/// HTTP status for a domain failure.
fn status_of(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::InvalidCredentials | DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden { .. } => StatusCode::FORBIDDEN,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::DuplicateEmail(_) => StatusCode::CONFLICT,
        DomainError::Store { .. } | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_server_error(err: &DomainError) {
    if matches!(err, DomainError::Store { .. } | DomainError::Internal(_)) {
        tracing::error!(error = ?err, "Request failed");
    }
}

/// Failure of a read endpoint, rendered as RFC 7807 problem details.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized,
    Forbidden,
    Domain(DomainError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Domain(err) => status_of(err),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let title = status.canonical_reason().unwrap_or("Error");
        let mut problem = ErrorResponse::new(status.as_u16(), title);

        match self {
            AppError::NotFound(detail) => {
                problem = problem.with_detail(detail);
            }
            AppError::Unauthorized => {
                problem = problem
                    .with_detail("Sign in to continue.")
                    .with_instance("/login");
            }
            AppError::Forbidden => {
                problem = problem.with_detail("Administrator access required.");
            }
            AppError::Domain(err) => {
                log_server_error(err);
                problem = problem.with_detail(err.public_message());
            }
        }

        HttpResponse::build(status).json(problem)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Unauthorized => AppError::Unauthorized,
            other => AppError::Domain(other),
        }
    }
}

/// Result type alias for read handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Failure of an action, rendered as an [`ActionResponse`] with `success: false`.
#[derive(Debug)]
pub struct ActionError(pub DomainError);

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for ActionError {
    fn status_code(&self) -> StatusCode {
        status_of(&self.0)
    }

    fn error_response(&self) -> HttpResponse {
        log_server_error(&self.0);

        let mut body = ActionResponse::failed(self.0.public_message());
        if matches!(self.0, DomainError::Unauthorized) {
            body = body.with_redirect("/login");
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DomainError> for ActionError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}
