//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

use crate::ports::AuthError;
use crate::validation::ValidationError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Not authorized to {action}")]
    Forbidden { action: &'static str },

    #[error("Failed to {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: RepoError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn post_not_found(id: Uuid) -> Self {
        DomainError::NotFound {
            entity_type: "Post",
            id,
        }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        DomainError::NotFound {
            entity_type: "User",
            id,
        }
    }

    /// Wrap a repository failure, naming the operation that was attempted.
    pub fn store(operation: &'static str, source: RepoError) -> Self {
        DomainError::Store { operation, source }
    }

    /// Text that may be shown to the caller.
    ///
    /// Store and internal failures collapse to a generic message; their
    /// details only ever reach the logs.
    pub fn public_message(&self) -> String {
        match self {
            DomainError::NotFound { entity_type, .. } => format!("{entity_type} not found"),
            DomainError::Validation(e) => format!("Invalid fields: {e}"),
            DomainError::DuplicateEmail(_) => "User with this email already exists".to_string(),
            DomainError::InvalidCredentials => "Invalid email or password".to_string(),
            DomainError::Unauthorized => "Unauthorized".to_string(),
            DomainError::Forbidden { action } => format!("Not authorized to {action}"),
            DomainError::Store { operation, .. } => {
                format!("Failed to {operation}. Please try again.")
            }
            DomainError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => DomainError::InvalidCredentials,
            AuthError::TokenExpired | AuthError::InvalidToken(_) => DomainError::Unauthorized,
            AuthError::Hashing(msg) | AuthError::Signing(msg) => DomainError::Internal(msg),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
