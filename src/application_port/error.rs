use crate::domain_port::{IdentityError, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("user not authenticated")]
    Unauthenticated,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("friend request already sent")]
    DuplicateRequest,
    #[error("already liked")]
    AlreadyLiked,
    #[error("post already saved")]
    AlreadySaved,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { collection, id } => {
                ServiceError::NotFound(format!("{collection}/{id}"))
            }
            StoreError::Unavailable(e) => ServiceError::RemoteUnavailable(e),
            StoreError::Decode(e) => ServiceError::RemoteUnavailable(format!("malformed document: {e}")),
        }
    }
}

impl From<IdentityError> for ServiceError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidCredentials => ServiceError::Unauthenticated,
            IdentityError::InvalidEmail
            | IdentityError::WeakPassword
            | IdentityError::EmailInUse => ServiceError::Validation(error.to_string()),
            IdentityError::Internal(e) => ServiceError::RemoteUnavailable(e),
        }
    }
}

/// Rejects text that is empty after trimming.
pub fn require_text(field: &str, text: &str) -> Result<(), ServiceError> {
    if text.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
