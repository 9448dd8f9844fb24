use crate::domain_model::UserId;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password should be at least 6 characters")]
    WeakPassword,
    #[error("this email is already registered")]
    EmailInUse,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Authentication backend as seen by one client session.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Registers a principal and signs it in.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Principal, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;

    fn current_principal(&self) -> Option<Principal>;

    /// Sign-in and sign-out transitions. A fresh receiver sees the current state.
    fn on_auth_change(&self) -> watch::Receiver<Option<Principal>>;
}
