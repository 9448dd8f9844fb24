use crate::application_port::ServiceError;
use crate::domain_model::User;

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates the principal and its `users` document, then signs in.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, ServiceError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, ServiceError>;
    async fn sign_out(&self) -> Result<(), ServiceError>;
    async fn current_user_data(&self) -> Result<User, ServiceError>;
}
