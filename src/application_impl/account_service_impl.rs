use crate::application_port::{AccountService, ServiceError};
use crate::domain_model::{User, UserId};
use crate::domain_port::collections::{USERS, from_document, to_document, to_value};
use crate::domain_port::{DocumentStore, FieldChange, IdentityProvider};
use std::sync::Arc;

pub struct RealAccountService {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
}

impl RealAccountService {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self { identity, store }
    }

    async fn load_user(&self, user_id: UserId) -> Result<User, ServiceError> {
        let doc = self.store.get_document(USERS, &user_id.to_string()).await?;
        Ok(from_document(doc)?)
    }
}

#[async_trait::async_trait]
impl AccountService for RealAccountService {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, ServiceError> {
        if display_name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "display name must not be empty".to_owned(),
            ));
        }
        let principal = self
            .identity
            .create_account(email, password, display_name)
            .await?;

        let user = User::new(
            principal.user_id,
            &principal.display_name,
            &principal.email,
            self.store.server_timestamp(),
        );
        self.store
            .set_document(USERS, &user.uid.to_string(), to_document(&user)?)
            .await?;

        tracing::info!(user_id = %user.uid, "user signed up");
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let principal = self.identity.sign_in(email, password).await?;

        let last_login = to_value(&self.store.server_timestamp().timestamp_micros())?;
        self.store
            .update_document(
                USERS,
                &principal.user_id.to_string(),
                vec![("lastLogin".to_owned(), FieldChange::Set(last_login))],
            )
            .await?;

        tracing::info!(user_id = %principal.user_id, "user signed in");
        self.load_user(principal.user_id).await
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        self.identity.sign_out().await?;
        Ok(())
    }

    async fn current_user_data(&self) -> Result<User, ServiceError> {
        let principal = self
            .identity
            .current_principal()
            .ok_or(ServiceError::Unauthenticated)?;
        self.load_user(principal.user_id).await
    }
}
