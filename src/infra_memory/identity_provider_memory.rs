use crate::domain_model::UserId;
use crate::domain_port::{IdentityError, IdentityProvider, Principal};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use email_address::EmailAddress;
use std::sync::Arc;
use tokio::sync::watch;

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    principal: Principal,
    password_hash: String,
}

/// Registered accounts, shared by every client of one identity backend.
#[derive(Clone, Default)]
pub struct MemoryAccounts {
    by_email: Arc<DashMap<String, Account>>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

/// One client of the in-memory identity backend, tracking its own signed-in principal.
pub struct MemoryIdentityProvider {
    accounts: MemoryAccounts,
    state: watch::Sender<Option<Principal>>,
}

impl MemoryIdentityProvider {
    pub fn new(accounts: MemoryAccounts) -> Self {
        let (state, _) = watch::channel(None);
        Self { accounts, state }
    }

    fn set_current(&self, principal: Option<Principal>) {
        self.state.send_replace(principal);
    }
}

fn normalize_email(email: &str) -> Result<String, IdentityError> {
    let email = email.trim().to_lowercase();
    if !EmailAddress::is_valid(&email) {
        return Err(IdentityError::InvalidEmail);
    }
    Ok(email)
}

fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| IdentityError::Internal(e.to_string()))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, password_hash: &str) -> Result<bool, IdentityError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| IdentityError::Internal(format!("invalid PHC hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(IdentityError::Internal(format!("verify error: {e}"))),
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Principal, IdentityError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword);
        }
        let password_hash = hash_password(password)?;

        let principal = match self.accounts.by_email.entry(email.clone()) {
            Entry::Occupied(_) => return Err(IdentityError::EmailInUse),
            Entry::Vacant(slot) => {
                let principal = Principal {
                    user_id: UserId::generate(),
                    email,
                    display_name: display_name.trim().to_owned(),
                };
                slot.insert(Account {
                    principal: principal.clone(),
                    password_hash,
                });
                principal
            }
        };

        tracing::info!(user_id = %principal.user_id, "account created");
        self.set_current(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        let email = normalize_email(email).map_err(|_| IdentityError::InvalidCredentials)?;
        let (principal, password_hash) = match self.accounts.by_email.get(&email) {
            Some(account) => (account.principal.clone(), account.password_hash.clone()),
            None => return Err(IdentityError::InvalidCredentials),
        };

        if !verify_password(password, &password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }

        self.set_current(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.set_current(None);
        Ok(())
    }

    fn current_principal(&self) -> Option<Principal> {
        self.state.borrow().clone()
    }

    fn on_auth_change(&self) -> watch::Receiver<Option<Principal>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_account_signs_in_and_rejects_duplicates() {
        let accounts = MemoryAccounts::new();
        let identity = MemoryIdentityProvider::new(accounts.clone());
        let changes = identity.on_auth_change();

        let principal = identity
            .create_account("Ada@Example.com", "secret1", "Ada")
            .await
            .unwrap();
        assert_eq!(principal.email, "ada@example.com");
        assert_eq!(identity.current_principal(), Some(principal.clone()));
        assert_eq!(*changes.borrow(), Some(principal));

        let err = identity
            .create_account("ada@example.com", "another1", "Ada 2")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EmailInUse));
        assert_eq!(accounts.len(), 1);
    }

    #[tokio::test]
    async fn validation_rules() {
        let identity = MemoryIdentityProvider::new(MemoryAccounts::new());
        assert!(matches!(
            identity.create_account("not-an-email", "secret1", "x").await,
            Err(IdentityError::InvalidEmail)
        ));
        assert!(matches!(
            identity.create_account("x@example.com", "12345", "x").await,
            Err(IdentityError::WeakPassword)
        ));
    }

    #[tokio::test]
    async fn clients_share_accounts_but_not_sessions() {
        let accounts = MemoryAccounts::new();
        let first = MemoryIdentityProvider::new(accounts.clone());
        let second = MemoryIdentityProvider::new(accounts);

        let principal = first
            .create_account("bo@example.com", "secret1", "Bo")
            .await
            .unwrap();
        assert!(second.current_principal().is_none());

        assert!(matches!(
            second.sign_in("bo@example.com", "wrong-pw").await,
            Err(IdentityError::InvalidCredentials)
        ));
        let signed_in = second.sign_in("bo@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in.user_id, principal.user_id);

        second.sign_out().await.unwrap();
        assert!(second.current_principal().is_none());
        assert!(first.current_principal().is_some());
    }
}
