use crate::application_impl::Session;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::Settings;
use crate::util::RetryPolicy;
use dashmap::DashMap;
use nanoid::nanoid;
use std::sync::Arc;

/// Creates one identity client per session. Clients of the same backend share
/// the account registry but not the signed-in principal.
enum IdentityBackend {
    Memory(MemoryAccounts),
}

impl IdentityBackend {
    fn client(&self) -> Arc<dyn IdentityProvider> {
        match self {
            Self::Memory(accounts) => Arc::new(MemoryIdentityProvider::new(accounts.clone())),
        }
    }
}

pub struct Server {
    run_id: String,
    store: Arc<dyn DocumentStore>,
    identity: IdentityBackend,
    sessions: DashMap<String, Arc<Session>>,
    suggestion_limit: usize,
    retry: RetryPolicy,
}

impl Server {
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);

        let store: Arc<dyn DocumentStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryDocumentStore::new()),
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let identity = match settings.identity.backend.as_str() {
            "memory" => IdentityBackend::Memory(MemoryAccounts::new()),
            other => return Err(anyhow::anyhow!("Unknown identity backend: {}", other)),
        };

        info!(
            %run_id,
            store = %settings.store.backend,
            identity = %settings.identity.backend,
            "server started"
        );

        Ok(Self {
            run_id,
            store,
            identity,
            sessions: DashMap::new(),
            suggestion_limit: settings.graph.suggestion_limit,
            retry: settings.retry.policy(),
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Opens a client session with its own identity state and caches.
    pub fn open_session(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(
            self.store.clone(),
            self.identity.client(),
            self.suggestion_limit,
        ));
        self.sessions.insert(session.id().to_owned(), session.clone());
        debug!(session = session.id(), "session opened");
        session
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn close_session(&self, id: &str) -> bool {
        match self.sessions.remove(id) {
            Some((_, session)) => {
                session.end();
                true
            }
            None => false,
        }
    }

    pub fn shutdown(&self) {
        info!("server shutting down...");
        let ids: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.close_session(&id);
        }
        info!(run_id = %self.run_id, "server stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::parse_settings_str;

    fn settings(store: &str, identity: &str) -> Settings {
        parse_settings_str(&format!(
            "[log]\nfilter = \"info\"\n[store]\nbackend = \"{store}\"\n[identity]\nbackend = \"{identity}\"\n"
        ))
        .unwrap()
    }

    #[test]
    fn unknown_backends_are_rejected() {
        assert!(Server::try_new(&settings("firestore", "memory")).is_err());
        assert!(Server::try_new(&settings("memory", "oauth")).is_err());
    }

    #[test]
    fn sessions_are_tracked_until_closed() {
        let server = Server::try_new(&settings("memory", "memory")).unwrap();
        let a = server.open_session();
        let b = server.open_session();
        assert_ne!(a.id(), b.id());
        assert_eq!(server.session_count(), 2);

        assert!(server.close_session(a.id()));
        assert!(!server.close_session(a.id()));
        assert_eq!(server.session_count(), 1);

        server.shutdown();
        assert_eq!(server.session_count(), 0);
    }

    #[tokio::test]
    async fn sessions_share_accounts_but_not_sign_in_state() {
        let server = Server::try_new(&settings("memory", "memory")).unwrap();
        let a = server.open_session();
        let b = server.open_session();

        let created = a.sign_up("ann@example.com", "secret1", "Ann").await;
        assert!(created.success);
        assert!(a.current_principal().is_some());
        assert!(b.current_principal().is_none());

        let signed_in = b.sign_in("ann@example.com", "secret1").await;
        assert!(signed_in.success);
        assert_eq!(
            b.current_principal().map(|p| p.user_id),
            a.current_principal().map(|p| p.user_id)
        );
    }
}
