//! The application context: one explicitly owned container for the
//! session store, the cache and the flows built over them.
//!
//! Tests construct isolated contexts over an in-memory store; the real
//! application builds one from [`AppConfig`] with file-backed storage.

use std::sync::Arc;

use civica_client::PortalClient;
use civica_routes::AuthGate;
use civica_session::{FileStore, KeyValueStore, SessionStore, TtlCache};

use crate::config::AppConfig;
use crate::credit_titles::CreditTitlesFlow;
use crate::error::Result;
use crate::terms::TermsFlow;
use crate::users::UsersFlow;

/// Owns the session store and cache; hands out flows sharing them.
#[derive(Clone)]
pub struct AppContext {
    session: SessionStore,
    cache: TtlCache,
}

impl AppContext {
    /// Build the full stack from configuration (file-backed storage).
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = PortalClient::builder()
            .base_url(config.base_url.clone())
            .timeout(config.timeout)
            .build()?;
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data_dir));
        Ok(Self::with_parts(client, storage))
    }

    /// Assemble a context from pre-built parts (used by tests to inject
    /// an in-memory store).
    pub fn with_parts(client: PortalClient, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            session: SessionStore::new(client, Arc::clone(&storage)),
            cache: TtlCache::new(storage),
        }
    }

    /// The session store.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The TTL cache.
    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// A gate synchronized with the current session.
    pub fn gate(&self) -> AuthGate {
        let mut gate = AuthGate::new();
        gate.sync(&self.session);
        gate
    }

    /// The terms flows.
    pub fn terms(&self) -> TermsFlow {
        TermsFlow::new(self.session.clone(), self.cache.clone())
    }

    /// The user flows.
    pub fn users(&self) -> UsersFlow {
        UsersFlow::new(self.session.clone())
    }

    /// The credit title flows.
    pub fn credit_titles(&self) -> CreditTitlesFlow {
        CreditTitlesFlow::new(self.session.clone())
    }
}
