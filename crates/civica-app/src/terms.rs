//! Terms-of-service flows.
//!
//! The two read-mostly lookups sit behind the TTL cache: the latest
//! terms document changes rarely and is cached for an hour; a user's
//! acceptance status is cached for five minutes. Recording an
//! interaction writes the status entry through with a fresh TTL instead
//! of invalidating, so the screen that just recorded it doesn't trigger
//! an immediate re-fetch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::debug;

use civica_client::{PortalClient, Term, TermRequest, TermsInteraction};
use civica_session::{SessionStore, TtlCache};

use crate::error::{Error, Result};
use crate::fetch::FetchGuard;

/// Cache key for the latest terms document.
pub const LATEST_TERMS_KEY: &str = "latestTerms";

/// How long the latest terms document stays cached.
pub const LATEST_TERMS_TTL: Duration = Duration::from_secs(60 * 60);

/// How long a user's acceptance status stays cached.
pub const USER_TERMS_STATUS_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache key for one user's acceptance status.
pub fn user_terms_status_key(user_id: i64) -> String {
    format!("userTermsStatus_{}", user_id)
}

/// Flow state, read by the terms screens.
#[derive(Debug, Clone, Default)]
pub struct TermsState {
    /// All terms documents (management screen).
    pub terms: Vec<Term>,
    /// The latest effective document, once fetched.
    pub latest: Option<Term>,
    /// The current user's acceptance status, once checked.
    pub user_status: Option<bool>,
    /// Field errors from the last save/update.
    pub field_errors: HashMap<String, String>,
}

/// Terms flows.
#[derive(Clone)]
pub struct TermsFlow {
    session: SessionStore,
    cache: TtlCache,
    state: Arc<RwLock<TermsState>>,
}

impl TermsFlow {
    /// Create the flow over a session store and cache.
    pub fn new(session: SessionStore, cache: TtlCache) -> Self {
        Self {
            session,
            cache,
            state: Arc::new(RwLock::new(TermsState::default())),
        }
    }

    fn client(&self) -> PortalClient {
        self.session.client().clone()
    }

    /// Snapshot of the flow state.
    pub fn state(&self) -> TermsState {
        self.state.read().clone()
    }

    /// Load all terms documents (management screen).
    pub async fn load(&self, guard: &FetchGuard) -> Result<()> {
        match self.client().terms().list().await {
            Ok(terms) => {
                if guard.is_live() {
                    self.state.write().terms = terms;
                }
                Ok(())
            }
            Err(err) => Err(self.auth_or(err)),
        }
    }

    /// Get the latest effective terms document, cached for an hour.
    pub async fn latest(&self, guard: &FetchGuard) -> Result<Term> {
        if let Some(term) = self.cache.get_as::<Term>(LATEST_TERMS_KEY)? {
            debug!("latest terms served from cache");
            if guard.is_live() {
                self.state.write().latest = Some(term.clone());
            }
            return Ok(term);
        }

        let term = self.client().terms().latest().await?;
        self.cache.set(LATEST_TERMS_KEY, &term, LATEST_TERMS_TTL)?;
        if guard.is_live() {
            self.state.write().latest = Some(term.clone());
        }
        Ok(term)
    }

    /// Check whether a user has accepted the current terms, cached for
    /// five minutes.
    pub async fn user_status(&self, guard: &FetchGuard, user_id: i64) -> Result<bool> {
        let key = user_terms_status_key(user_id);
        if let Some(status) = self.cache.get_as::<bool>(&key)? {
            debug!(user_id = user_id, "terms status served from cache");
            if guard.is_live() {
                self.state.write().user_status = Some(status);
            }
            return Ok(status);
        }

        match self.client().terms().user_status(user_id).await {
            Ok(status) => {
                self.cache.set(&key, &status, USER_TERMS_STATUS_TTL)?;
                if guard.is_live() {
                    self.state.write().user_status = Some(status);
                }
                Ok(status)
            }
            Err(err) => Err(self.auth_or(err)),
        }
    }

    /// Record a user's accept/decline interaction and write the status
    /// entry through with a fresh TTL.
    pub async fn record_interaction(
        &self,
        guard: &FetchGuard,
        user_id: i64,
        accepted: bool,
    ) -> Result<TermsInteraction> {
        let interaction = self
            .client()
            .terms()
            .record_interaction(user_id, accepted)
            .await?;

        self.cache.set(
            &user_terms_status_key(user_id),
            &accepted,
            USER_TERMS_STATUS_TTL,
        )?;
        if guard.is_live() {
            self.state.write().user_status = Some(accepted);
        }
        Ok(interaction)
    }

    /// Create a terms document. A validation failure lands in
    /// [`TermsState::field_errors`] and yields `Ok(None)`.
    pub async fn save(&self, request: &TermRequest) -> Result<Option<Term>> {
        match self.client().terms().create(request).await {
            Ok(term) => {
                let mut state = self.state.write();
                state.field_errors.clear();
                state.terms.push(term.clone());
                // A new document supersedes whatever latest was cached.
                drop(state);
                self.cache.invalidate(LATEST_TERMS_KEY)?;
                Ok(Some(term))
            }
            Err(err) => self.absorb_write_failure(err),
        }
    }

    /// Update a terms document. Same failure handling as
    /// [`save`](Self::save).
    pub async fn update(&self, id: i64, request: &TermRequest) -> Result<Option<Term>> {
        match self.client().terms().update(id, request).await {
            Ok(term) => {
                let mut state = self.state.write();
                state.field_errors.clear();
                if let Some(slot) = state.terms.iter_mut().find(|t| t.id == id) {
                    *slot = term.clone();
                }
                drop(state);
                self.cache.invalidate(LATEST_TERMS_KEY)?;
                Ok(Some(term))
            }
            Err(err) => self.absorb_write_failure(err),
        }
    }

    /// Delete a terms document.
    pub async fn remove(&self, id: i64) -> Result<()> {
        match self.client().terms().delete(id).await {
            Ok(()) => {
                let mut state = self.state.write();
                state.terms.retain(|t| t.id != id);
                drop(state);
                self.cache.invalidate(LATEST_TERMS_KEY)?;
                Ok(())
            }
            Err(err) => Err(self.auth_or(err)),
        }
    }

    fn absorb_write_failure(&self, err: civica_client::Error) -> Result<Option<Term>> {
        match err {
            civica_client::Error::Validation { fields } => {
                self.state.write().field_errors = fields;
                Ok(None)
            }
            other => Err(self.auth_or(other)),
        }
    }

    fn auth_or(&self, err: civica_client::Error) -> Error {
        if self.session.logout_if_unauthorized(&err) {
            Error::SessionExpired
        } else {
            Error::Client(err)
        }
    }
}
