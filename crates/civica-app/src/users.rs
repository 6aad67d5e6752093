//! User flows: listing, admin CRUD and self-service registration.
//!
//! Registration is taxpayer-integrated: the identity document is checked
//! against the taxpayer registry before the account form is submitted,
//! and a registry hit prefills the form. Duplicate username/email/
//! identity-document failures come back from the backend as 403
//! constraint violations and are translated into field errors rather
//! than surfaced as a generic failure.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use civica_client::{
    CreateUserRequest, Page, PortalClient, RegisterUserRequest, Taxpayer, UpdateUserRequest, User,
};
use civica_session::SessionStore;

use crate::error::{Error, Result};
use crate::fetch::FetchGuard;

/// Flow state, read by the user screens.
#[derive(Debug, Clone, Default)]
pub struct UsersState {
    /// Users on the current page.
    pub users: Vec<User>,
    /// Paging info for the current page.
    pub paginator: Option<Page<User>>,
    /// Field errors from the last write.
    pub field_errors: HashMap<String, String>,
}

/// User flows.
#[derive(Clone)]
pub struct UsersFlow {
    session: SessionStore,
    state: Arc<RwLock<UsersState>>,
}

impl UsersFlow {
    /// Create the flow over a session store.
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            state: Arc::new(RwLock::new(UsersState::default())),
        }
    }

    fn client(&self) -> PortalClient {
        self.session.client().clone()
    }

    /// Snapshot of the flow state.
    pub fn state(&self) -> UsersState {
        self.state.read().clone()
    }

    /// Load one page of users.
    pub async fn load_page(&self, guard: &FetchGuard, page: u32) -> Result<()> {
        match self.client().users().list_page(page).await {
            Ok(result) => {
                if guard.is_live() {
                    let mut state = self.state.write();
                    state.users = result.content.clone();
                    state.paginator = Some(result);
                }
                Ok(())
            }
            Err(err) => Err(self.auth_or(err)),
        }
    }

    /// Check an identity document against the taxpayer registry.
    ///
    /// Returns the registry record for prefilling the form. An unknown
    /// document records a field error and yields `Ok(None)`.
    pub async fn validate_taxpayer(&self, ci: &str) -> Result<Option<Taxpayer>> {
        if !self.client().taxpayers().exists(ci).await? {
            debug!(ci = %ci, "identity document not in taxpayer registry");
            self.state.write().field_errors.insert(
                "ci".to_string(),
                "identity document not found in taxpayer registry".to_string(),
            );
            return Ok(None);
        }
        let taxpayer = self.client().taxpayers().info(ci).await?;
        self.state.write().field_errors.remove("ci");
        Ok(Some(taxpayer))
    }

    /// Self-service signup.
    ///
    /// Validation failures (400) and duplicate-value failures (403 with a
    /// recognized constraint marker) land in
    /// [`UsersState::field_errors`] and yield `Ok(None)`; anything else
    /// propagates.
    pub async fn register(&self, request: &RegisterUserRequest) -> Result<Option<User>> {
        match self.client().users().register(request).await {
            Ok(user) => {
                self.state.write().field_errors.clear();
                Ok(Some(user))
            }
            Err(err) => self.absorb_write_failure(err),
        }
    }

    /// Create a user (admin-side).
    pub async fn save(&self, request: &CreateUserRequest) -> Result<Option<User>> {
        match self.client().users().create(request).await {
            Ok(user) => {
                let mut state = self.state.write();
                state.field_errors.clear();
                state.users.push(user.clone());
                Ok(Some(user))
            }
            Err(err) => self.absorb_write_failure(err),
        }
    }

    /// Update a user (admin-side).
    pub async fn update(&self, id: i64, request: &UpdateUserRequest) -> Result<Option<User>> {
        match self.client().users().update(id, request).await {
            Ok(user) => {
                let mut state = self.state.write();
                state.field_errors.clear();
                if let Some(slot) = state.users.iter_mut().find(|u| u.id == id) {
                    *slot = user.clone();
                }
                Ok(Some(user))
            }
            Err(err) => self.absorb_write_failure(err),
        }
    }

    /// Delete a user (admin-side).
    pub async fn remove(&self, id: i64) -> Result<()> {
        match self.client().users().delete(id).await {
            Ok(()) => {
                self.state.write().users.retain(|u| u.id != id);
                Ok(())
            }
            Err(err) => Err(self.auth_or(err)),
        }
    }

    fn absorb_write_failure(&self, err: civica_client::Error) -> Result<Option<User>> {
        match err {
            civica_client::Error::Validation { fields } => {
                self.state.write().field_errors = fields;
                Ok(None)
            }
            civica_client::Error::Forbidden { .. } => {
                let fields = err.constraint_violations();
                if fields.is_empty() {
                    Err(Error::Client(err))
                } else {
                    self.state.write().field_errors = fields;
                    Ok(None)
                }
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
