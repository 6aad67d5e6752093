//! The session store: single source of truth for authentication state.
//!
//! The store owns the persisted session keys and the client's token
//! handle. Every transition goes through one of the operations here;
//! readers get snapshots through accessors. Persisted layout:
//!
//! - `login`: JSON `{ isAuth, isAdmin, user }`
//! - `token`: the literal string `Bearer <token>`

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use civica_client::{Credentials, PortalClient};

use crate::claims::decode_claims;
use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// Storage key for the session blob.
pub const LOGIN_KEY: &str = "login";

/// Storage key for the raw Authorization value.
pub const TOKEN_KEY: &str = "token";

/// The authenticated identity of the current process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User ID from the token's `userId` claim.
    pub id: i64,
    /// Username from the token's `sub` claim.
    pub username: String,
}

/// Authentication state, as persisted and as handed to readers.
///
/// Invariant: `is_auth` is true iff a user (and, inside the store, a
/// token) is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Whether a user is logged in.
    pub is_auth: bool,
    /// Whether the logged-in user has admin privileges.
    pub is_admin: bool,
    /// The logged-in user, absent when unauthenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserIdentity>,
}

impl Session {
    /// The empty, unauthenticated session.
    pub fn unauthenticated() -> Self {
        Self {
            is_auth: false,
            is_admin: false,
            user: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

/// Password-reset flow status, consumed by the recovery UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResetStatus {
    /// A reset call is in flight.
    pub pending: bool,
    /// The reset completed; the UI redirects to login.
    pub succeeded: bool,
    /// Why the last reset call failed.
    pub error: Option<String>,
}

/// Inner state protected by the lock.
#[derive(Debug)]
struct SessionState {
    session: Session,
    /// Raw token (without the `Bearer ` prefix).
    token: Option<String>,
    /// True until hydration has run.
    loading: bool,
    reset: ResetStatus,
}

/// Single source of truth for authentication/authorization state.
///
/// Cloning is cheap; clones share state, storage and client.
#[derive(Clone)]
pub struct SessionStore {
    client: PortalClient,
    storage: Arc<dyn KeyValueStore>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    /// Create a store. The session starts in the loading state until
    /// [`hydrate`](Self::hydrate) has run.
    pub fn new(client: PortalClient, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client,
            storage,
            state: Arc::new(RwLock::new(SessionState {
                session: Session::unauthenticated(),
                token: None,
                loading: true,
                reset: ResetStatus::default(),
            })),
        }
    }

    /// The client this store arms tokens for.
    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state.read().session.clone()
    }

    /// Whether a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.state.read().session.is_auth
    }

    /// Whether the logged-in user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.state.read().session.is_admin
    }

    /// Whether hydration is still pending.
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// The raw bearer token, if authenticated.
    pub fn raw_token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    /// Snapshot of the password-reset status.
    pub fn reset_status(&self) -> ResetStatus {
        self.state.read().reset.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Restore a persisted session from durable storage.
    ///
    /// A well-formed session blob plus token re-arms the client; anything
    /// partial or unreadable is treated as absent and purged. Always
    /// clears the loading flag.
    pub fn hydrate(&self) -> Session {
        match self.load_persisted() {
            Some((session, raw_token, authorization)) => {
                if self.client.token().set(&authorization).is_err() {
                    warn!("persisted token is not a valid header value, discarding session");
                    self.clear_local();
                    return self.session();
                }
                let mut state = self.state.write();
                state.session = session;
                state.token = Some(raw_token);
                state.loading = false;
                info!(user = ?state.session.user, "session restored from storage");
                state.session.clone()
            }
            None => {
                self.clear_local();
                self.session()
            }
        }
    }

    fn load_persisted(&self) -> Option<(Session, String, String)> {
        let blob = match self.storage.get(LOGIN_KEY) {
            Ok(blob) => blob?,
            Err(e) => {
                warn!(error = %e, "failed to read persisted session");
                return None;
            }
        };
        let authorization = match self.storage.get(TOKEN_KEY) {
            Ok(authorization) => authorization?,
            Err(e) => {
                warn!(error = %e, "failed to read persisted token");
                return None;
            }
        };

        let session: Session = match serde_json::from_str(&blob) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "persisted session blob is unreadable");
                return None;
            }
        };
        let raw_token = authorization.strip_prefix("Bearer ")?.to_string();

        // Enforce the session invariant on whatever was on disk.
        if !session.is_auth || session.user.is_none() || raw_token.is_empty() {
            return None;
        }

        Some((session, raw_token, authorization))
    }

    /// Exchange credentials for a bearer token and enter the
    /// authenticated state.
    ///
    /// On a 401 the credentials were wrong; on a 403 the account lacks
    /// access; a token that fails to decode is a login failure too. All
    /// failures leave the session unauthenticated with nothing persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        self.state.write().loading = true;

        let response = match self.client.users().login(credentials).await {
            Ok(response) => response,
            Err(err) => {
                self.clear_local();
                return Err(match err {
                    civica_client::Error::Unauthorized { .. } => Error::Credentials,
                    civica_client::Error::Forbidden { message } => Error::Permission(message),
                    other => Error::Client(other),
                });
            }
        };

        let claims = match decode_claims(&response.token) {
            Ok(claims) => claims,
            Err(err) => {
                self.clear_local();
                return Err(err);
            }
        };

        let session = Session {
            is_auth: true,
            is_admin: claims.is_admin,
            user: Some(UserIdentity {
                id: claims.user_id,
                username: claims.sub,
            }),
        };
        let authorization = format!("Bearer {}", response.token);

        if let Err(err) = self.persist(&session, &authorization) {
            self.clear_local();
            return Err(err);
        }
        if let Err(err) = self.client.token().set(&authorization) {
            self.clear_local();
            return Err(Error::Client(err));
        }

        {
            let mut state = self.state.write();
            state.session = session.clone();
            state.token = Some(response.token);
            state.loading = false;
        }

        info!(username = %session.user.as_ref().map(|u| u.username.as_str()).unwrap_or(""),
              is_admin = session.is_admin, "login succeeded");
        Ok(session)
    }

    fn persist(&self, session: &Session, authorization: &str) -> Result<()> {
        let blob = serde_json::to_string(session)
            .map_err(|e| Error::Storage(format!("session blob: {}", e)))?;
        self.storage.put(LOGIN_KEY, &blob)?;
        self.storage.put(TOKEN_KEY, authorization)?;
        Ok(())
    }

    /// Clear the session unconditionally and erase persisted state.
    /// Idempotent.
    pub fn logout(&self) {
        self.clear_local();
        debug!("session cleared");
    }

    /// Force a logout when a resource call reports a 401.
    ///
    /// Returns true when the error was an authorization failure and the
    /// session has been cleared. The error itself stays with the caller.
    pub fn logout_if_unauthorized(&self, err: &civica_client::Error) -> bool {
        if err.is_unauthorized() {
            warn!("resource call rejected as unauthorized, clearing session");
            self.logout();
            true
        } else {
            false
        }
    }

    fn clear_local(&self) {
        self.client.token().clear();
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            warn!(error = %e, "failed to erase persisted token");
        }
        if let Err(e) = self.storage.remove(LOGIN_KEY) {
            warn!(error = %e, "failed to erase persisted session");
        }
        let mut state = self.state.write();
        state.session = Session::unauthenticated();
        state.token = None;
        state.loading = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Password reset
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask the backend to email a reset code.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.begin_reset();
        match self.client.password().request_reset(email).await {
            Ok(()) => {
                self.state.write().reset.pending = false;
                Ok(())
            }
            Err(err) => Err(self.fail_reset(err)),
        }
    }

    /// Confirm a reset with the emailed code.
    ///
    /// Success marks the `succeeded` flag for the UI redirect; failure
    /// records the reason. Authentication state is untouched either way.
    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<()> {
        self.begin_reset();
        match self.client.password().confirm_reset(code, new_password).await {
            Ok(()) => {
                let mut state = self.state.write();
                state.reset.pending = false;
                state.reset.succeeded = true;
                Ok(())
            }
            Err(err) => Err(self.fail_reset(err)),
        }
    }

    /// Reset the recovery-flow flags to neutral. Called when leaving the
    /// recovery screens.
    pub fn clear_reset_status(&self) {
        self.state.write().reset = ResetStatus::default();
    }

    fn begin_reset(&self) {
        self.state.write().reset = ResetStatus {
            pending: true,
            succeeded: false,
            error: None,
        };
    }

    fn fail_reset(&self, err: civica_client::Error) -> Error {
        let reason = err.to_string();
        let mut state = self.state.write();
        state.reset = ResetStatus {
            pending: false,
            succeeded: false,
            error: Some(reason.clone()),
        };
        Error::Reset(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store_with_memory() -> (SessionStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let client = PortalClient::builder()
            .base_url("http://localhost:9")
            .build()
            .unwrap();
        (SessionStore::new(client, storage.clone()), storage)
    }

    #[test]
    fn test_initial_state_is_loading_and_unauthenticated() {
        let (store, _) = store_with_memory();
        assert!(store.is_loading());
        assert_eq!(store.session(), Session::unauthenticated());
    }

    #[test]
    fn test_hydrate_with_empty_storage() {
        let (store, _) = store_with_memory();
        let session = store.hydrate();
        assert!(!store.is_loading());
        assert_eq!(session, Session::unauthenticated());
    }

    #[test]
    fn test_hydrate_restores_persisted_session() {
        let (store, storage) = store_with_memory();
        storage
            .put(
                LOGIN_KEY,
                "{\"isAuth\":true,\"isAdmin\":true,\"user\":{\"id\":1,\"username\":\"admin\"}}",
            )
            .unwrap();
        storage.put(TOKEN_KEY, "Bearer a.b.c").unwrap();

        let session = store.hydrate();
        assert!(session.is_auth);
        assert!(session.is_admin);
        assert_eq!(session.user.unwrap().username, "admin");
        assert_eq!(store.raw_token().as_deref(), Some("a.b.c"));
        assert!(store.client().token().is_armed());
    }

    #[test]
    fn test_hydrate_purges_partial_state() {
        let (store, storage) = store_with_memory();
        // Session blob without a token.
        storage
            .put(LOGIN_KEY, "{\"isAuth\":true,\"isAdmin\":false,\"user\":{\"id\":2,\"username\":\"x\"}}")
            .unwrap();

        let session = store.hydrate();
        assert!(!session.is_auth);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_hydrate_purges_unreadable_blob() {
        let (store, storage) = store_with_memory();
        storage.put(LOGIN_KEY, "not json").unwrap();
        storage.put(TOKEN_KEY, "Bearer t").unwrap();

        let session = store.hydrate();
        assert!(!session.is_auth);
        assert!(storage.is_empty());
        assert!(!store.client().token().is_armed());
    }

    #[test]
    fn test_hydrate_rejects_invariant_violation() {
        let (store, storage) = store_with_memory();
        // isAuth claimed without a user.
        storage
            .put(LOGIN_KEY, "{\"isAuth\":true,\"isAdmin\":false}")
            .unwrap();
        storage.put(TOKEN_KEY, "Bearer t").unwrap();

        assert!(!store.hydrate().is_auth);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let (store, storage) = store_with_memory();
        storage
            .put(LOGIN_KEY, "{\"isAuth\":true,\"isAdmin\":false,\"user\":{\"id\":1,\"username\":\"u\"}}")
            .unwrap();
        storage.put(TOKEN_KEY, "Bearer t").unwrap();
        store.hydrate();
        assert!(store.is_authenticated());

        store.logout();
        let after_first = store.session();
        store.logout();
        let after_second = store.session();

        assert_eq!(after_first, Session::unauthenticated());
        assert_eq!(after_first, after_second);
        assert!(storage.is_empty());
        assert!(!store.client().token().is_armed());
        assert_eq!(store.raw_token(), None);
    }

    #[test]
    fn test_logout_if_unauthorized_only_fires_on_401() {
        let (store, storage) = store_with_memory();
        storage
            .put(LOGIN_KEY, "{\"isAuth\":true,\"isAdmin\":false,\"user\":{\"id\":1,\"username\":\"u\"}}")
            .unwrap();
        storage.put(TOKEN_KEY, "Bearer t").unwrap();
        store.hydrate();

        let forbidden = civica_client::Error::Forbidden {
            message: "no".to_string(),
        };
        assert!(!store.logout_if_unauthorized(&forbidden));
        assert!(store.is_authenticated());

        let unauthorized = civica_client::Error::Unauthorized {
            message: "expired".to_string(),
        };
        assert!(store.logout_if_unauthorized(&unauthorized));
        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_clear_reset_status() {
        let (store, _) = store_with_memory();
        store.begin_reset();
        assert!(store.reset_status().pending);

        store.clear_reset_status();
        assert_eq!(store.reset_status(), ResetStatus::default());
    }
}
