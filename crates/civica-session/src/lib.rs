//! Session and caching layer for the CIVICA portal client.
//!
//! This crate owns the authenticated state of the process and the durable
//! storage behind it:
//!
//! - [`SessionStore`]: the single source of truth for login state,
//!   persisting `{ isAuth, isAdmin, user }` plus the raw bearer token
//!   across restarts and arming the HTTP client's token handle.
//! - [`decode_claims`]: local decoding of the token's embedded claims
//!   (user id, username, admin flag), so login needs no second
//!   round-trip.
//! - [`TtlCache`]: expiring key/value cache in front of read-mostly
//!   endpoints.
//! - [`KeyValueStore`]: the durable backend trait, with file-backed and
//!   in-memory implementations.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use civica_client::{Credentials, PortalClient};
//! use civica_session::{FileStore, SessionStore};
//!
//! # async fn example() -> civica_session::Result<()> {
//! let client = PortalClient::builder()
//!     .base_url("http://localhost:8080")
//!     .build()?;
//! let store = SessionStore::new(client, Arc::new(FileStore::new("/tmp/civica")));
//!
//! // Restore a previous session, if any survived the restart.
//! let session = store.hydrate();
//! if !session.is_auth {
//!     store
//!         .login(&Credentials {
//!             username: "admin".to_string(),
//!             password: "secret".to_string(),
//!         })
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod claims;
mod error;
mod session;
mod storage;

pub use cache::TtlCache;
pub use claims::{TokenClaims, decode_claims};
pub use error::{Error, Result};
pub use session::{LOGIN_KEY, ResetStatus, Session, SessionStore, TOKEN_KEY, UserIdentity};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
