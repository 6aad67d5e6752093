//! Application flows for the CIVICA portal.
//!
//! This crate is the boundary where errors become state: each flow
//! decides whether a failure is terminal (rethrown for a generic
//! notification), absorbed into field errors (validation and duplicate
//! values), or a session-invalidation signal (401 → forced logout,
//! surfaced as [`Error::SessionExpired`] so the caller redirects without
//! a modal). Flows share one [`AppContext`] holding the session store
//! and the TTL cache, and guard every completion side effect with a
//! [`FetchScope`] so navigating away cancels pending state mutations.
//!
//! # Example
//!
//! ```no_run
//! use civica_app::{AppConfig, AppContext, FetchScope};
//!
//! # async fn example() -> civica_app::Result<()> {
//! let context = AppContext::new(&AppConfig::from_env()?)?;
//! context.session().hydrate();
//!
//! let scope = FetchScope::new();
//! let terms = context.terms();
//! let latest = terms.latest(&scope.guard()).await?;
//! println!("terms v{}", latest.version);
//!
//! // Leaving the screen: pending fetches may finish, but their state
//! // mutations are dropped.
//! scope.invalidate();
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod credit_titles;
mod error;
mod fetch;
mod terms;
mod users;

pub use config::{AppConfig, DATA_DIR_ENV};
pub use context::AppContext;
pub use credit_titles::{CreditTitlesFlow, CreditTitlesState};
pub use error::{Error, Result};
pub use fetch::{FetchGuard, FetchScope};
pub use terms::{
    LATEST_TERMS_KEY, LATEST_TERMS_TTL, TermsFlow, TermsState, USER_TERMS_STATUS_TTL,
    user_terms_status_key,
};
pub use users::{UsersFlow, UsersState};
