//! HTTP client SDK for the CIVICA municipal portal backend.
//!
//! This crate provides a typed async client for the portal's REST
//! resource groups. Each group lives at `/api/v1/<group>` and shares one
//! transport that attaches the bearer token from a [`TokenHandle`] to
//! every request; the handle is armed and disarmed by the session layer,
//! so a forced logout takes effect on the next call.
//!
//! # Example
//!
//! ```no_run
//! use civica_client::PortalClient;
//!
//! # async fn example() -> civica_client::Result<()> {
//! let client = PortalClient::builder()
//!     .base_url("http://localhost:8080")
//!     .build()?;
//!
//! // Public read, no token needed
//! let titles = client.credit_titles().page(0).await?;
//! println!("{} titles due", titles.total_elements);
//!
//! // Authenticated read; fails with Error::Unauthorized until the
//! // session layer arms the token handle.
//! let users = client.users().list_page(0).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Failure handling
//!
//! Non-2xx responses are normalized into the [`Error`] taxonomy: 401 is
//! [`Error::Unauthorized`] (a session-invalidation signal outside of
//! login), 403 is [`Error::Forbidden`] (with
//! [`constraint_violations`](Error::constraint_violations) for duplicate
//! username/email/identity-document translation), 400 with a field map is
//! [`Error::Validation`], and everything else keeps its structured
//! payload in [`Error::Api`]. The client never swallows an error.

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{BASE_URL_ENV, ClientBuilder, PortalClient, TokenHandle};
pub use error::{Error, Result};
pub use types::*;
