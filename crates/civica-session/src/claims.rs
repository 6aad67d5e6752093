//! Bearer-token claims decoding.
//!
//! The backend issues a three-part, dot-separated token whose middle part
//! is base64url-encoded JSON. Decoding happens locally so login needs no
//! second round-trip for the user's identity. The signature is not
//! verified here: the backend checks it on every request, the client only
//! reads the claims it embedded.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Claims embedded in the bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Standard subject claim, set to the username.
    pub sub: String,

    /// Numeric user ID.
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Whether the account has admin privileges.
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

/// Decode the claims of a bearer token.
///
/// Any malformation (wrong part count, bad base64, bad JSON, missing
/// claims) yields [`Error::MalformedToken`], never a panic. Padding on
/// the middle part is tolerated.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::MalformedToken(
            "expected three dot-separated parts".to_string(),
        ));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::MalformedToken(format!("payload is not base64url: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::MalformedToken(format!("payload is not a claims object: {}", e)))
}
