//! Request and response types for the portal API.
//!
//! These types mirror the backend's API contract. Wire names are
//! camelCase throughout.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

/// One page of a paged listing, as the backend serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// Zero-based page number.
    pub number: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of items across all pages.
    pub total_elements: u64,
    /// Whether this is the first page.
    pub first: bool,
    /// Whether this is the last page.
    pub last: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Plaintext password (sent over TLS only).
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token with embedded claims.
    pub token: String,
}

/// A portal user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: i64,
    /// Account username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Whether the account has admin privileges.
    #[serde(default)]
    pub admin: bool,
}

/// Request to create a user (admin-side).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Account username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Grant admin privileges.
    pub admin: bool,
}

/// Request to update a user. The password is managed by the backend and
/// is not part of this payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    /// Account username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Grant admin privileges.
    pub admin: bool,
}

/// Request for self-service signup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    /// Account username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Grant admin privileges (always false for self-service).
    pub admin: bool,
    /// Whether the current terms of service were accepted.
    pub accepted_terms: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Terms of service
// ─────────────────────────────────────────────────────────────────────────────

/// A published terms-of-service document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    /// Term ID.
    pub id: i64,
    /// Version label.
    pub version: String,
    /// Full document text.
    pub content: String,
    /// Date the version takes effect (ISO 8601).
    pub effective_date: String,
}

/// Request to create or update a terms document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRequest {
    /// Version label.
    pub version: String,
    /// Full document text.
    pub content: String,
    /// Date the version takes effect (ISO 8601).
    pub effective_date: String,
}

/// Request to record a user's accept/decline interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInteractionRequest {
    /// The user the interaction belongs to.
    pub user_id: i64,
    /// Whether the terms were accepted.
    pub accepted: bool,
}

/// A recorded terms interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsInteraction {
    /// The user the interaction belongs to.
    pub user_id: i64,
    /// Whether the terms were accepted.
    pub accepted: bool,
    /// When the interaction was recorded (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Taxpayers
// ─────────────────────────────────────────────────────────────────────────────

/// A taxpayer registry record.
///
/// The registry carries a fixed core plus backend-specific extra columns;
/// unknown fields are kept in `extra` so round-trips don't drop them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxpayer {
    /// Natural (0) or legal (1) person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_person: Option<i32>,
    /// Identity document number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<String>,
    /// Full legal name.
    pub full_name: String,
    /// Registered address.
    pub address: String,
    /// Contact phone.
    pub phone: String,
    /// City of fiscal residence.
    pub taxpayer_city: String,
    /// House number at the registered address.
    pub house_number: String,
    /// Birth date (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    /// Registered disability percentage.
    #[serde(default)]
    pub disability_percentage: i32,
    /// Marital status code.
    #[serde(default)]
    pub marital_status: i32,
    /// Backend-specific extra columns.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Credit titles
// ─────────────────────────────────────────────────────────────────────────────

/// A municipal tax/fee obligation available for payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTitle {
    /// Title code.
    pub code: i64,
    /// Emission date (ISO 8601).
    pub date: String,
    /// Obligation concept.
    pub concept: String,
    /// External reference.
    pub reference: String,
    /// Base value owed.
    pub value: f64,
    /// Accrued interest.
    pub interest: f64,
    /// Surcharges applied.
    pub surcharges: f64,
    /// Total due.
    pub total_to_pay: f64,
    /// Issued invoice number, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<i64>,
    /// Backend-specific extra columns (payment breakdown, collector, notes).
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Password reset
// ─────────────────────────────────────────────────────────────────────────────

/// Request to start a password reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    /// Account email to send the reset code to.
    pub email: String,
}

/// Request to confirm a password reset with the emailed code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirm {
    /// The emailed reset code.
    pub code: String,
    /// The new password.
    pub new_password: String,
}
