//! Password reset API.

use crate::client::PortalClient;
use crate::error::Result;
use crate::types::{PasswordResetConfirm, PasswordResetRequest};

/// Password reset API client.
pub struct PasswordApi {
    client: PortalClient,
}

impl PasswordApi {
    pub(crate) fn new(client: PortalClient) -> Self {
        Self { client }
    }

    /// Request a reset code for the given account email.
    pub async fn request_reset(&self, email: &str) -> Result<()> {
        let request = PasswordResetRequest {
            email: email.to_string(),
        };
        self.client.post_unit("password/request", &request).await
    }

    /// Confirm a reset with the emailed code and a new password.
    pub async fn confirm_reset(&self, code: &str, new_password: &str) -> Result<()> {
        let request = PasswordResetConfirm {
            code: code.to_string(),
            new_password: new_password.to_string(),
        };
        self.client.post_unit("password/confirm", &request).await
    }
}
