//! Terms-of-service API.

use crate::client::PortalClient;
use crate::error::Result;
use crate::types::{RecordInteractionRequest, Term, TermRequest, TermsInteraction};

/// Terms API client.
pub struct TermsApi {
    client: PortalClient,
}

impl TermsApi {
    pub(crate) fn new(client: PortalClient) -> Self {
        Self { client }
    }

    /// List all terms documents.
    pub async fn list(&self) -> Result<Vec<Term>> {
        self.client.get("terms").await
    }

    /// Get the latest effective terms document.
    pub async fn latest(&self) -> Result<Term> {
        self.client.get("terms/latest").await
    }

    /// Create a terms document.
    pub async fn create(&self, request: &TermRequest) -> Result<Term> {
        self.client.post("terms", request).await
    }

    /// Update a terms document.
    pub async fn update(&self, id: i64, request: &TermRequest) -> Result<Term> {
        self.client.put(&format!("terms/{}", id), request).await
    }

    /// Delete a terms document.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("terms/{}", id)).await
    }

    /// Check whether a user has accepted the current terms.
    pub async fn user_status(&self, user_id: i64) -> Result<bool> {
        self.client.get(&format!("terms/status/{}", user_id)).await
    }

    /// Record a user's accept/decline interaction.
    pub async fn record_interaction(
        &self,
        user_id: i64,
        accepted: bool,
    ) -> Result<TermsInteraction> {
        let request = RecordInteractionRequest { user_id, accepted };
        self.client.post("terms/record", &request).await
    }
}
