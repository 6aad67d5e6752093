//! Taxpayer registry API.

use crate::client::PortalClient;
use crate::error::{Error, Result};
use crate::types::{Page, Taxpayer};

/// Taxpayers API client.
pub struct TaxpayersApi {
    client: PortalClient,
}

impl TaxpayersApi {
    pub(crate) fn new(client: PortalClient) -> Self {
        Self { client }
    }

    /// List one page of taxpayers.
    pub async fn list_page(&self, page: u32) -> Result<Page<Taxpayer>> {
        self.client.get(&format!("taxpayers/page/{}", page)).await
    }

    /// Create a taxpayer record.
    pub async fn create(&self, taxpayer: &Taxpayer) -> Result<Taxpayer> {
        self.client.post("taxpayers", taxpayer).await
    }

    /// Update a taxpayer record. The identity document goes in the path
    /// and is stripped from the body.
    pub async fn update(&self, taxpayer: &Taxpayer) -> Result<Taxpayer> {
        let ci = taxpayer
            .ci
            .as_deref()
            .ok_or_else(|| Error::Config("taxpayer update requires an identity document".to_string()))?;
        let mut body = taxpayer.clone();
        body.ci = None;
        self.client.put(&format!("taxpayers/{}", ci), &body).await
    }

    /// Check whether an identity document exists in the registry.
    pub async fn exists(&self, ci: &str) -> Result<bool> {
        self.client.get(&format!("taxpayers/check/{}", ci)).await
    }

    /// Full registry lookup by identity document.
    pub async fn info(&self, ci: &str) -> Result<Taxpayer> {
        self.client.get(&format!("taxpayers/{}", ci)).await
    }
}
