//! Credit titles API.

use crate::client::PortalClient;
use crate::error::Result;
use crate::types::{CreditTitle, Page};

/// Credit titles API client.
pub struct CreditTitlesApi {
    client: PortalClient,
}

impl CreditTitlesApi {
    pub(crate) fn new(client: PortalClient) -> Self {
        Self { client }
    }

    /// Get a credit title by ID.
    pub async fn get(&self, id: i64) -> Result<CreditTitle> {
        self.client.get(&format!("credit-titles/{}", id)).await
    }

    /// List one page of credit titles.
    pub async fn page(&self, page: u32) -> Result<Page<CreditTitle>> {
        self.client
            .get(&format!("credit-titles/page/{}", page))
            .await
    }
}
