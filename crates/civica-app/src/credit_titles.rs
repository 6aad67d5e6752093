//! Credit title flows.
//!
//! Public reads: no token is required and no auth handling applies;
//! failures propagate for the caller's generic notification.

use std::sync::Arc;

use parking_lot::RwLock;

use civica_client::{CreditTitle, Page, PortalClient};
use civica_session::SessionStore;

use crate::error::Result;
use crate::fetch::FetchGuard;

/// Flow state, read by the credit title screens.
#[derive(Debug, Clone, Default)]
pub struct CreditTitlesState {
    /// Titles on the current page.
    pub titles: Vec<CreditTitle>,
    /// Paging info for the current page.
    pub paginator: Option<Page<CreditTitle>>,
    /// The title opened for payment, if any.
    pub selected: Option<CreditTitle>,
}

/// Credit title flows.
#[derive(Clone)]
pub struct CreditTitlesFlow {
    session: SessionStore,
    state: Arc<RwLock<CreditTitlesState>>,
}

impl CreditTitlesFlow {
    /// Create the flow over a session store.
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            state: Arc::new(RwLock::new(CreditTitlesState::default())),
        }
    }

    fn client(&self) -> PortalClient {
        self.session.client().clone()
    }

    /// Snapshot of the flow state.
    pub fn state(&self) -> CreditTitlesState {
        self.state.read().clone()
    }

    /// Load one page of credit titles.
    pub async fn load_page(&self, guard: &FetchGuard, page: u32) -> Result<()> {
        let result = self.client().credit_titles().page(page).await?;
        if guard.is_live() {
            let mut state = self.state.write();
            state.titles = result.content.clone();
            state.paginator = Some(result);
        }
        Ok(())
    }

    /// Open one credit title.
    pub async fn open(&self, guard: &FetchGuard, id: i64) -> Result<CreditTitle> {
        let title = self.client().credit_titles().get(id).await?;
        if guard.is_live() {
            self.state.write().selected = Some(title.clone());
        }
        Ok(title)
    }
}
