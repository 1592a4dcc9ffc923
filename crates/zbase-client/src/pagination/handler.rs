//! Cursor over one paginated read

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::Mutex;

use super::{Page, PageData};
use crate::error::{ClientError, Result};

/// Fetches page `n` of one logical read
pub type Requester = Arc<dyn Fn(u64) -> BoxFuture<'static, Result<Page>> + Send + Sync>;

struct CursorState {
    data: PageData,
    page: u64,
    has_next_page: bool,
    /// Page index and message of the fetch that failed
    failure: Option<(u64, String)>,
}

/// Lazily walks the pages of one read
///
/// Construction fetches page 0. A failed fetch is kept: the cursor stops
/// advancing and [`data`](Self::data) and [`keys`](Self::keys) report it.
pub struct PaginationHandler {
    requester: Requester,
    state: Mutex<CursorState>,
}

impl PaginationHandler {
    pub async fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn(u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Page>> + Send + 'static,
    {
        let requester: Requester = Arc::new(move |page: u64| fetch(page).boxed());
        Self::with_requester(requester).await
    }

    pub async fn with_requester(requester: Requester) -> Self {
        let handler = Self {
            requester,
            state: Mutex::new(CursorState {
                data: PageData::new(),
                page: 0,
                has_next_page: false,
                failure: None,
            }),
        };

        {
            let mut state = handler.state.lock().await;
            match (handler.requester)(0).await {
                Ok(page) => {
                    state.has_next_page = page.has_next_page;
                    state.data = page.data;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "First page fetch failed");
                    state.failure = Some((0, e.to_string()));
                }
            }
        }
        handler
    }

    /// Advance to the next page, replacing the cached data
    ///
    /// No-op once the last page has been seen or a fetch has failed.
    pub async fn next(&self) {
        let mut state = self.state.lock().await;
        if !state.has_next_page {
            return;
        }

        state.page += 1;
        let page = state.page;
        match (self.requester)(page).await {
            Ok(fetched) => {
                tracing::debug!(page, items = fetched.data.len(), "Fetched page");
                state.data = fetched.data;
                state.has_next_page = fetched.has_next_page;
            }
            Err(e) => {
                tracing::debug!(page, error = %e, "Page fetch failed");
                state.failure = Some((page, e.to_string()));
                state.has_next_page = false;
            }
        }
    }

    /// Data of the current page
    pub async fn data(&self) -> Result<PageData> {
        let state = self.state.lock().await;
        check(&state)?;
        Ok(state.data.clone())
    }

    /// Keys of the current page
    pub async fn keys(&self) -> Result<Vec<String>> {
        let state = self.state.lock().await;
        check(&state)?;
        Ok(state.data.keys().cloned().collect())
    }

    /// Fetch every remaining page and merge it into the current data
    ///
    /// Later pages overwrite duplicate keys. Stops at the last page or at the
    /// first empty page. Calling it again returns the same data without
    /// fetching.
    pub async fn data_all(&self) -> Result<PageData> {
        let mut state = self.state.lock().await;
        check(&state)?;

        while state.has_next_page {
            let page = state.page + 1;
            let fetched = match (self.requester)(page).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    state.failure = Some((page, e.to_string()));
                    state.has_next_page = false;
                    return Err(e);
                }
            };

            state.page = page;
            state.has_next_page = fetched.has_next_page;
            let empty = fetched.data.is_empty();
            tracing::debug!(page, items = fetched.data.len(), "Fetched page");
            state.data.extend(fetched.data);

            if empty {
                break;
            }
        }
        state.has_next_page = false;

        Ok(state.data.clone())
    }

    pub async fn keys_all(&self) -> Result<Vec<String>> {
        let data = self.data_all().await?;
        Ok(data.into_keys().collect())
    }

    pub async fn has_next_page(&self) -> bool {
        self.state.lock().await.has_next_page
    }

    /// Index of the page currently cached
    pub async fn page_index(&self) -> u64 {
        self.state.lock().await.page
    }
}

fn check(state: &CursorState) -> Result<()> {
    match &state.failure {
        Some((page, message)) => Err(ClientError::PageFetch {
            page: *page,
            message: message.clone(),
        }),
        None => Ok(()),
    }
}
