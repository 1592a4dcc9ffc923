//! Reads of a key list, split into groups of keys

use std::sync::Arc;

use futures_util::future::BoxFuture;
use zbase_core::TableScope;

use super::{Page, PageData, PaginationHandler, Requester};
use crate::error::Result;

/// Fetches page `n` of the given keys of a table
pub type GroupFetch =
    Arc<dyn Fn(TableScope, Vec<String>, u64) -> BoxFuture<'static, Result<Page>> + Send + Sync>;

/// A paged read of many keys
///
/// Keys are partitioned up front into groups of
/// `max(1, max_page_bytes / max_item_bytes)`. Each group is read through its
/// own [`PaginationHandler`], created when the cursor first reaches it.
pub struct GetPages {
    scope: TableScope,
    groups: Vec<Vec<String>>,
    handlers: Vec<PaginationHandler>,
    current: usize,
    fetch: GroupFetch,
}

impl GetPages {
    /// Partition `keys` and load the first page of the first group
    pub async fn new(
        keys: Vec<String>,
        max_item_bytes: u64,
        max_page_bytes: u64,
        scope: TableScope,
        fetch: GroupFetch,
    ) -> Self {
        let per_group = items_per_group(max_item_bytes, max_page_bytes);
        let groups: Vec<Vec<String>> = keys.chunks(per_group).map(<[String]>::to_vec).collect();
        tracing::debug!(
            keys = keys.len(),
            groups = groups.len(),
            per_group,
            table = %scope.table_id,
            "Paged read"
        );

        let mut pages = Self {
            scope,
            groups,
            handlers: Vec::new(),
            current: 0,
            fetch,
        };
        pages.ensure_handler(0).await;
        pages
    }

    pub fn scope(&self) -> &TableScope {
        &self.scope
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Index of the group the cursor is in
    pub fn current_group(&self) -> usize {
        self.current
    }

    /// Data of the current page of the current group
    pub async fn data(&self) -> Result<PageData> {
        match self.handlers.get(self.current) {
            Some(handler) => handler.data().await,
            None => Ok(PageData::new()),
        }
    }

    pub async fn keys(&self) -> Result<Vec<String>> {
        match self.handlers.get(self.current) {
            Some(handler) => handler.keys().await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn has_next_page(&self) -> bool {
        if self.current + 1 < self.groups.len() {
            return true;
        }
        match self.handlers.get(self.current) {
            Some(handler) => handler.has_next_page().await,
            None => false,
        }
    }

    /// Advance within the current group, or move to the next group once it is exhausted
    pub async fn next(&mut self) {
        if let Some(handler) = self.handlers.get(self.current) {
            if handler.has_next_page().await {
                handler.next().await;
                return;
            }
        }
        if self.current + 1 < self.groups.len() {
            self.current += 1;
            self.ensure_handler(self.current).await;
        }
    }

    /// Drain every group and merge the results
    pub async fn data_all(&mut self) -> Result<PageData> {
        let mut all = PageData::new();
        for index in 0..self.groups.len() {
            self.ensure_handler(index).await;
            self.current = index;
            let data = self.handlers[index].data_all().await?;
            all.extend(data);
        }
        Ok(all)
    }

    pub async fn keys_all(&mut self) -> Result<Vec<String>> {
        Ok(self.data_all().await?.into_keys().collect())
    }

    /// Create handlers up to and including `index`
    async fn ensure_handler(&mut self, index: usize) {
        while self.handlers.len() <= index && self.handlers.len() < self.groups.len() {
            let keys = self.groups[self.handlers.len()].clone();
            let fetch = self.fetch.clone();
            let scope = self.scope.clone();
            let requester: Requester =
                Arc::new(move |page: u64| fetch(scope.clone(), keys.clone(), page));
            self.handlers
                .push(PaginationHandler::with_requester(requester).await);
        }
    }
}

fn items_per_group(max_item_bytes: u64, max_page_bytes: u64) -> usize {
    (max_page_bytes / max_item_bytes.max(1)).max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::Mutex;

    /// Serves each requested key as its own value, `per_page` keys per page
    fn serving(per_page: usize, log: Arc<Mutex<Vec<(Vec<String>, u64)>>>) -> GroupFetch {
        Arc::new(move |_scope: TableScope, keys: Vec<String>, page: u64| {
            log.lock().unwrap().push((keys.clone(), page));
            let start = page as usize * per_page;
            let end = (start + per_page).min(keys.len());
            let data = keys
                .get(start..end)
                .unwrap_or(&[])
                .iter()
                .map(|k| (k.clone(), k.as_bytes().to_vec()))
                .collect();
            async move {
                Ok(Page {
                    data,
                    has_next_page: end < keys.len(),
                })
            }
            .boxed()
        })
    }

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("key{:02}", i)).collect()
    }

    #[test]
    fn test_group_size() {
        assert_eq!(items_per_group(1000, 2_000_000), 2000);
        assert_eq!(items_per_group(300, 1000), 3);
        assert_eq!(items_per_group(5000, 1000), 1);
        assert_eq!(items_per_group(0, 10), 10);
    }

    #[tokio::test]
    async fn test_partitions_and_loads_first_group_only() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pages = GetPages::new(
            keys(7),
            100,
            300,
            TableScope::new("o", "t"),
            serving(10, log.clone()),
        )
        .await;

        assert_eq!(pages.group_count(), 3);
        let calls = log.lock().unwrap().clone();
        assert_eq!(calls, vec![(keys(3), 0)]);
        assert_eq!(pages.keys().await.unwrap(), keys(3));
        assert!(pages.has_next_page().await);
    }

    #[tokio::test]
    async fn test_data_all_merges_groups() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pages = GetPages::new(
            keys(7),
            100,
            300,
            TableScope::new("o", "t"),
            serving(2, log.clone()),
        )
        .await;

        let all = pages.data_all().await.unwrap();
        assert_eq!(all.keys().cloned().collect::<Vec<_>>(), keys(7));
        assert_eq!(all["key04"], b"key04".to_vec());
        assert!(!pages.has_next_page().await);

        let calls = log.lock().unwrap().len();
        let again = pages.keys_all().await.unwrap();
        assert_eq!(again, keys(7));
        assert_eq!(log.lock().unwrap().len(), calls);
    }

    #[tokio::test]
    async fn test_next_walks_pages_then_groups() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pages = GetPages::new(
            keys(5),
            100,
            300,
            TableScope::new("o", "t"),
            serving(2, log),
        )
        .await;

        let mut seen = Vec::new();
        loop {
            seen.extend(pages.keys().await.unwrap());
            if !pages.has_next_page().await {
                break;
            }
            pages.next().await;
        }

        assert_eq!(seen, keys(5));
        assert_eq!(pages.current_group(), 1);
    }

    #[tokio::test]
    async fn test_no_keys() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pages = GetPages::new(
            Vec::new(),
            100,
            300,
            TableScope::new("o", "t"),
            serving(2, log.clone()),
        )
        .await;

        assert_eq!(pages.group_count(), 0);
        assert!(pages.data().await.unwrap().is_empty());
        assert!(!pages.has_next_page().await);
        assert!(pages.data_all().await.unwrap().is_empty());
        assert!(log.lock().unwrap().is_empty());
    }
}
