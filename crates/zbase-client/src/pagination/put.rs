//! Byte-bounded pages of a multi-put

use std::future::Future;

use zbase_core::wire::DataPair;

use crate::error::{ClientError, Result};

/// A write batch split into pages, computed up front
#[derive(Debug, Clone)]
pub struct PutPages {
    pages: Vec<Vec<DataPair>>,
    max_page_bytes: u64,
}

impl PutPages {
    /// Split `keys`/`values` into pages whose value bytes stay within `max_page_bytes`
    pub fn new(keys: Vec<String>, values: Vec<Vec<u8>>, max_page_bytes: u64) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(zbase_core::Error::DimensionMismatch {
                keys: keys.len(),
                values: values.len(),
            }
            .into());
        }
        let pairs = keys
            .into_iter()
            .zip(values)
            .map(|(key, value)| DataPair { key, value })
            .collect();
        Self::from_pairs(pairs, max_page_bytes)
    }

    pub fn from_pairs(pairs: Vec<DataPair>, max_page_bytes: u64) -> Result<Self> {
        let pages = pagify(pairs, max_page_bytes)?;
        Ok(Self {
            pages,
            max_page_bytes,
        })
    }

    pub fn pages(&self) -> &[Vec<DataPair>] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn max_page_bytes(&self) -> u64 {
        self.max_page_bytes
    }

    /// Push pages in order, stopping at the first failure
    ///
    /// Pages already pushed stay pushed. Returns the number of pages written.
    pub async fn put_all<F, Fut>(self, mut push: F) -> Result<usize>
    where
        F: FnMut(Vec<DataPair>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let total = self.pages.len();
        for (completed, page) in self.pages.into_iter().enumerate() {
            let items = page.len();
            if let Err(e) = push(page).await {
                tracing::warn!(completed, total, error = %e, "Paged write aborted");
                return Err(ClientError::PageFailed {
                    completed,
                    total,
                    source: Box::new(e),
                });
            }
            tracing::debug!(page = completed, total, items, "Pushed page");
        }
        Ok(total)
    }
}

/// Greedy split on value bytes
///
/// A value larger than the ceiling on its own can never be sent and fails
/// the whole batch.
fn pagify(pairs: Vec<DataPair>, max_page_bytes: u64) -> zbase_core::Result<Vec<Vec<DataPair>>> {
    let mut pages = Vec::new();
    let mut current = Vec::new();
    let mut current_bytes = 0u64;

    for (index, pair) in pairs.into_iter().enumerate() {
        let size = pair.value.len() as u64;
        if size > max_page_bytes {
            return Err(zbase_core::Error::ItemTooLarge {
                index,
                size,
                max: max_page_bytes,
            });
        }
        if current_bytes + size > max_page_bytes {
            pages.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current.push(pair);
        current_bytes += size;
    }
    if !current.is_empty() {
        pages.push(current);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(sizes: &[usize]) -> (Vec<String>, Vec<Vec<u8>>) {
        let keys = (0..sizes.len()).map(|i| format!("k{}", i)).collect();
        let values = sizes.iter().map(|n| vec![0u8; *n]).collect();
        (keys, values)
    }

    fn page_bytes(page: &[DataPair]) -> u64 {
        page.iter().map(|p| p.value.len() as u64).sum()
    }

    #[test]
    fn test_pages_respect_ceiling() {
        let (keys, values) = sized(&[40, 40, 40, 10, 90, 100, 1, 0]);
        let pages = PutPages::new(keys, values, 100).unwrap();

        let sizes: Vec<Vec<usize>> = pages
            .pages()
            .iter()
            .map(|p| p.iter().map(|d| d.value.len()).collect())
            .collect();
        assert_eq!(
            sizes,
            vec![vec![40, 40], vec![40, 10], vec![90], vec![100], vec![1, 0]]
        );
        assert!(pages.pages().iter().all(|p| page_bytes(p) <= 100));
        assert!(pages.pages().iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_order_preserved() {
        let (keys, values) = sized(&[30; 10]);
        let pages = PutPages::new(keys.clone(), values, 60).unwrap();
        let flat: Vec<String> = pages
            .pages()
            .iter()
            .flatten()
            .map(|p| p.key.clone())
            .collect();
        assert_eq!(flat, keys);
        assert_eq!(pages.len(), 5);
    }

    #[test]
    fn test_item_too_large() {
        let (keys, values) = sized(&[10, 101, 10]);
        let err = PutPages::new(keys, values, 100).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(zbase_core::Error::ItemTooLarge {
                index: 1,
                size: 101,
                max: 100
            })
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = PutPages::new(vec!["a".into()], vec![], 100).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(zbase_core::Error::DimensionMismatch { keys: 1, values: 0 })
        ));
    }

    #[test]
    fn test_empty_batch() {
        let pages = PutPages::new(vec![], vec![], 100).unwrap();
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn test_put_all_pushes_in_order() {
        let (keys, values) = sized(&[50; 6]);
        let pages = PutPages::new(keys, values, 100).unwrap();

        let mut pushed = Vec::new();
        let written = pages
            .put_all(|page| {
                pushed.push(page.iter().map(|p| p.key.clone()).collect::<Vec<_>>());
                async { Ok(()) }
            })
            .await
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(pushed[0], vec!["k0", "k1"]);
        assert_eq!(pushed[2], vec!["k4", "k5"]);
    }

    #[tokio::test]
    async fn test_put_all_stops_at_first_failure() {
        let (keys, values) = sized(&[50; 8]);
        let pages = PutPages::new(keys, values, 100).unwrap();

        let mut attempts = 0;
        let err = pages
            .put_all(|_| {
                attempts += 1;
                let fail = attempts == 3;
                async move {
                    if fail {
                        Err(ClientError::Remote {
                            code: 0,
                            message: "TableNotFound".into(),
                        })
                    } else {
                        Ok(())
                    }
                }
            })
            .await
            .unwrap_err();

        assert_eq!(attempts, 3);
        match err {
            ClientError::PageFailed {
                completed,
                total,
                source,
            } => {
                assert_eq!(completed, 2);
                assert_eq!(total, 4);
                assert!(matches!(*source, ClientError::Remote { .. }));
            }
            other => panic!("expected PageFailed, got {:?}", other),
        }
    }
}
