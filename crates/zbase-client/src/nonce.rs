//! Strictly increasing request nonces
//!
//! One actor thread owns the counter. Callers send it a reply channel and
//! wait; requests are served in arrival order, so every value is unique and
//! larger than everything issued before it.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, oneshot};

use crate::error::{ClientError, Result};

/// Handle to the nonce actor; clones share one counter
#[derive(Debug, Clone)]
pub struct NonceMaker {
    requests: mpsc::UnboundedSender<oneshot::Sender<i64>>,
}

impl NonceMaker {
    /// Counter seeded from the wall clock in nanoseconds
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or_default();
        Self::starting_at(seed)
    }

    /// Counter whose first issued value is `start + 1`
    pub fn starting_at(start: i64) -> Self {
        let (requests, mut inbox) = mpsc::unbounded_channel::<oneshot::Sender<i64>>();

        // Exits once every handle is dropped
        std::thread::spawn(move || {
            let mut counter = start;
            while let Some(reply) = inbox.blocking_recv() {
                counter += 1;
                let _ = reply.send(counter);
            }
        });

        Self { requests }
    }

    pub async fn get(&self) -> Result<i64> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(reply)
            .map_err(|_| ClientError::NonceClosed)?;
        response.await.map_err(|_| ClientError::NonceClosed)
    }

    /// Blocking form of [`get`](Self::get); must not be called from an async context
    pub fn get_blocking(&self) -> Result<i64> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(reply)
            .map_err(|_| ClientError::NonceClosed)?;
        response.blocking_recv().map_err(|_| ClientError::NonceClosed)
    }
}

impl Default for NonceMaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sequential_values_increase() {
        let nonces = NonceMaker::starting_at(10);
        assert_eq!(nonces.get().await.unwrap(), 11);
        assert_eq!(nonces.get().await.unwrap(), 12);
        assert_eq!(nonces.clone().get().await.unwrap(), 13);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_get_contiguous_run() {
        const CALLERS: usize = 8;
        const PER_CALLER: usize = 250;

        let start = 1_000;
        let nonces = NonceMaker::starting_at(start);

        let mut tasks = Vec::new();
        for _ in 0..CALLERS {
            let nonces = nonces.clone();
            tasks.push(tokio::spawn(async move {
                let mut seen = Vec::with_capacity(PER_CALLER);
                for _ in 0..PER_CALLER {
                    seen.push(nonces.get().await.unwrap());
                }
                seen
            }));
        }

        let mut all = Vec::new();
        for task in tasks {
            let seen = task.await.unwrap();
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
            all.extend(seen);
        }

        all.sort_unstable();
        let expected: Vec<i64> = (start + 1..=start + (CALLERS * PER_CALLER) as i64).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_blocking_threads() {
        let nonces = NonceMaker::starting_at(0);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let nonces = nonces.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| nonces.get_blocking().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (1..=200).collect::<Vec<i64>>());
    }

    #[test]
    fn test_clock_seed_is_recent() {
        let nonces = NonceMaker::new();
        let first = nonces.get_blocking().unwrap();
        assert!(first > 1_600_000_000_000_000_000);
    }
}
