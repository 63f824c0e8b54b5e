//! Shared latest-result store

use crate::models::CheckResult;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Thread-safe map from service name to its latest check result.
///
/// The lock is only held while the map is mutated or copied; network I/O
/// always happens before [`ResultStore::upsert`] is called.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: RwLock<HashMap<String, CheckResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `result.service_name`
    pub async fn upsert(&self, result: CheckResult) {
        let mut results = self.results.write().await;
        debug!("Storing {} result for {}", result.status, result.service_name);
        results.insert(result.service_name.clone(), result);
    }

    /// Copy of every current entry keyed by service name
    pub async fn snapshot_map(&self) -> HashMap<String, CheckResult> {
        self.results.read().await.clone()
    }

    /// Copy of every current entry, in no particular order
    pub async fn snapshot_list(&self) -> Vec<CheckResult> {
        self.results.read().await.values().cloned().collect()
    }

    pub async fn get(&self, service_name: &str) -> Option<CheckResult> {
        self.results.read().await.get(service_name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckStatus, ServiceSpec};
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_upsert_replaces_entry() {
        let store = ResultStore::new();
        let spec = ServiceSpec::new("api", "http://localhost/");

        store.upsert(CheckResult::pending(&spec)).await;
        store
            .upsert(CheckResult::from_response(
                &spec,
                Utc::now(),
                200,
                Duration::from_millis(5),
            ))
            .await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("api").await.unwrap().status, CheckStatus::Up);
    }

    #[tokio::test]
    async fn test_snapshots_are_copies() {
        let store = ResultStore::new();
        let spec = ServiceSpec::new("api", "http://localhost/");
        store.upsert(CheckResult::pending(&spec)).await;

        let mut snapshot = store.snapshot_map().await;
        snapshot.get_mut("api").unwrap().status = CheckStatus::Down;
        let mut list = store.snapshot_list().await;
        list[0].message = "changed".to_string();

        let fresh = store.get("api").await.unwrap();
        assert_eq!(fresh.status, CheckStatus::Unknown);
        assert_ne!(fresh.message, "changed");
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = ResultStore::new();
        assert!(store.is_empty().await);
        assert!(store.snapshot_list().await.is_empty());
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_and_readers() {
        let store = Arc::new(ResultStore::new());
        let mut handles = Vec::new();

        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let spec = ServiceSpec::new(format!("svc-{}", i), "http://localhost/");
                for _ in 0..50 {
                    store.upsert(CheckResult::pending(&spec)).await;
                    let snapshot = store.snapshot_map().await;
                    assert!(snapshot.contains_key(&spec.name));
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 8);
    }
}
