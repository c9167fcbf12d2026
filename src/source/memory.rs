//! In-memory content source used by tests

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{ContentSource, FetchError};

#[derive(Default)]
pub struct MemorySource {
    tree: Vec<u8>,
    documents: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new(tree: &str) -> Self {
        Self {
            tree: tree.as_bytes().to_vec(),
            ..Default::default()
        }
    }

    /// Tree listing with one blob per path
    pub fn with_paths(paths: &[&str]) -> Self {
        let tree = paths
            .iter()
            .map(|p| serde_json::json!({ "path": p, "type": "blob" }))
            .collect::<Vec<_>>();
        Self::new(&serde_json::json!({ "tree": tree }).to_string())
    }

    pub fn document(mut self, path: &str, content: &str) -> Self {
        self.documents.insert(path.to_string(), content.to_string());
        self
    }

    /// Delay answering for `path`
    pub fn delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    /// Number of documents requested so far
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn fetch_document(&self, path: &str) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: path.to_string(),
                status: StatusCode::NOT_FOUND,
            })
    }

    async fn fetch_tree(&self) -> Result<Vec<u8>, FetchError> {
        Ok(self.tree.clone())
    }

    fn identifier(&self) -> String {
        "memory".to_string()
    }
}
