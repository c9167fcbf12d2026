//! Remote content sources
//!
//! A [`ContentSource`] gives read-only access to the repository that stores
//! the posts: single raw documents by path, and the recursive file listing.

mod github;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub use github::GitHubSource;

/// Failures reaching the remote repository
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("error reading body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Read-only access to the post repository
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch one raw document by its repository path
    async fn fetch_document(&self, path: &str) -> Result<String, FetchError>;

    /// Fetch the recursive tree listing, undecoded
    async fn fetch_tree(&self) -> Result<Vec<u8>, FetchError>;

    /// Human-readable name of this source for logs
    fn identifier(&self) -> String;
}

/// Recursive tree listing as returned by the git trees API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeListing {
    #[serde(default)]
    pub sha: Option<String>,
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// One entry of a tree listing
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl TreeEntry {
    /// Files are `blob` entries; listings that omit the type are taken as files
    pub fn is_file(&self) -> bool {
        self.kind.is_empty() || self.kind == "blob"
    }
}
