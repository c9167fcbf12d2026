//! Service configuration (optional YAML file plus environment secrets)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::Error;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    // Listener
    pub ip: String,
    pub port: u16,

    // Requests
    pub default_locale: String,
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ip: "0.0.0.0".to_string(),
            port: 8080,

            default_locale: "en".to_string(),
            request_timeout_secs: 10,

            repository: RepositoryConfig::default(),
            aggregation: AggregationConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ServiceConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Remote repository holding the posts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub owner: String,
    pub name: String,
    pub branch: String,
    /// Directory holding one folder per post
    pub posts_dir: String,
    /// File extension of localized post files
    pub extension: String,
    pub raw_base_url: String,
    pub api_base_url: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: "mariandotg".to_string(),
            name: "blog".to_string(),
            branch: "main".to_string(),
            posts_dir: "posts".to_string(),
            extension: "mdx".to_string(),
            raw_base_url: "https://raw.githubusercontent.com".to_string(),
            api_base_url: "https://api.github.com".to_string(),
        }
    }
}

impl RepositoryConfig {
    /// Repository path of a localized post file
    pub fn post_path(&self, slug: &str, locale: &str) -> String {
        format!(
            "{}/{}/{}.{}",
            self.posts_dir.trim_matches('/'),
            slug,
            locale,
            self.extension
        )
    }

    /// Suffix a tree path must end with to be a post in `locale`
    pub fn locale_suffix(&self, locale: &str) -> String {
        format!("/{}.{}", locale, self.extension)
    }
}

/// What to do when one post of a listing cannot be loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationPolicy {
    /// Fail the whole listing with the first error
    #[default]
    Abort,
    /// Log the error and leave the post out
    Skip,
}

/// Post listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub policy: AggregationPolicy,
    /// Maximum posts fetched at once
    pub concurrency: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            policy: AggregationPolicy::Abort,
            concurrency: 4,
        }
    }
}

/// Credentials read from the environment at startup
#[derive(Clone)]
pub struct Secrets {
    /// Secret callers must present
    pub api_secret: String,
    /// Token sent to GitHub
    pub remote_token: String,
}

impl Secrets {
    /// Validate startup credentials. Blank values count as missing.
    pub fn new(
        api_secret: Option<String>,
        remote_token: Option<String>,
    ) -> std::result::Result<Self, Error> {
        let api_secret = api_secret
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Config("API_SECRET is not set".to_string()))?;
        let remote_token = remote_token
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Config("GITHUB_AUTH_TOKEN is not set".to_string()))?;

        Ok(Self {
            api_secret,
            remote_token,
        })
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_secret", &"<redacted>")
            .field("remote_token", &"<redacted>")
            .finish()
    }
}
