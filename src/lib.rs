//! blog-api: serves blog posts stored in a GitHub repository as JSON
//!
//! Posts live at `posts/<slug>/<locale>.mdx` with a YAML front-matter
//! header. The API lists the posts of a locale and returns single posts,
//! fetching everything from the repository on each request.

pub mod config;
pub mod content;
pub mod error;
pub mod server;
pub mod source;

pub use error::{Error, Result};

use std::sync::Arc;

use config::{Secrets, ServiceConfig};
use content::{Post, PostLoader, PreviewSummary};
use server::auth::AccessGate;
use source::{ContentSource, GitHubSource};

/// The blog API application
#[derive(Clone)]
pub struct BlogApi {
    /// Service configuration
    pub config: ServiceConfig,
    /// Post fetching and aggregation
    pub loader: PostLoader,
    /// Caller authentication
    pub gate: AccessGate,
    source: Arc<dyn ContentSource>,
}

impl BlogApi {
    /// Create the application backed by the configured GitHub repository
    pub fn new(config: ServiceConfig, secrets: Secrets) -> Result<Self> {
        let source = GitHubSource::new(
            config.repository.clone(),
            secrets.remote_token,
            config.request_timeout(),
        )?;

        Ok(Self::with_source(
            config,
            Arc::new(source),
            secrets.api_secret,
        ))
    }

    /// Create the application on top of any content source
    pub fn with_source(
        config: ServiceConfig,
        source: Arc<dyn ContentSource>,
        api_secret: impl Into<String>,
    ) -> Self {
        let loader = PostLoader::new(
            source.clone(),
            config.repository.clone(),
            config.aggregation.clone(),
        );

        Self {
            config,
            loader,
            gate: AccessGate::new(api_secret),
            source,
        }
    }

    /// Fetch a single post
    pub async fn fetch_post(&self, slug: &str, locale: &str) -> Result<Post> {
        self.loader.fetch_post(slug, locale).await
    }

    /// List post previews for a locale
    pub async fn list_previews(&self, locale: &str) -> Result<Vec<PreviewSummary>> {
        self.loader.list_previews(locale).await
    }

    /// Name of the content source, for logs
    pub fn source_name(&self) -> String {
        self.source.identifier()
    }

    /// Serve the API until interrupted
    pub async fn serve(&self, ip: &str, port: u16) -> anyhow::Result<()> {
        server::start(self, ip, port).await
    }
}
