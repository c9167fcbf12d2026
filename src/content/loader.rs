//! Content loader - fetches posts and post listings from the content source

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::{FrontMatter, Post, PreviewSummary};
use crate::config::{AggregationConfig, AggregationPolicy, RepositoryConfig};
use crate::error::{Error, Result};
use crate::source::{ContentSource, TreeListing};

/// Loads posts from a remote content source
#[derive(Clone)]
pub struct PostLoader {
    source: Arc<dyn ContentSource>,
    repository: Arc<RepositoryConfig>,
    aggregation: AggregationConfig,
}

impl PostLoader {
    /// Create a new post loader
    pub fn new(
        source: Arc<dyn ContentSource>,
        repository: RepositoryConfig,
        aggregation: AggregationConfig,
    ) -> Self {
        Self {
            source,
            repository: Arc::new(repository),
            aggregation,
        }
    }

    /// Fetch and parse a single post in `locale`
    pub async fn fetch_post(&self, slug: &str, locale: &str) -> Result<Post> {
        let path = self.repository.post_path(slug, locale);
        if !is_path_segment(slug) || !is_path_segment(locale) {
            return Err(Error::MalformedPath(path));
        }

        let document = self.source.fetch_document(&path).await?;
        let (mut fm, body) = FrontMatter::parse(&document).map_err(|source| Error::ContentParse {
            slug: slug.to_string(),
            source,
        })?;

        // The folder name is the identifier
        if fm.slug != slug {
            if !fm.slug.is_empty() {
                tracing::warn!(
                    "Post {} declares slug '{}', using '{}'",
                    path,
                    fm.slug,
                    slug
                );
            }
            fm.slug = slug.to_string();
        }

        Ok(Post::new(fm, body.trim()))
    }

    /// Build previews of every post available in `locale`, in tree order
    pub async fn list_previews(&self, locale: &str) -> Result<Vec<PreviewSummary>> {
        let bytes = self.source.fetch_tree().await?;
        let listing: TreeListing = serde_json::from_slice(&bytes).map_err(Error::TreeDecode)?;

        if listing.truncated {
            tracing::warn!(
                "Tree listing from {} is truncated, some posts may be missing",
                self.source.identifier()
            );
        }

        let suffix = self.repository.locale_suffix(locale);
        let slugs = select_slugs(&listing, &suffix)?;
        tracing::debug!("Found {} posts for locale '{}'", slugs.len(), locale);

        let posts = self.fetch_all(slugs, locale).await?;
        Ok(posts.iter().map(Post::preview).collect())
    }

    /// Fetch posts concurrently, keeping the order of `slugs`
    async fn fetch_all(&self, slugs: Vec<String>, locale: &str) -> Result<Vec<Post>> {
        let permits = Arc::new(Semaphore::new(self.aggregation.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, slug) in slugs.iter().cloned().enumerate() {
            let loader = self.clone();
            let locale = locale.to_string();
            let permits = permits.clone();

            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => loader.fetch_post(&slug, &locale).await,
                    Err(e) => Err(Error::Task(e.to_string())),
                };
                (index, slug, result)
            });
        }

        let mut slots: Vec<Option<Post>> = vec![None; slugs.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, slug, result) = joined.map_err(|e| Error::Task(e.to_string()))?;
            match result {
                Ok(post) => slots[index] = Some(post),
                Err(e) => match self.aggregation.policy {
                    AggregationPolicy::Abort => {
                        tasks.abort_all();
                        return Err(e);
                    }
                    AggregationPolicy::Skip => {
                        tracing::warn!("Skipping post '{}': {}", slug, e);
                    }
                },
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Identifiers of the file entries whose path ends with `suffix`, in tree order
pub fn select_slugs(listing: &TreeListing, suffix: &str) -> Result<Vec<String>> {
    listing
        .tree
        .iter()
        .filter(|entry| entry.is_file() && entry.path.ends_with(suffix))
        .map(|entry| post_identifier(&entry.path).map(str::to_string))
        .collect()
}

/// Second segment of a repository path (`posts/<slug>/en.mdx` gives `<slug>`)
pub fn post_identifier(path: &str) -> Result<&str> {
    match path.split('/').nth(1) {
        Some(slug) if !slug.is_empty() => Ok(slug),
        _ => Err(Error::MalformedPath(path.to_string())),
    }
}

fn is_path_segment(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains('/')
}
