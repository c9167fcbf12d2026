//! Post and preview models

use serde::{Deserialize, Serialize};

use super::FrontMatter;

/// A blog post fetched from the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Parsed header
    pub frontmatter: FrontMatter,

    /// Trimmed body text
    pub content: String,
}

impl Post {
    pub fn new(frontmatter: FrontMatter, content: impl Into<String>) -> Self {
        Self {
            frontmatter,
            content: content.into(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.frontmatter.slug
    }

    /// Header projection used by list views
    pub fn preview(&self) -> PreviewSummary {
        self.frontmatter.preview()
    }
}

/// A post as shown in list views, without its body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSummary {
    pub title: String,
    pub description: String,
    pub date: String,
    pub slug: String,
}
