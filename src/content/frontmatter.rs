//! Front-matter parsing

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PreviewSummary;

/// Marker that opens and closes the YAML header
const DELIMITER: &str = "---";

/// Errors raised while splitting a document into header and body
#[derive(Error, Debug)]
pub enum ParseError {
    /// Document opens a header but never closes it
    #[error("frontmatter is not delimited correctly")]
    MalformedDocument,

    /// Header block is not valid YAML
    #[error("error parsing frontmatter: {0}")]
    HeaderParse(#[from] serde_yaml::Error),
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    pub date: String,
    pub slug: String,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// The remaining content is not trimmed.
    pub fn parse(content: &str) -> Result<(Self, &str), ParseError> {
        if !content.starts_with(DELIMITER) {
            return Ok((FrontMatter::default(), content));
        }

        let mut parts = content.splitn(3, DELIMITER);
        let (Some(_preamble), Some(header), Some(body)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::MalformedDocument);
        };

        if header.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        // A header holding only comments decodes to null
        let fm = serde_yaml::from_str::<Option<FrontMatter>>(header)?.unwrap_or_default();
        Ok((fm, body))
    }

    /// Project the header into a list-view summary
    pub fn preview(&self) -> PreviewSummary {
        PreviewSummary {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date.clone(),
            slug: self.slug.clone(),
        }
    }

    /// Whether no recognized key was set
    pub fn is_empty(&self) -> bool {
        *self == FrontMatter::default()
    }
}
