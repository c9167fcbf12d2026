//! Content module - handles posts, front-matter and post listings

mod frontmatter;
pub mod loader;
mod post;

pub use frontmatter::{FrontMatter, ParseError};
pub use loader::PostLoader;
pub use post::{Post, PreviewSummary};
