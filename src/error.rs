//! Error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::content::ParseError;
use crate::server::auth::AuthError;
use crate::source::FetchError;

/// Errors surfaced by the blog API
#[derive(Error, Debug)]
pub enum Error {
    /// Startup configuration is incomplete
    #[error("configuration error: {0}")]
    Config(String),

    /// The caller did not present the configured secret
    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    /// The remote repository could not be reached or answered badly
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The tree listing was not the JSON document we expect
    #[error("error decoding tree listing: {0}")]
    TreeDecode(#[source] serde_json::Error),

    /// A post document could not be split or its header decoded
    #[error("error parsing post '{slug}': {source}")]
    ContentParse {
        slug: String,
        #[source]
        source: ParseError,
    },

    /// A tree path does not carry a post identifier
    #[error("malformed post path: {0}")]
    MalformedPath(String),

    /// A spawned fetch task panicked or was cancelled
    #[error("fetch task failed: {0}")]
    Task(String),
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthorized(e) => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response(),
            other => {
                tracing::error!("request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("ERROR: {}", other),
                )
                    .into_response()
            }
        }
    }
}
