//! Shared-secret authentication
//!
//! Every request must carry `Authorization: [Bearer ]<secret>`. The secret
//! is fixed when the gate is built and never changes afterwards.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;

use crate::error::Error;

/// Why a request was turned away
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header empty or missing")]
    Missing,

    #[error("Unauthorized access, incorrect secret")]
    Mismatch,
}

/// Checks caller credentials against the configured secret
#[derive(Clone)]
pub struct AccessGate {
    secret: Arc<str>,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
        }
    }

    /// Validate a raw `Authorization` header value
    pub fn authorize(&self, credential: Option<&str>) -> Result<(), AuthError> {
        let value = credential.unwrap_or_default().trim();
        if value.is_empty() {
            return Err(AuthError::Missing);
        }

        let value = value.strip_prefix("Bearer ").unwrap_or(value);
        if value != &*self.secret {
            return Err(AuthError::Mismatch);
        }

        Ok(())
    }
}

/// Middleware rejecting requests without the configured secret
pub async fn require_secret(
    State(gate): State<AccessGate>,
    request: Request,
    next: Next,
) -> Response {
    let credential = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match gate.authorize(credential) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            Error::Unauthorized(e).into_response()
        }
    }
}
