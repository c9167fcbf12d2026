//! GitHub-backed content source

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::ACCEPT;
use std::time::Duration;

use super::{ContentSource, FetchError};
use crate::config::RepositoryConfig;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("blog-api/", env!("CARGO_PKG_VERSION"));

/// Media type the git trees API answers with
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Characters escaped inside a single URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Reads posts from a GitHub repository through the raw-content host and
/// the git trees API, authenticated with a bearer token
pub struct GitHubSource {
    client: reqwest::Client,
    repository: RepositoryConfig,
    token: String,
}

impl GitHubSource {
    /// Create a source for `repository`; every request gives up after `timeout`
    pub fn new(
        repository: RepositoryConfig,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            repository,
            token: token.into(),
        })
    }

    /// Raw-content URL of a repository path
    pub fn raw_url(&self, path: &str) -> String {
        let encoded = path
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/{}/{}/{}/{}",
            self.repository.raw_base_url.trim_end_matches('/'),
            self.repository.owner,
            self.repository.name,
            self.repository.branch,
            encoded
        )
    }

    /// Recursive tree listing URL of the configured branch
    pub fn tree_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.repository.api_base_url.trim_end_matches('/'),
            self.repository.owner,
            self.repository.name,
            self.repository.branch
        )
    }

    async fn get(
        &self,
        url: &str,
        accept: Option<&str>,
    ) -> std::result::Result<reqwest::Response, FetchError> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url).bearer_auth(&self.token);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        let response = request
            .send()
            .await
            .map_err(|source| transport_error(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ContentSource for GitHubSource {
    async fn fetch_document(&self, path: &str) -> std::result::Result<String, FetchError> {
        let url = self.raw_url(path);
        let response = self.get(&url, None).await?;
        response.text().await.map_err(|source| body_error(&url, source))
    }

    async fn fetch_tree(&self) -> std::result::Result<Vec<u8>, FetchError> {
        let url = self.tree_url();
        let response = self.get(&url, Some(GITHUB_JSON)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| body_error(&url, source))?;
        Ok(bytes.to_vec())
    }

    fn identifier(&self) -> String {
        format!(
            "github:{}/{}@{}",
            self.repository.owner, self.repository.name, self.repository.branch
        )
    }
}

fn transport_error(url: &str, source: reqwest::Error) -> FetchError {
    if source.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source,
        }
    }
}

fn body_error(url: &str, source: reqwest::Error) -> FetchError {
    if source.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Body {
            url: url.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::get,
        Router,
    };
    use std::net::SocketAddr;

    const TOKEN: &str = "ghp_test";

    const TREE: &str = r#"{"sha":"abc","tree":[{"path":"posts/hello-world/en.mdx","type":"blob","sha":"1","url":"u"}],"truncated":false}"#;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {}", TOKEN))
            .unwrap_or(false)
    }

    async fn raw_handler(
        Path((owner, repo, branch, path)): Path<(String, String, String, String)>,
        headers: HeaderMap,
    ) -> (StatusCode, String) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, "bad credentials".to_string());
        }
        match (owner.as_str(), repo.as_str(), branch.as_str(), path.as_str()) {
            ("mariandotg", "blog", "main", "posts/hello-world/en.mdx") => {
                (StatusCode::OK, "---\ntitle: Hello\n---\nBody".to_string())
            }
            ("mariandotg", "blog", "main", "posts/slow/en.mdx") => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                (StatusCode::OK, String::new())
            }
            _ => (StatusCode::NOT_FOUND, "404: Not Found".to_string()),
        }
    }

    async fn tree_handler(
        Path((owner, repo, branch)): Path<(String, String, String)>,
        headers: HeaderMap,
    ) -> (StatusCode, String) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, "bad credentials".to_string());
        }
        if (owner.as_str(), repo.as_str(), branch.as_str()) != ("mariandotg", "blog", "main") {
            return (StatusCode::NOT_FOUND, String::new());
        }
        (StatusCode::OK, TREE.to_string())
    }

    /// Serve a fake GitHub on a loopback port
    async fn spawn_fake_github() -> SocketAddr {
        let app = Router::new()
            .route("/raw/:owner/:repo/:branch/*path", get(raw_handler))
            .route("/api/repos/:owner/:repo/git/trees/:branch", get(tree_handler));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn repository(addr: SocketAddr) -> RepositoryConfig {
        RepositoryConfig {
            raw_base_url: format!("http://{}/raw", addr),
            api_base_url: format!("http://{}/api/", addr),
            ..RepositoryConfig::default()
        }
    }

    #[test]
    fn test_default_urls() {
        let source =
            GitHubSource::new(RepositoryConfig::default(), TOKEN, Duration::from_secs(1)).unwrap();
        assert_eq!(
            source.raw_url("posts/hello-world/en.mdx"),
            "https://raw.githubusercontent.com/mariandotg/blog/main/posts/hello-world/en.mdx"
        );
        assert_eq!(
            source.tree_url(),
            "https://api.github.com/repos/mariandotg/blog/git/trees/main?recursive=1"
        );
        assert_eq!(source.identifier(), "github:mariandotg/blog@main");
    }

    #[test]
    fn test_raw_url_escapes_segments() {
        let source =
            GitHubSource::new(RepositoryConfig::default(), TOKEN, Duration::from_secs(1)).unwrap();
        let url = source.raw_url("posts/a b?c/en.mdx");
        assert!(url.ends_with("/posts/a%20b%3Fc/en.mdx"));
    }

    #[tokio::test]
    async fn test_fetch_document() {
        let addr = spawn_fake_github().await;
        let source = GitHubSource::new(repository(addr), TOKEN, Duration::from_secs(5)).unwrap();

        let doc = source.fetch_document("posts/hello-world/en.mdx").await.unwrap();
        assert_eq!(doc, "---\ntitle: Hello\n---\nBody");
    }

    #[tokio::test]
    async fn test_fetch_tree_returns_raw_bytes() {
        let addr = spawn_fake_github().await;
        let source = GitHubSource::new(repository(addr), TOKEN, Duration::from_secs(5)).unwrap();

        let bytes = source.fetch_tree().await.unwrap();
        assert_eq!(bytes, TREE.as_bytes());
    }

    #[tokio::test]
    async fn test_missing_document_is_status_error() {
        let addr = spawn_fake_github().await;
        let source = GitHubSource::new(repository(addr), TOKEN, Duration::from_secs(5)).unwrap();

        let err = source.fetch_document("posts/nope/en.mdx").await.unwrap_err();
        match err {
            FetchError::Status { status, url } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert!(url.ends_with("/posts/nope/en.mdx"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_token_is_status_error() {
        let addr = spawn_fake_github().await;
        let source = GitHubSource::new(repository(addr), "other", Duration::from_secs(5)).unwrap();

        let err = source.fetch_tree().await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status { status, .. } if status == StatusCode::UNAUTHORIZED
        ));
    }

    #[tokio::test]
    async fn test_slow_remote_times_out() {
        let addr = spawn_fake_github().await;
        let source =
            GitHubSource::new(repository(addr), TOKEN, Duration::from_millis(100)).unwrap();

        let err = source.fetch_document("posts/slow/en.mdx").await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_remote_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = GitHubSource::new(repository(addr), TOKEN, Duration::from_secs(5)).unwrap();
        let err = source.fetch_tree().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
