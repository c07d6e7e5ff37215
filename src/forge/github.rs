//! GitHub REST client for closed pull requests.
//!
//! Pages of `GET /repos/{owner}/{repo}/pulls?state=closed&base={branch}` are
//! requested sequentially with a bearer token. There are no retries: a failed
//! request aborts the fetch and the caller re-runs the release.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{retain_page, ChangeRequestSource, PAGE_SIZE};
use crate::domain::ChangeRequest;
use crate::error::{ReleaseError, Result};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "git-release-notes";

/// GitHub implementation of [`ChangeRequestSource`].
pub struct GitHubClient {
    client: Client,
    token: String,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubClient {
    /// Create a client for `owner/repo` against the public GitHub API.
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Use a different API base URL (e.g., `https://github.example.com/api/v3`).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ReleaseError::config("Access token contains invalid header characters"))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// URL of one page of closed pull requests targeting `base`.
    fn pulls_url(&self, base: &str, page: u32) -> Result<Url> {
        let endpoint = format!(
            "{}/repos/{}/{}/pulls",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        );
        let per_page = PAGE_SIZE.to_string();
        let page = page.to_string();

        Url::parse_with_params(
            &endpoint,
            &[
                ("state", "closed"),
                ("base", base),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
            ],
        )
        .map_err(|e| ReleaseError::config(format!("Invalid API URL '{}': {}", endpoint, e)))
    }

    /// Fetch and decode a single page.
    async fn fetch_page(&self, base: &str, page: u32) -> Result<Vec<ChangeRequest>> {
        let response = self
            .client
            .get(self.pulls_url(base, page)?)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ReleaseError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ReleaseError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ReleaseError::upstream(status.as_u16(), body));
        }

        let records: Vec<PullRequestRecord> = serde_json::from_str(&body).map_err(|e| {
            ReleaseError::decode(format!("Failed to parse pull requests page {}: {}", page, e))
        })?;

        Ok(records.into_iter().map(ChangeRequest::from).collect())
    }
}

#[async_trait]
impl ChangeRequestSource for GitHubClient {
    async fn fetch_merged(&self, base: &str, since: DateTime<Utc>) -> Result<Vec<ChangeRequest>> {
        let mut merged = Vec::new();
        let mut page: u32 = 1;

        loop {
            let records = self.fetch_page(base, page).await?;
            let (kept, more) = retain_page(records, since);
            merged.extend(kept);

            if !more {
                break;
            }
            page += 1;
        }

        Ok(merged)
    }
}

// --------------------------------------------------------------------------
// API Response Types
// --------------------------------------------------------------------------

/// Pull request as returned by the list endpoint.
#[derive(Debug, Deserialize)]
struct PullRequestRecord {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
    html_url: String,
    #[serde(default)]
    labels: Vec<LabelRecord>,
}

#[derive(Debug, Deserialize)]
struct LabelRecord {
    name: String,
}

impl From<PullRequestRecord> for ChangeRequest {
    fn from(record: PullRequestRecord) -> Self {
        ChangeRequest {
            number: record.number,
            title: record.title,
            body: record.body,
            merged_at: record.merged_at,
            labels: record.labels.into_iter().map(|l| l.name).collect(),
            url: record.html_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulls_url() {
        let client = GitHubClient::new("t", "acme", "widgets");
        let url = client.pulls_url("develop", 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/acme/widgets/pulls?state=closed&base=develop&per_page=100&page=3"
        );
    }

    #[test]
    fn test_pulls_url_encodes_branch_and_trims_base() {
        let client =
            GitHubClient::new("t", "acme", "widgets").with_api_base("http://localhost:9999/");
        let url = client.pulls_url("release/1.0 rc", 1).unwrap();
        assert!(url
            .as_str()
            .starts_with("http://localhost:9999/repos/acme/widgets/pulls?"));
        assert!(url.as_str().contains("base=release%2F1.0+rc"));
    }

    #[test]
    fn test_headers_use_bearer_token() {
        let client = GitHubClient::new("abc123", "acme", "widgets");
        let headers = client.headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
        assert_eq!(
            headers.get(ACCEPT).unwrap(),
            "application/vnd.github+json"
        );
    }

    #[test]
    fn test_headers_reject_invalid_token() {
        let client = GitHubClient::new("bad\ntoken", "acme", "widgets");
        assert!(matches!(client.headers(), Err(ReleaseError::Config(_))));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = GitHubClient::new("super-secret", "acme", "widgets");
        assert!(!format!("{:?}", client).contains("super-secret"));
    }

    #[test]
    fn test_record_conversion() {
        let json = r#"{
            "number": 42,
            "title": "Add export",
            "body": null,
            "merged_at": "2024-05-01T10:00:00Z",
            "html_url": "https://github.com/acme/widgets/pull/42",
            "labels": [{"name": "minor", "color": "fff"}],
            "state": "closed"
        }"#;
        let record: PullRequestRecord = serde_json::from_str(json).unwrap();
        let request = ChangeRequest::from(record);

        assert_eq!(request.number, 42);
        assert_eq!(request.body, None);
        assert_eq!(request.labels, vec!["minor"]);
        assert_eq!(request.url, "https://github.com/acme/widgets/pull/42");
        assert_eq!(
            request.merged_at.unwrap().to_rfc3339(),
            "2024-05-01T10:00:00+00:00"
        );
    }

    #[test]
    fn test_record_unmerged() {
        let json = r#"{"number": 1, "title": "t", "merged_at": null, "html_url": "u"}"#;
        let record: PullRequestRecord = serde_json::from_str(json).unwrap();
        let request = ChangeRequest::from(record);
        assert_eq!(request.merged_at, None);
        assert!(request.labels.is_empty());
    }
}
