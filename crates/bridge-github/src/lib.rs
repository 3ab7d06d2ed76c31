//! Upstream (GitHub) REST client for the issue bridge.
//!
//! Two operations are consumed by the sync engine: a paginated listing of
//! the repository's issues with pull requests excluded, and the user
//! profile lookup backing cross-tracker identity resolution. Failed calls
//! are not retried; an error aborts the caller's current operation.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use bridge_core::issue::UpstreamIssue;
use bridge_core::link_key::RepoRef;
use bridge_core::text::truncate_for_error;

const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Deserialize)]
/// Profile fields used for identity resolution. Both are optional on the
/// upstream side; a fully private profile resolves to nothing downstream.
pub struct GithubUserProfile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    repo: RepoRef,
}

impl GithubClient {
    pub fn new(api_base: &str, token: &str, repo: RepoRef) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("issue-bridge"),
        );
        // The html accept variant makes the listing carry body_html, which
        // the mirror build prefers over the raw markdown body.
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github.html+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http: client,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo,
        })
    }

    /// Lists every issue in the repository across all states, following
    /// pagination transparently and dropping pull requests.
    pub async fn list_issues(&self) -> Result<Vec<UpstreamIssue>> {
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let page_value = page.to_string();
            let chunk: Vec<UpstreamIssue> = self
                .request_json(
                    "list issues",
                    self.http
                        .get(format!(
                            "{}/repos/{}/{}/issues",
                            self.api_base, self.repo.owner, self.repo.name
                        ))
                        .query(&[
                            ("state", "all"),
                            ("per_page", "100"),
                            ("page", page_value.as_str()),
                        ]),
                )
                .await?;
            let chunk_len = chunk.len();
            rows.extend(chunk.into_iter().filter(|issue| issue.pull_request.is_none()));
            if chunk_len < PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }

    /// Fetches the profile for an upstream account id.
    pub async fn user_profile(&self, account_id: u64) -> Result<GithubUserProfile> {
        self.request_json(
            "get user profile",
            self.http
                .get(format!("{}/user/{}", self.api_base, account_id)),
        )
        .await
    }

    async fn request_json<T>(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .with_context(|| format!("github api {operation} request failed"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "github api {operation} failed with status {}: {}",
                status.as_u16(),
                truncate_for_error(&body, 800)
            );
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode github {operation}"))
    }
}
