//! GitHub API client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Deserializer};
use urlencoding::encode;

use crate::domain::entities::{ChangedFile, CommitAuthor, CommitDetail, CommitRef};
use crate::domain::ports::CommitSource;
use crate::error::GithubError;

/// Helper to deserialize null as default (empty vec, etc.)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// How requests authenticate against the GitHub API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GithubCredentials {
    /// Anonymous access (lowest rate limit)
    #[default]
    Anonymous,
    /// Personal access or installation token
    Token(String),
    /// OAuth application id/secret pair
    OAuthApp {
        client_id: String,
        client_secret: String,
    },
}

/// Implementation of the GitHub commit source
pub struct GithubClientImpl {
    http: Client,
    base_url: String,
    credentials: GithubCredentials,
}

impl GithubClientImpl {
    /// Every request carries `timeout` as its overall deadline
    pub fn new(
        base_url: String,
        credentials: GithubCredentials,
        timeout: Duration,
    ) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("badge-analyzer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            GithubCredentials::Anonymous => request,
            GithubCredentials::Token(token) => request.bearer_auth(token),
            GithubCredentials::OAuthApp {
                client_id,
                client_secret,
            } => request.basic_auth(client_id, Some(client_secret)),
        }
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T, GithubError> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            serde_json::from_slice(&body).map_err(|e| GithubError::Deserialization(e.to_string()))
        } else if status.as_u16() == 401 {
            Err(GithubError::Unauthorized)
        } else if status.as_u16() == 429 || (status.as_u16() == 403 && rate_limit_exhausted(&response))
        {
            Err(GithubError::RateLimited)
        } else if status.as_u16() == 404 {
            Err(GithubError::NotFound(resource.to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(GithubError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn rate_limit_exhausted(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|remaining| remaining.trim() == "0")
}

/// Split `owner/name` into URL-encoded path segments
fn repo_path(repo: &str) -> Result<String, GithubError> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(format!("/repos/{}/{}", encode(owner), encode(name)))
        }
        _ => Err(GithubError::NotFound(repo.to_string())),
    }
}

/// Response types from GitHub API
#[derive(Deserialize)]
struct CommitListEntry {
    sha: String,
    url: String,
}

impl From<CommitListEntry> for CommitRef {
    fn from(r: CommitListEntry) -> Self {
        CommitRef {
            sha: r.sha,
            url: r.url,
        }
    }
}

#[derive(Deserialize)]
struct GithubUserResponse {
    login: String,
}

#[derive(Deserialize)]
struct GitSignatureResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Deserialize)]
struct GitCommitResponse {
    #[serde(default)]
    author: Option<GitSignatureResponse>,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct CommitDetailResponse {
    sha: String,
    /// Linked GitHub account; null when the author email is not linked
    #[serde(default)]
    author: Option<GithubUserResponse>,
    commit: GitCommitResponse,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    files: Vec<ChangedFile>,
}

impl From<CommitDetailResponse> for CommitDetail {
    fn from(r: CommitDetailResponse) -> Self {
        let signature = r.commit.author;
        let (name, email, date) = match signature {
            Some(s) => (s.name, s.email, s.date),
            None => (None, None, None),
        };
        CommitDetail {
            sha: r.sha,
            author: CommitAuthor {
                name,
                email,
                username: r.author.map(|a| a.login),
            },
            message: r.commit.message,
            timestamp: date,
            files: r.files,
        }
    }
}

#[async_trait]
impl CommitSource for GithubClientImpl {
    async fn list_commits(
        &self,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CommitRef>, GithubError> {
        let url = self.api_url(&format!("{}/commits", repo_path(repo)?));
        tracing::debug!(url = %url, page, per_page, "Fetching commit list");

        let response = self
            .authorize(self.http.get(&url))
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;

        let entries: Vec<CommitListEntry> = self.handle_response(response, repo).await?;
        Ok(entries.into_iter().map(CommitRef::from).collect())
    }

    async fn get_commit(&self, commit: &CommitRef) -> Result<CommitDetail, GithubError> {
        tracing::debug!(url = %commit.url, "Fetching commit detail");

        let response = self.authorize(self.http.get(&commit.url)).send().await?;
        let detail: CommitDetailResponse = self.handle_response(response, &commit.sha).await?;
        Ok(detail.into())
    }
}
