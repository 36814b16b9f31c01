// file: src/suggest/github.rs
// description: minimal GitHub REST client for the suggestion pull-request flow
// reference: https://docs.github.com/en/rest

use crate::config::GithubConfig;
use crate::error::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// Pull request fields we report back to the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
struct ReferenceResponse {
    object: ReferenceObject,
}

#[derive(Debug, Deserialize)]
struct ReferenceObject {
    sha: String,
}

pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
    repo: String,
    token: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let token = config
            .access_token
            .clone()
            .ok_or_else(|| MirrorError::Config("github.access_token is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .user_agent("fixture_mirror")
            .build()
            .map_err(|e| MirrorError::Config(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            repo: config.repo.clone(),
            token,
        })
    }

    /// Sha of the tip of `branch`.
    pub async fn head_reference_sha(&self, branch: &str) -> Result<String> {
        let url = format!(
            "{}/repos/{}/git/refs/heads/{}",
            self.api_url, self.repo, branch
        );
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| MirrorError::GitHub(e.to_string()))?;

        let reference: ReferenceResponse = check(response).await?;
        Ok(reference.object.sha)
    }

    pub async fn create_reference(&self, branch: &str, sha: &str) -> Result<()> {
        let url = format!("{}/repos/{}/git/refs", self.api_url, self.repo);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&reference_request_body(branch, sha))
            .send()
            .await
            .map_err(|e| MirrorError::GitHub(e.to_string()))?;

        check::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn create_content(
        &self,
        path: &str,
        branch: &str,
        message: &str,
        content_base64: &str,
        committer: Option<&Committer>,
    ) -> Result<()> {
        let url = format!("{}/repos/{}/contents/{}", self.api_url, self.repo, path);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&content_request_body(
                path,
                branch,
                message,
                content_base64,
                committer,
            ))
            .send()
            .await
            .map_err(|e| MirrorError::GitHub(e.to_string()))?;

        check::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn create_pull_request(
        &self,
        head: &str,
        title: &str,
        body: &str,
        base: &str,
    ) -> Result<PullRequest> {
        let url = format!("{}/repos/{}/pulls", self.api_url, self.repo);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&pull_request_body(head, title, body, base))
            .send()
            .await
            .map_err(|e| MirrorError::GitHub(e.to_string()))?;

        check(response).await
    }
}

async fn check<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let url = response.url().to_string();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MirrorError::GitHub(format!(
            "HTTP {} from {}: {}",
            status, url, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| MirrorError::GitHub(format!("invalid response from {}: {}", url, e)))
}

fn reference_request_body(branch: &str, sha: &str) -> serde_json::Value {
    json!({
        "ref": format!("refs/heads/{}", branch),
        "sha": sha,
    })
}

fn content_request_body(
    path: &str,
    branch: &str,
    message: &str,
    content_base64: &str,
    committer: Option<&Committer>,
) -> serde_json::Value {
    let mut body = json!({
        "path": path,
        "branch": branch,
        "message": message,
        "content": content_base64,
    });
    if let Some(committer) = committer {
        body["committer"] = json!(committer);
    }
    body
}

fn pull_request_body(head: &str, title: &str, body: &str, base: &str) -> serde_json::Value {
    json!({
        "head": format!("refs/heads/{}", head),
        "base": base,
        "title": title,
        "body": body,
    })
}
