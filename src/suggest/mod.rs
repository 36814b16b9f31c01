// file: src/suggest/mod.rs
// description: test suggestion submission as a GitHub pull request
// reference: sequential GitHub API flow, short-circuiting on the first failure

pub mod github;

pub use github::{Committer, GithubClient, PullRequest};

use crate::config::GithubConfig;
use crate::error::{MirrorError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use tracing::info;

const FILE_NAME_PREFIX: &str = "suggestion_";
const BRANCH_PREFIX: &str = "suggestion-";

/// A user-proposed test to be committed upstream and opened as a PR.
#[derive(Debug, Clone)]
pub struct TestSuggestion {
    pub title: String,
    pub description: String,
    /// Serialized test content, committed verbatim (base64-encoded on the
    /// wire).
    pub state: String,
}

impl TestSuggestion {
    fn validate(&self) -> Result<()> {
        if self.title.is_empty() || self.description.is_empty() || self.state.is_empty() {
            return Err(MirrorError::Suggestion(
                "title, description and state are all required".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct SuggestionSubmitter {
    client: GithubClient,
    config: GithubConfig,
}

impl SuggestionSubmitter {
    pub fn new(config: GithubConfig) -> Result<Self> {
        let client = GithubClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Chain the GitHub API calls that turn a suggestion into a pull request:
    /// resolve the base branch head, branch off it, commit the suggestion
    /// file, then open the PR. The first failing call aborts the flow.
    pub async fn submit(
        &self,
        suggestion: &TestSuggestion,
        committer: Option<&Committer>,
    ) -> Result<PullRequest> {
        suggestion.validate()?;

        let now = Utc::now().timestamp_millis();
        let branch = branch_name(now);
        let file_path = suggestion_file_path(
            &self.config.suggestion_location,
            now,
            &self.config.suggestion_extension,
        );

        let base_sha = self
            .client
            .head_reference_sha(&self.config.base_branch)
            .await?;
        self.client.create_reference(&branch, &base_sha).await?;

        let encoded = BASE64.encode(suggestion.state.as_bytes());
        self.client
            .create_content(
                &file_path,
                &branch,
                &suggestion.description,
                &encoded,
                committer,
            )
            .await?;

        let pull_request = self
            .client
            .create_pull_request(
                &branch,
                &suggestion.title,
                &suggestion.description,
                &self.config.base_branch,
            )
            .await?;

        info!(
            "Opened pull request #{} for suggestion branch {}",
            pull_request.number, branch
        );
        Ok(pull_request)
    }
}

fn branch_name(timestamp_millis: i64) -> String {
    format!("{}{}", BRANCH_PREFIX, timestamp_millis)
}

fn suggestion_file_path(location: &str, timestamp_millis: i64, extension: &str) -> String {
    format!(
        "{}/{}{}.{}",
        location.trim_end_matches('/'),
        FILE_NAME_PREFIX,
        timestamp_millis,
        extension
    )
}
