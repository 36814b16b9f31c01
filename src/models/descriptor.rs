// file: src/models/descriptor.rs
// description: repository identity and per-repository overrides
// reference: internal data structures

use serde::{Deserialize, Serialize};

const DEFAULT_REFERENCE: &str = "origin/master";
const DEFAULT_FIXTURE_FOLDER: &str = "tests";

/// Immutable identity of a tracked remote repository. One descriptor maps to
/// exactly one local mirror directory (`provider/owner/name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub provider: String,
    pub owner: String,
    pub name: String,

    /// Reference checked out after every fetch, e.g. `origin/main`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Subdirectory of the working tree holding the test fixtures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,

    /// Explicit remote URL; overrides the provider-derived HTTPS URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

impl RepositoryDescriptor {
    pub fn new(
        provider: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            owner: owner.into(),
            name: name.into(),
            reference: None,
            folder: None,
            remote: None,
        }
    }

    /// Registry key, `provider/owner/name`.
    pub fn id(&self) -> String {
        format!("{}/{}/{}", self.provider, self.owner, self.name)
    }

    pub fn remote_url(&self) -> String {
        if let Some(remote) = &self.remote {
            return remote.clone();
        }
        format!(
            "https://{}/{}/{}.git",
            provider_host(&self.provider),
            self.owner,
            self.name
        )
    }

    pub fn tracked_reference(&self) -> &str {
        self.reference.as_deref().unwrap_or(DEFAULT_REFERENCE)
    }

    pub fn fixture_folder(&self) -> &str {
        self.folder.as_deref().unwrap_or(DEFAULT_FIXTURE_FOLDER)
    }
}

fn provider_host(provider: &str) -> &str {
    match provider {
        "github" => "github.com",
        "gitlab" => "gitlab.com",
        "bitbucket" => "bitbucket.org",
        // Unknown providers are taken verbatim as a host name.
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_descriptor_id() {
        let descriptor = RepositoryDescriptor::new("github", "acme", "widgets");
        assert_eq!(descriptor.id(), "github/acme/widgets");
    }

    #[test]
    fn test_remote_url_for_known_providers() {
        let descriptor = RepositoryDescriptor::new("github", "acme", "widgets");
        assert_eq!(
            descriptor.remote_url(),
            "https://github.com/acme/widgets.git"
        );

        let descriptor = RepositoryDescriptor::new("gitlab", "acme", "widgets");
        assert_eq!(
            descriptor.remote_url(),
            "https://gitlab.com/acme/widgets.git"
        );
    }

    #[test]
    fn test_remote_url_unknown_provider_used_as_host() {
        let descriptor = RepositoryDescriptor::new("git.example.org", "acme", "widgets");
        assert_eq!(
            descriptor.remote_url(),
            "https://git.example.org/acme/widgets.git"
        );
    }

    #[test]
    fn test_remote_override_wins() {
        let mut descriptor = RepositoryDescriptor::new("github", "acme", "widgets");
        descriptor.remote = Some("/srv/git/widgets".to_string());
        assert_eq!(descriptor.remote_url(), "/srv/git/widgets");
    }

    #[test]
    fn test_defaults() {
        let descriptor = RepositoryDescriptor::new("github", "acme", "widgets");
        assert_eq!(descriptor.tracked_reference(), "origin/master");
        assert_eq!(descriptor.fixture_folder(), "tests");
    }

    #[test]
    fn test_overrides() {
        let mut descriptor = RepositoryDescriptor::new("github", "acme", "widgets");
        descriptor.reference = Some("origin/main".to_string());
        descriptor.folder = Some("fixtures".to_string());
        assert_eq!(descriptor.tracked_reference(), "origin/main");
        assert_eq!(descriptor.fixture_folder(), "fixtures");
    }
}
