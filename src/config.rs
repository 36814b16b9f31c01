// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{MirrorError, Result};
use crate::models::RepositoryDescriptor;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub registry: RegistryConfig,
    pub github: GithubConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory under which mirrors are laid out as
    /// `<root>/<provider>/<owner>/<name>`.
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub repositories: Vec<RepositoryDescriptor>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubConfig {
    pub api_url: String,
    /// Repository receiving suggestion pull requests, `owner/name`.
    pub repo: String,
    pub base_branch: String,
    /// Directory inside `repo` where accepted suggestion files land.
    pub suggestion_location: String,
    pub suggestion_extension: String,
    /// Normally injected via FIXTURE_MIRROR__GITHUB__ACCESS_TOKEN.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FIXTURE_MIRROR")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| MirrorError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| MirrorError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                root: PathBuf::from("./mirrors"),
            },
            registry: RegistryConfig {
                repositories: vec![],
            },
            github: GithubConfig {
                api_url: "https://api.github.com".to_string(),
                repo: "owner/repository".to_string(),
                base_branch: "master".to_string(),
                suggestion_location: "tests".to_string(),
                suggestion_extension: "yaml".to_string(),
                access_token: None,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.storage.root.as_os_str().is_empty() {
            return Err(MirrorError::Config(
                "storage.root must not be empty".to_string(),
            ));
        }

        for descriptor in &self.registry.repositories {
            if descriptor.provider.is_empty()
                || descriptor.owner.is_empty()
                || descriptor.name.is_empty()
            {
                return Err(MirrorError::Config(format!(
                    "registry entry {:?} is missing provider, owner or name",
                    descriptor
                )));
            }
        }

        if !self.github.repo.contains('/') {
            return Err(MirrorError::Config(
                "github.repo must be of the form owner/name".to_string(),
            ));
        }

        Ok(())
    }
}
