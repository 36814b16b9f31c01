// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod mirror;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod suggest;
pub mod utils;

pub use config::{Config, GithubConfig, RegistryConfig, StorageConfig};
pub use error::{MirrorError, Result};
pub use mirror::{FixtureExtractor, MirrorHandle, PathProvisioner, RepositoryMirror};
pub use models::{FixtureRecord, RepositoryDescriptor, snapshot_from_json, snapshot_to_json};
pub use pipeline::{RefreshOutcome, SyncOrchestrator};
pub use registry::RepositoryRegistry;
pub use suggest::{Committer, GithubClient, PullRequest, SuggestionSubmitter, TestSuggestion};
