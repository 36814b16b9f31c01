// file: src/mirror/mod.rs
// description: mirror operations module exports
// reference: internal module structure

pub mod extract;
pub mod paths;
pub mod sync;

pub use extract::FixtureExtractor;
pub use paths::PathProvisioner;
pub use sync::{MirrorHandle, RepositoryMirror};
