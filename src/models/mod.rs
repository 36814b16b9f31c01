// file: src/models/mod.rs
// description: data model module exports
// reference: internal module structure

pub mod descriptor;
pub mod record;

pub use descriptor::RepositoryDescriptor;
pub use record::{FixtureRecord, snapshot_from_json, snapshot_to_json};
