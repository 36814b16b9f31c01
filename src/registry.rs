// file: src/registry.rs
// description: injected read-only lookup of tracked repositories
// reference: internal data structures

use crate::models::RepositoryDescriptor;

/// Read-only view of the tracked repository list. Built once from
/// configuration and handed to whoever needs lookups, so there is no hidden
/// process-wide registry state.
#[derive(Debug, Clone, Default)]
pub struct RepositoryRegistry {
    repositories: Vec<RepositoryDescriptor>,
}

impl RepositoryRegistry {
    pub fn new(repositories: Vec<RepositoryDescriptor>) -> Self {
        Self { repositories }
    }

    pub fn find(&self, provider: &str, owner: &str, name: &str) -> Option<&RepositoryDescriptor> {
        self.repositories
            .iter()
            .find(|d| d.provider == provider && d.owner == owner && d.name == name)
    }

    /// Lookup by the `provider/owner/name` key.
    pub fn find_by_id(&self, id: &str) -> Option<&RepositoryDescriptor> {
        self.repositories.iter().find(|d| d.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        self.repositories.iter()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
