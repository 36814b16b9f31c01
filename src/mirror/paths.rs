// file: src/mirror/paths.rs
// description: on-disk mirror directory provisioning and layout
// reference: filesystem layout <root>/<provider>/<owner>/<name>

use crate::error::{MirrorError, Result};
use crate::models::RepositoryDescriptor;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONTENT_DIR: &str = "content";
const SNAPSHOT_FILE: &str = "tests.json";

/// Lays out and provisions the per-repository directory chain. All accessors
/// are pure path arithmetic; only `ensure_*` touch the filesystem.
#[derive(Debug, Clone)]
pub struct PathProvisioner {
    root: PathBuf,
}

impl PathProvisioner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a single directory. A directory that already exists is success;
    /// anything else is fatal.
    pub fn ensure_directory(path: &Path) -> Result<PathBuf> {
        match fs::create_dir(path) {
            Ok(()) => {
                debug!("Created directory {}", path.display());
                Ok(path.to_path_buf())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(path.to_path_buf()),
            Err(e) => Err(MirrorError::Provisioning {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Walk the fixed `root/provider/owner/name` chain, creating each level
    /// in order and short-circuiting on the first fatal error. Idempotent.
    pub fn ensure_hierarchy(&self, descriptor: &RepositoryDescriptor) -> Result<PathBuf> {
        let mut path = Self::ensure_directory(&self.root)?;
        for segment in [&descriptor.provider, &descriptor.owner, &descriptor.name] {
            path = Self::ensure_directory(&path.join(segment))?;
        }
        Ok(path)
    }

    pub fn mirror_root(&self, descriptor: &RepositoryDescriptor) -> PathBuf {
        self.root
            .join(&descriptor.provider)
            .join(&descriptor.owner)
            .join(&descriptor.name)
    }

    /// Working copy of the remote repository.
    pub fn content_path(&self, descriptor: &RepositoryDescriptor) -> PathBuf {
        self.mirror_root(descriptor).join(CONTENT_DIR)
    }

    /// Published snapshot, sibling to the working copy.
    pub fn snapshot_path(&self, descriptor: &RepositoryDescriptor) -> PathBuf {
        self.mirror_root(descriptor).join(SNAPSHOT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn descriptor() -> RepositoryDescriptor {
        RepositoryDescriptor::new("github", "acme", "widgets")
    }

    #[test]
    fn test_ensure_directory_creates_and_tolerates_existing() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("mirrors");

        let first = PathProvisioner::ensure_directory(&target).unwrap();
        assert!(first.is_dir());

        let second = PathProvisioner::ensure_directory(&target).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ensure_directory_propagates_fatal_errors() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        // Parent is a regular file, so creation cannot succeed.
        let result = PathProvisioner::ensure_directory(&blocker.join("child"));
        assert!(matches!(result, Err(MirrorError::Provisioning { .. })));
    }

    #[test]
    fn test_ensure_hierarchy_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let provisioner = PathProvisioner::new(temp.path().join("mirrors"));

        let first = provisioner.ensure_hierarchy(&descriptor()).unwrap();
        let second = provisioner.ensure_hierarchy(&descriptor()).unwrap();

        assert_eq!(first, second);
        assert!(first.ends_with("github/acme/widgets"));
        assert!(first.is_dir());
    }

    #[test]
    fn test_path_accessors() {
        let provisioner = PathProvisioner::new("/opt/mirrors");
        let d = descriptor();

        assert_eq!(
            provisioner.mirror_root(&d),
            PathBuf::from("/opt/mirrors/github/acme/widgets")
        );
        assert_eq!(
            provisioner.content_path(&d),
            PathBuf::from("/opt/mirrors/github/acme/widgets/content")
        );
        assert_eq!(
            provisioner.snapshot_path(&d),
            PathBuf::from("/opt/mirrors/github/acme/widgets/tests.json")
        );
    }
}
