// file: src/mirror/sync.rs
// description: clone-or-open, fetch and checkout against one local mirror
// reference: https://docs.rs/git2

use crate::error::{MirrorError, Result};
use crate::mirror::paths::PathProvisioner;
use crate::models::RepositoryDescriptor;
use git2::{ErrorCode, FetchOptions, RemoteCallbacks, Repository};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime binding of a descriptor to an opened working copy. Lives for one
/// refresh; the directory underneath persists across refreshes.
#[derive(Debug)]
pub struct MirrorHandle {
    pub descriptor: RepositoryDescriptor,
    pub workdir: PathBuf,
}

pub struct RepositoryMirror {
    paths: PathProvisioner,
}

impl RepositoryMirror {
    pub fn new(paths: PathProvisioner) -> Self {
        Self { paths }
    }

    /// Bring the local mirror to the tip of the tracked reference.
    ///
    /// Provisions the directory chain, clones the remote (or opens the
    /// existing working copy on re-entry), fetches `origin` with the
    /// fetch-head marker updated, then force-checkouts the tracked
    /// reference. Every failure past clone-or-open is fatal; the working
    /// tree from a previous successful sync stays readable.
    pub fn sync(&self, descriptor: &RepositoryDescriptor) -> Result<MirrorHandle> {
        let root = self.paths.ensure_hierarchy(descriptor)?;
        let content = root.join("content");

        let repo = self.clone_or_open(descriptor, &content)?;
        self.fetch(&repo)?;
        self.checkout(&repo, descriptor.tracked_reference())?;

        info!(
            "Mirror for {} at {} of {}",
            descriptor.id(),
            descriptor.tracked_reference(),
            content.display()
        );

        Ok(MirrorHandle {
            descriptor: descriptor.clone(),
            workdir: content,
        })
    }

    fn clone_or_open(&self, descriptor: &RepositoryDescriptor, path: &Path) -> Result<Repository> {
        let url = descriptor.remote_url();

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(transfer_callbacks());

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_options);

        match builder.clone(&url, path) {
            Ok(repo) => {
                info!("Cloned {} into {}", url, path.display());
                Ok(repo)
            }
            // The working copy from a previous sync occupies the directory;
            // open it instead of re-cloning.
            Err(e) if e.code() == ErrorCode::Exists => {
                debug!("Working copy exists, opening {}", path.display());
                Repository::open(path)
                    .map_err(|e| MirrorError::Sync(format!("Failed to open repo: {}", e)))
            }
            Err(e) => Err(MirrorError::Sync(format!("Clone failed: {}", e))),
        }
    }

    fn fetch(&self, repo: &Repository) -> Result<()> {
        let mut remote = repo
            .find_remote("origin")
            .map_err(|e| MirrorError::Sync(format!("Failed to find remote: {}", e)))?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(transfer_callbacks());
        fetch_options.update_fetchhead(true);

        debug!("Fetching origin");
        remote
            .fetch(&[] as &[&str], Some(&mut fetch_options), None)
            .map_err(|e| MirrorError::Sync(format!("Fetch failed: {}", e)))?;

        Ok(())
    }

    fn checkout(&self, repo: &Repository, refname: &str) -> Result<()> {
        let (object, _) = repo
            .revparse_ext(refname)
            .map_err(|e| MirrorError::Sync(format!("Failed to resolve {}: {}", refname, e)))?;

        let commit = object
            .peel(git2::ObjectType::Commit)
            .map_err(|e| MirrorError::Sync(format!("{} is not a commit: {}", refname, e)))?
            .into_commit()
            .map_err(|_| MirrorError::Sync(format!("{} did not peel to a commit", refname)))?;

        // The mirror is a read-only cache, never hand-edited; local
        // modifications are overwritten and HEAD is left detached at the tip.
        let mut checkout = git2::build::CheckoutBuilder::default();
        checkout.force();
        repo.checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(|e| MirrorError::Sync(format!("Checkout failed: {}", e)))?;

        repo.set_head_detached(commit.id())
            .map_err(|e| MirrorError::Sync(format!("Failed to set HEAD: {}", e)))?;

        debug!("Checked out {} at {}", refname, commit.id());
        Ok(())
    }
}

fn transfer_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(|stats| {
        if stats.received_objects() == stats.total_objects() {
            debug!(
                "Resolving deltas {}/{}",
                stats.indexed_deltas(),
                stats.total_deltas()
            );
        } else if stats.total_objects() > 0 {
            debug!(
                "Received {}/{} objects",
                stats.received_objects(),
                stats.total_objects()
            );
        }
        true
    });
    callbacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Commit, IndexAddOption, RepositoryInitOptions, Signature};
    use std::fs;
    use tempfile::TempDir;

    fn init_upstream(dir: &Path) -> Repository {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("master");
        let repo = Repository::init_opts(dir, &opts).unwrap();

        fs::create_dir(dir.join("tests")).unwrap();
        fs::write(dir.join("tests/a.txt"), "hello").unwrap();
        commit_all(&repo, "initial");
        repo
    }

    fn commit_all(repo: &Repository, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("tester", "tester@example.com").unwrap();

        let parents: Vec<Commit> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&Commit> = parents.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
    }

    fn local_descriptor(upstream: &Path) -> RepositoryDescriptor {
        let mut descriptor = RepositoryDescriptor::new("github", "acme", "widgets");
        descriptor.remote = Some(upstream.to_string_lossy().to_string());
        descriptor
    }

    #[test]
    fn test_sync_clones_fresh_mirror() {
        let upstream_dir = TempDir::new().unwrap();
        init_upstream(upstream_dir.path());

        let storage = TempDir::new().unwrap();
        let mirror = RepositoryMirror::new(PathProvisioner::new(storage.path()));

        let handle = mirror.sync(&local_descriptor(upstream_dir.path())).unwrap();

        assert!(handle.workdir.ends_with("github/acme/widgets/content"));
        assert_eq!(
            fs::read_to_string(handle.workdir.join("tests/a.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_second_sync_opens_instead_of_recloning() {
        let upstream_dir = TempDir::new().unwrap();
        init_upstream(upstream_dir.path());

        let storage = TempDir::new().unwrap();
        let mirror = RepositoryMirror::new(PathProvisioner::new(storage.path()));
        let descriptor = local_descriptor(upstream_dir.path());

        let first = mirror.sync(&descriptor).unwrap();

        // An untracked marker survives a force checkout but not a re-clone.
        let marker = first.workdir.join(".marker");
        fs::write(&marker, "still here").unwrap();

        let second = mirror.sync(&descriptor).unwrap();
        assert_eq!(first.workdir, second.workdir);
        assert!(marker.exists());
    }

    #[test]
    fn test_sync_fast_forwards_to_upstream_tip() {
        let upstream_dir = TempDir::new().unwrap();
        let upstream = init_upstream(upstream_dir.path());

        let storage = TempDir::new().unwrap();
        let mirror = RepositoryMirror::new(PathProvisioner::new(storage.path()));
        let descriptor = local_descriptor(upstream_dir.path());

        let handle = mirror.sync(&descriptor).unwrap();
        assert!(!handle.workdir.join("tests/b.yaml").exists());

        fs::write(upstream_dir.path().join("tests/b.yaml"), "k: 1\n").unwrap();
        commit_all(&upstream, "add b.yaml");

        let handle = mirror.sync(&descriptor).unwrap();
        assert_eq!(
            fs::read_to_string(handle.workdir.join("tests/b.yaml")).unwrap(),
            "k: 1\n"
        );
    }

    #[test]
    fn test_sync_overwrites_local_modifications() {
        let upstream_dir = TempDir::new().unwrap();
        init_upstream(upstream_dir.path());

        let storage = TempDir::new().unwrap();
        let mirror = RepositoryMirror::new(PathProvisioner::new(storage.path()));
        let descriptor = local_descriptor(upstream_dir.path());

        let handle = mirror.sync(&descriptor).unwrap();
        fs::write(handle.workdir.join("tests/a.txt"), "tampered").unwrap();

        let handle = mirror.sync(&descriptor).unwrap();
        assert_eq!(
            fs::read_to_string(handle.workdir.join("tests/a.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_unresolvable_reference_is_fatal() {
        let upstream_dir = TempDir::new().unwrap();
        init_upstream(upstream_dir.path());

        let storage = TempDir::new().unwrap();
        let mirror = RepositoryMirror::new(PathProvisioner::new(storage.path()));

        let mut descriptor = local_descriptor(upstream_dir.path());
        descriptor.reference = Some("origin/no-such-branch".to_string());

        let result = mirror.sync(&descriptor);
        assert!(matches!(result, Err(MirrorError::Sync(_))));
    }

    #[test]
    fn test_unreachable_remote_is_fatal() {
        let storage = TempDir::new().unwrap();
        let mirror = RepositoryMirror::new(PathProvisioner::new(storage.path()));

        let mut descriptor = RepositoryDescriptor::new("github", "acme", "widgets");
        descriptor.remote = Some("/nonexistent/upstream".to_string());

        let result = mirror.sync(&descriptor);
        assert!(matches!(result, Err(MirrorError::Sync(_))));
    }
}
