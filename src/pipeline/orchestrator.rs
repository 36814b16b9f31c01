// file: src/pipeline/orchestrator.rs
// description: coordinates provisioning, sync and extraction for one refresh
// reference: orchestrates the end-to-end mirror refresh workflow

use crate::error::{MirrorError, Result};
use crate::mirror::{FixtureExtractor, PathProvisioner, RepositoryMirror};
use crate::models::RepositoryDescriptor;
use crate::registry::RepositoryRegistry;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

/// Result of one successful refresh, echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub duration_ms: u64,
    pub repository: RepositoryDescriptor,
}

/// Caller-facing entry point composing PathProvisioner, RepositoryMirror and
/// FixtureExtractor into the refresh operation, plus the snapshot read path.
///
/// Refreshes of the same descriptor are serialized through a per-key lock;
/// refreshes of different descriptors proceed independently.
pub struct SyncOrchestrator {
    paths: PathProvisioner,
    registry: Arc<RepositoryRegistry>,
    inflight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SyncOrchestrator {
    pub fn new(storage_root: impl Into<PathBuf>, registry: Arc<RepositoryRegistry>) -> Self {
        Self {
            paths: PathProvisioner::new(storage_root),
            registry,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    /// Run provision -> sync -> extract -> publish in strict order. Any stage
    /// error aborts the refresh and surfaces unchanged; there is no retry and
    /// no partial snapshot write.
    pub async fn refresh(&self, descriptor: &RepositoryDescriptor) -> Result<RefreshOutcome> {
        let lock = self.refresh_lock(&descriptor.id());
        let _guard = lock.lock().await;

        info!("Refreshing {}", descriptor.id());
        let start = Instant::now();

        let descriptor_for_task = descriptor.clone();
        let paths = self.paths.clone();

        // git2 and the fixture scan are blocking; keep them off the runtime.
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mirror = RepositoryMirror::new(paths.clone());
            let handle = mirror.sync(&descriptor_for_task)?;

            FixtureExtractor::new().extract_and_publish(
                &handle.workdir,
                descriptor_for_task.fixture_folder(),
                &paths.snapshot_path(&descriptor_for_task),
            )
        })
        .await
        .map_err(|e| MirrorError::Sync(format!("Refresh task failed: {}", e)))??;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Refreshed {} in {} ms", descriptor.id(), duration_ms);

        Ok(RefreshOutcome {
            duration_ms,
            repository: descriptor.clone(),
        })
    }

    /// Registry lookup then refresh. Unknown repositories are `NotFound`.
    pub async fn refresh_by_id(&self, id: &str) -> Result<RefreshOutcome> {
        let descriptor = self
            .registry
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| MirrorError::NotFound(format!("repository {} is not tracked", id)))?;
        self.refresh(&descriptor).await
    }

    /// Read the published snapshot without triggering a sync.
    pub async fn read_snapshot(&self, descriptor: &RepositoryDescriptor) -> Result<Vec<u8>> {
        let path = self.paths.snapshot_path(descriptor);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No snapshot published yet for {}", descriptor.id());
                Err(MirrorError::NotFound(format!(
                    "no snapshot for {}",
                    descriptor.id()
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn refresh_lock(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
