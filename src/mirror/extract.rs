// file: src/mirror/extract.rs
// description: fixture folder scanning, decoding and atomic snapshot publishing
// reference: https://docs.rs/walkdir

use crate::error::{MirrorError, Result};
use crate::models::{FixtureRecord, snapshot_to_json};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

const STRUCTURED_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(Debug, Default)]
pub struct FixtureExtractor;

impl FixtureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Collect one record per regular file in the fixture folder's direct
    /// entries. Non-file entries are silently skipped; records are ordered by
    /// file name so the snapshot is deterministic. A read or decode failure
    /// on any single file aborts the whole extraction.
    pub fn extract(&self, workdir: &Path, folder: &str) -> Result<Vec<FixtureRecord>> {
        let fixture_dir = workdir.join(folder);
        debug!("Scanning fixture folder {}", fixture_dir.display());

        if !fixture_dir.is_dir() {
            return Err(MirrorError::Extraction {
                path: fixture_dir,
                message: "fixture folder does not exist".to_string(),
            });
        }

        let mut records = Vec::new();

        for entry in WalkDir::new(&fixture_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let id = entry.file_name().to_string_lossy().to_string();
            records.push(read_record(id, entry.path())?);
        }

        info!(
            "Extracted {} fixture records from {}",
            records.len(),
            fixture_dir.display()
        );
        Ok(records)
    }

    /// Write the snapshot through a temp file in the same directory, then
    /// rename it into place. Concurrent readers see either the previous
    /// complete snapshot or the new one, never a truncated document.
    pub fn publish(&self, records: &[FixtureRecord], snapshot_path: &Path) -> Result<()> {
        let bytes = snapshot_to_json(records)?;

        let dir = snapshot_path.parent().ok_or_else(|| MirrorError::Extraction {
            path: snapshot_path.to_path_buf(),
            message: "snapshot path has no parent directory".to_string(),
        })?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&bytes)?;
        temp.persist(snapshot_path)
            .map_err(|e| MirrorError::Extraction {
                path: snapshot_path.to_path_buf(),
                message: format!("failed to publish snapshot: {}", e),
            })?;

        info!(
            "Published snapshot with {} records at {}",
            records.len(),
            snapshot_path.display()
        );
        Ok(())
    }

    pub fn extract_and_publish(
        &self,
        workdir: &Path,
        folder: &str,
        snapshot_path: &Path,
    ) -> Result<()> {
        let records = self.extract(workdir, folder)?;
        self.publish(&records, snapshot_path)
    }
}

fn read_record(id: String, path: &Path) -> Result<FixtureRecord> {
    let content = fs::read_to_string(path).map_err(|e| MirrorError::Extraction {
        path: path.to_path_buf(),
        message: format!("read failed: {}", e),
    })?;

    if is_structured(path) {
        let data: serde_json::Value =
            serde_yaml::from_str(&content).map_err(|e| MirrorError::Extraction {
                path: path.to_path_buf(),
                message: format!("YAML decode failed: {}", e),
            })?;
        Ok(FixtureRecord::structured(id, data))
    } else {
        Ok(FixtureRecord::text(id, content))
    }
}

fn is_structured(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| STRUCTURED_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
