use super::CacheFault;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// File-name prefix shared by every durable entry.
pub const CACHE_NAMESPACE: &str = "brrtrouter_contract_cache";

/// What a durable entry holds: the validator and the fingerprint of the
/// spec directory it was built from.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub fingerprint: String,
    pub validator: V,
}

/// Durable entries under one directory, scoped to one execution partition.
#[derive(Debug, Clone)]
pub struct DurableStore {
    dir: PathBuf,
    partition: String,
}

impl DurableStore {
    pub fn new(dir: impl Into<PathBuf>, partition: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            partition: sanitize_partition(&partition.into()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// `{dir}/brrtrouter_contract_cache_{partition}.{document path}.json`
    ///
    /// The `.` after the partition keeps `1` + `1_api.yaml` apart from
    /// `11` + `_api.yaml`.
    pub fn entry_path(&self, document: &Path) -> PathBuf {
        let document = document
            .to_string_lossy()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                other => other,
            })
            .collect::<String>();
        self.dir.join(format!(
            "{CACHE_NAMESPACE}_{}.{document}.json",
            self.partition
        ))
    }

    /// Read the entry at `path`. `Ok(None)` when there is none.
    pub fn read<V: DeserializeOwned>(&self, path: &Path) -> Result<Option<CacheEntry<V>>, CacheFault> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheFault::ReadEntry {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| CacheFault::DecodeEntry {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Replace the entry at `path` as a whole.
    ///
    /// The entry is written to a temporary file in the same directory and
    /// renamed into place, so readers never observe a partial entry.
    pub fn write<V: Serialize>(&self, path: &Path, fingerprint: &str, validator: &V) -> Result<(), CacheFault> {
        let entry = CacheEntry {
            fingerprint: fingerprint.to_string(),
            validator,
        };
        let bytes = serde_json::to_vec(&entry).map_err(|source| CacheFault::EncodeEntry {
            path: path.to_path_buf(),
            source,
        })?;

        let write_fault = |source: io::Error| CacheFault::WriteEntry {
            path: path.to_path_buf(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_fault)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_fault)?;
        tmp.write_all(&bytes).map_err(write_fault)?;
        tmp.persist(path).map_err(|e| write_fault(e.error))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Wrote spec cache entry");
        Ok(())
    }
}

/// Partition tokens become part of a file name: keep `[A-Za-z0-9-]`.
fn sanitize_partition(partition: &str) -> String {
    partition
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
