use std::path::PathBuf;

/// A recoverable spec-cache failure.
///
/// Never returned to callers of
/// [`SpecValidatorCache::get_validator`](super::SpecValidatorCache::get_validator):
/// each one is logged and the validator is built directly instead.
#[derive(Debug, thiserror::Error)]
pub enum CacheFault {
    #[error("cannot walk spec directory {}: {source}", dir.display())]
    Walk {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("cannot read spec file {}: {source}", path.display())]
    ReadSpecFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read cache entry {}: {source}", path.display())]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache entry {} is corrupt: {source}", path.display())]
    DecodeEntry {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot encode cache entry {}: {source}", path.display())]
    EncodeEntry {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write cache entry {}: {source}", path.display())]
    WriteEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
