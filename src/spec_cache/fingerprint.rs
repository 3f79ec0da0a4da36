use super::CacheFault;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory whose content a spec document's fingerprint covers.
pub fn spec_dir(document: &Path) -> PathBuf {
    match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Hex SHA-256 digest over every regular file under `dir`.
///
/// Files are visited in lexicographic path order, so the digest does not
/// depend on how the filesystem enumerates entries. Each file contributes its
/// path relative to `dir` and the digest of its content, which makes renames
/// and moves change the fingerprint too.
pub fn fingerprint_dir(dir: &Path) -> Result<String, CacheFault> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|source| CacheFault::Walk {
            dir: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();

    let mut combined = Sha256::new();
    for path in &files {
        let content = fs::read(path).map_err(|source| CacheFault::ReadSpecFile {
            path: path.clone(),
            source,
        })?;
        let relative = path.strip_prefix(dir).unwrap_or(path);
        combined.update(relative.to_string_lossy().replace('\\', "/").as_bytes());
        combined.update([0u8]);
        combined.update(Sha256::digest(&content));
    }
    Ok(hex::encode(combined.finalize()))
}
