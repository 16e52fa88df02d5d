//! Purpose: Shared storage-directory and storage-key path resolution helpers.
//! Exports: `default_storage_dir` and `resolve_key_path`.
//! Role: Keep CLI and file-backed storage path semantics aligned from one source.
//! Invariants: Default storage directory remains `~/.prestige/storage`.
//! Invariants: Storage keys must be non-empty and must not contain path separators.

use std::path::{Path, PathBuf};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyResolveError {
    Empty,
    ContainsPathSeparator,
}

pub fn default_storage_dir() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".prestige").join("storage")
}

pub fn resolve_key_path(key: &str, storage_dir: &Path) -> Result<PathBuf, KeyResolveError> {
    if key.is_empty() {
        return Err(KeyResolveError::Empty);
    }
    if key.contains('/') || key.contains('\\') {
        return Err(KeyResolveError::ContainsPathSeparator);
    }
    Ok(storage_dir.join(format!("{key}.json")))
}
