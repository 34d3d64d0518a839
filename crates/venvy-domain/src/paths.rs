use std::fs;
use std::path::{Path, PathBuf};

/// Identity key for environment and interpreter dedup: the canonical
/// (symlink-resolved) path. Paths that do not exist fall back to their
/// absolutized spelling so stale registry entries still compare stably.
pub fn canonical_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| absolute_path(path))
}

/// Absolutizes without touching symlinks. Relative paths resolve against the
/// current working directory.
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
