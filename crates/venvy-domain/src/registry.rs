use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::{absolute_path, canonical_key};

/// Ordered set of explicitly registered environment paths. Membership is
/// decided by canonical path so a symlinked spelling of an already-managed
/// environment is rejected; insertion order is preserved for display.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagedPaths {
    paths: Vec<PathBuf>,
}

impl ManagedPaths {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        let mut registry = Self::default();
        for path in paths {
            registry.add(&path);
        }
        registry
    }

    /// Returns false when an equivalent path is already registered.
    pub fn add(&mut self, path: &Path) -> bool {
        let key = canonical_key(path);
        if self.paths.iter().any(|p| canonical_key(p) == key) {
            return false;
        }
        self.paths.push(absolute_path(path));
        true
    }

    /// Returns false when no equivalent path was registered.
    pub fn remove(&mut self, path: &Path) -> bool {
        let key = canonical_key(path);
        let before = self.paths.len();
        self.paths.retain(|p| canonical_key(p) != key);
        self.paths.len() != before
    }

    pub fn contains(&self, path: &Path) -> bool {
        let key = canonical_key(path);
        self.paths.iter().any(|p| canonical_key(p) == key)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn add_is_idempotent_per_path() {
        let mut registry = ManagedPaths::default();
        assert!(registry.add(Path::new("/tmp/envs/a")));
        assert!(!registry.add(Path::new("/tmp/envs/a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_reports_whether_anything_matched() {
        let mut registry = ManagedPaths::default();
        registry.add(Path::new("/tmp/envs/a"));
        assert!(registry.remove(Path::new("/tmp/envs/a")));
        assert!(!registry.remove(Path::new("/tmp/envs/a")));
        assert!(registry.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_duplicate_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let real = temp.path().join("env");
        fs::create_dir(&real).expect("mkdir");
        let alias = temp.path().join("alias");
        std::os::unix::fs::symlink(&real, &alias).expect("symlink");

        let mut registry = ManagedPaths::default();
        assert!(registry.add(&real));
        assert!(!registry.add(&alias));
        assert!(registry.contains(&alias));
        assert!(registry.remove(&alias));
        assert!(registry.is_empty());
    }

    #[test]
    fn serializes_as_a_bare_list() {
        let mut registry = ManagedPaths::default();
        registry.add(Path::new("/tmp/envs/a"));
        let json = serde_json::to_string(&registry).expect("serialize");
        assert_eq!(json, "[\"/tmp/envs/a\"]");
        let back: ManagedPaths = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, registry);
    }
}
