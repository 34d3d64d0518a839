use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use venvy_domain::{absolute_path, canonical_key, Provenance, PyvenvCfg, VenvInfo, PYVENV_CFG};
use walkdir::{DirEntry, WalkDir};

use crate::config::expand_tilde;
use crate::fs::is_executable;

/// Directory names that are never worth descending into: VCS metadata,
/// caches, build artifacts, and large personal-data folders.
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "__pycache__",
    ".tox",
    ".nox",
    ".eggs",
    "dist",
    "build",
    ".mypy_cache",
    ".pytest_cache",
    "Library",
    "Applications",
    ".Trash",
    ".cache",
    ".npm",
    ".cargo",
    ".rustup",
    ".local",
    ".pyenv",
    ".nvm",
    "Pictures",
    "Music",
    "Movies",
    ".docker",
];

/// Hidden directories that still commonly hold environments; these beat both
/// the denylist and the hidden-directory rule.
const HIDDEN_VENV_DIRS: &[&str] = &[".venv", ".env"];

/// Builds the descriptor for an environment rooted at `path`, or `None` when
/// `pyvenv.cfg` is missing or parses to nothing.
pub fn describe_venv(path: &Path, provenance: Provenance) -> Option<VenvInfo> {
    let contents = fs::read_to_string(path.join(PYVENV_CFG)).ok()?;
    let cfg = PyvenvCfg::parse(&contents);
    if cfg.is_empty() {
        return None;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some(VenvInfo {
        name,
        path: absolute_path(path),
        python_version: cfg.version(),
        python_home: cfg.home(),
        is_valid: is_executable(&venv_python(path)),
        provenance,
    })
}

/// The environment's bundled interpreter, resolved from the environment path
/// alone. Callers check for existence before invoking it.
pub fn venv_python(env: &Path) -> PathBuf {
    if cfg!(windows) {
        env.join("Scripts").join("python.exe")
    } else {
        env.join("bin").join("python")
    }
}

/// Walks each root looking for environment directories. Symlinks are not
/// followed, depth counts path separators from the root, and a directory at
/// `max_depth` is neither descended into nor reported. A `pyvenv.cfg` marks
/// an environment leaf: nothing beneath it is visited. Results keep traversal
/// order; duplicates by canonical path are dropped within one call.
pub fn discover(roots: &[PathBuf], max_depth: usize) -> Vec<VenvInfo> {
    let mut results = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for root in roots {
        let root = expand_tilde(root);
        if !root.is_dir() {
            continue;
        }
        debug!(root = %root.display(), max_depth, "scanning for environments");

        let mut walker = WalkDir::new(&root)
            .follow_links(false)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(keep_entry);
        while let Some(entry) = walker.next() {
            let Ok(entry) = entry else {
                continue;
            };
            if !entry.file_type().is_dir() || entry.depth() >= max_depth {
                continue;
            }
            if entry.path().join(PYVENV_CFG).is_file() {
                if seen.insert(canonical_key(entry.path())) {
                    if let Some(info) = describe_venv(entry.path(), Provenance::Discovered) {
                        results.push(info);
                    }
                }
                walker.skip_current_dir();
            }
        }
    }

    results
}

fn keep_entry(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if HIDDEN_VENV_DIRS.contains(&name.as_ref()) {
        return true;
    }
    !(name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref()))
}

/// Descriptors for every explicitly registered path. Paths that no longer
/// hold an environment come back as `ManagedMissing` placeholders so the
/// caller can show them and offer to prune.
pub fn load_managed(paths: &[PathBuf]) -> Vec<VenvInfo> {
    let mut results = Vec::new();
    for path in paths {
        if path.is_dir() && path.join(PYVENV_CFG).is_file() {
            if let Some(info) = describe_venv(path, Provenance::Managed) {
                results.push(info);
            }
        } else {
            results.push(VenvInfo {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: path.clone(),
                python_version: "unknown".to_string(),
                python_home: String::new(),
                is_valid: false,
                provenance: Provenance::ManagedMissing,
            });
        }
    }
    results
}

/// Merge policy for the visible set: managed entries first, one descriptor
/// per canonical path (so managed wins over discovered), sorted
/// case-insensitively by name.
pub fn merge_venvs(managed: Vec<VenvInfo>, discovered: Vec<VenvInfo>) -> Vec<VenvInfo> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut merged: Vec<VenvInfo> = managed
        .into_iter()
        .chain(discovered)
        .filter(|info| seen.insert(canonical_key(&info.path)))
        .collect();
    merged.sort_by_key(|info| info.name.to_lowercase());
    merged
}
