use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;
use venvy_domain::ManagedPaths;

/// Cross-session state owned by the CLI collaborator: the managed registry,
/// scan roots, depth bound, and default creation location. Unknown keys in
/// the file are ignored and missing keys fall back to defaults, so older or
/// hand-edited files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VenvyConfig {
    pub managed_venvs: ManagedPaths,
    pub scan_directories: Vec<PathBuf>,
    pub scan_max_depth: usize,
    pub default_venv_location: PathBuf,
}

impl Default for VenvyConfig {
    fn default() -> Self {
        let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            managed_venvs: ManagedPaths::default(),
            scan_directories: vec![home.clone()],
            scan_max_depth: 3,
            default_venv_location: home.join("Envs"),
        }
    }
}

impl VenvyConfig {
    pub fn default_path() -> PathBuf {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("venvy")
            .join("config.json")
    }

    /// Loads the file at `path`, falling back to defaults when it is missing
    /// or unreadable. A corrupt config never blocks startup.
    pub fn load(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "config unreadable, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload).with_context(|| format!("failed to write {}", path.display()))
    }
}

/// `~` and `~/...` resolve against the home directory; everything else is
/// passed through untouched.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    let Some(home) = dirs_next::home_dir() else {
        return path.to_path_buf();
    };
    if text == "~" {
        home
    } else if let Some(rest) = text.strip_prefix("~/") {
        home.join(rest)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = VenvyConfig::load(&temp.path().join("config.json"));
        assert_eq!(config.scan_max_depth, 3);
        assert!(config.managed_venvs.is_empty());
    }

    #[test]
    fn load_corrupt_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.json");
        fs::write(&path, "{not json").expect("write");
        let config = VenvyConfig::load(&path);
        assert_eq!(config.scan_max_depth, 3);
    }

    #[test]
    fn partial_files_merge_over_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"scan_max_depth": 5}"#).expect("write");
        let config = VenvyConfig::load(&path);
        assert_eq!(config.scan_max_depth, 5);
        assert!(!config.scan_directories.is_empty());
    }

    #[test]
    fn save_round_trips_and_creates_parents() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("config.json");

        let mut config = VenvyConfig {
            scan_max_depth: 4,
            ..VenvyConfig::default()
        };
        config.managed_venvs.add(Path::new("/tmp/envs/a"));
        config.save(&path).expect("save");

        let back = VenvyConfig::load(&path);
        assert_eq!(back.scan_max_depth, 4);
        assert_eq!(back.managed_venvs, config.managed_venvs);
    }

    #[test]
    fn tilde_expansion_only_touches_leading_tildes() {
        let home = dirs_next::home_dir().expect("home");
        assert_eq!(expand_tilde(Path::new("~")), home);
        assert_eq!(expand_tilde(Path::new("~/envs")), home.join("envs"));
        assert_eq!(
            expand_tilde(Path::new("/opt/~/weird")),
            PathBuf::from("/opt/~/weird")
        );
    }
}
