use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Which probe pattern surfaced an interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum InstallSource {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "homebrew")]
    Homebrew,
    #[serde(rename = "python.org")]
    PythonOrg,
    #[serde(rename = "pyenv")]
    Pyenv,
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::System => "system",
            Self::Homebrew => "homebrew",
            Self::PythonOrg => "python.org",
            Self::Pyenv => "pyenv",
        };
        f.write_str(label)
    }
}

/// A verified Python interpreter on disk. Identity is the canonical path of
/// `path`; the locator keeps the first install seen per canonical target.
#[derive(Clone, Debug, Serialize)]
pub struct PythonInstall {
    pub path: PathBuf,
    pub version: String,
    pub source: InstallSource,
}

impl PythonInstall {
    pub fn display_name(&self) -> String {
        format!("Python {} ({})", self.version, self.source)
    }
}

/// First three dotted components as a comparable tuple. Anything that does
/// not parse cleanly collapses to `(0, 0, 0)` so unknown versions sort last.
pub fn version_tuple(version: &str) -> (u32, u32, u32) {
    let mut parts = [0u32; 3];
    for (slot, raw) in parts.iter_mut().zip(version.split('.')) {
        match raw.parse::<u32>() {
            Ok(value) => *slot = value,
            Err(_) => return (0, 0, 0),
        }
    }
    (parts[0], parts[1], parts[2])
}

/// Descending by version; the sort is stable so scan-order priority survives
/// among equal versions.
pub fn sort_by_version(installs: &mut [PythonInstall]) {
    installs.sort_by(|a, b| version_tuple(&b.version).cmp(&version_tuple(&a.version)));
}
