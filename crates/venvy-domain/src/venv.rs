use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How an environment entered the visible set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Provenance {
    #[serde(rename = "discovered")]
    Discovered,
    #[serde(rename = "managed")]
    Managed,
    #[serde(rename = "managed (missing)")]
    ManagedMissing,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Discovered => "discovered",
            Self::Managed => "managed",
            Self::ManagedMissing => "managed (missing)",
        };
        f.write_str(label)
    }
}

/// Snapshot of one environment. Rebuilt from disk on every discovery or list
/// pass and never mutated in place; the next refresh supersedes it entirely.
#[derive(Clone, Debug, Serialize)]
pub struct VenvInfo {
    pub name: String,
    pub path: PathBuf,
    pub python_version: String,
    pub python_home: String,
    pub is_valid: bool,
    pub provenance: Provenance,
}

/// One installed package as reported by the environment's pip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
}
