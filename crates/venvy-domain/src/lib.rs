#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod install;
pub mod paths;
pub mod pyvenv;
pub mod registry;
pub mod venv;

pub use install::{sort_by_version, version_tuple, InstallSource, PythonInstall};
pub use paths::{absolute_path, canonical_key};
pub use pyvenv::{PyvenvCfg, PYVENV_CFG};
pub use registry::ManagedPaths;
pub use venv::{PackageInfo, Provenance, VenvInfo};
