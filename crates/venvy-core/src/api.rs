// Intended public API surface for `venvy-core`.
//
// This module keeps the crate root small and makes it explicit which
// types/functions are part of the stable interface used by the CLI and other
// collaborators.

pub use crate::config::{expand_tilde, VenvyConfig};
pub use crate::discovery::{describe_venv, discover, load_managed, merge_venvs, venv_python};
pub use crate::error::VenvError;
pub use crate::lifecycle::{create_venv, delete_venv, CreateOptions};
pub use crate::locator::detect;
pub use crate::outcome::{CommandStatus, ExecutionOutcome};
pub use crate::packages::{
    install_package, list_packages, remove_package, remove_packages, upgrade_package,
    upgrade_packages,
};
pub use crate::shell::{activate_in_terminal, reveal};
pub use crate::supervisor::{StatusObserver, TaskId, TaskSupervisor};

pub use venvy_domain::{
    canonical_key, version_tuple, InstallSource, ManagedPaths, PackageInfo, Provenance,
    PythonInstall, PyvenvCfg, VenvInfo, PYVENV_CFG,
};
