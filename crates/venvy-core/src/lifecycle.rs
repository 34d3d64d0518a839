use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use tracing::info;
use venvy_domain::{Provenance, VenvInfo, PYVENV_CFG};

use crate::discovery::describe_venv;
use crate::error::VenvError;
use crate::fs::remove_dir_all_writable;
use crate::process::run_with_timeout;

const CREATE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy)]
pub struct CreateOptions {
    pub with_pip: bool,
    pub system_site_packages: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            with_pip: true,
            system_site_packages: false,
        }
    }
}

/// Creates a virtual environment at `target` using the given interpreter's
/// `venv` module. The target must not already exist and parent directories
/// must be in place; both are the caller's responsibility. On success the
/// fresh environment is re-read from disk — a clean tool exit without a
/// verifiable `pyvenv.cfg` is reported as `Inconsistent`.
pub fn create_venv(
    target: &Path,
    python: &Path,
    options: CreateOptions,
) -> Result<VenvInfo, VenvError> {
    let mut args: Vec<OsString> = vec![
        OsString::from("-m"),
        OsString::from("venv"),
        target.as_os_str().to_os_string(),
    ];
    if !options.with_pip {
        args.push(OsString::from("--without-pip"));
    }
    if options.system_site_packages {
        args.push(OsString::from("--system-site-packages"));
    }

    info!(target = %target.display(), python = %python.display(), "creating environment");
    let output = run_with_timeout(python, &args, CREATE_TIMEOUT).map_err(|err| {
        VenvError::CreationFailed {
            output: format!("failed to start {}: {err}", python.display()),
        }
    })?;
    if output.timed_out {
        return Err(VenvError::CreationFailed {
            output: format!(
                "timed out after {}s\n{}",
                CREATE_TIMEOUT.as_secs(),
                output.combined()
            ),
        });
    }
    if output.code != 0 {
        return Err(VenvError::CreationFailed {
            output: output.combined(),
        });
    }

    describe_venv(target, Provenance::Managed).ok_or_else(|| VenvError::Inconsistent {
        path: target.to_path_buf(),
    })
}

/// Removes the directory tree at `path`. The single guard against deleting
/// an arbitrary directory is the `pyvenv.cfg` check, performed here at the
/// moment of deletion rather than trusted from an earlier scan. Irreversible.
pub fn delete_venv(path: &Path) -> Result<(), VenvError> {
    if !path.join(PYVENV_CFG).is_file() {
        return Err(VenvError::SafetyCheck {
            path: path.to_path_buf(),
        });
    }
    info!(path = %path.display(), "deleting environment");
    remove_dir_all_writable(path)?;
    Ok(())
}
