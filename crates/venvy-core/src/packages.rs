use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use venvy_domain::PackageInfo;

use crate::discovery::venv_python;
use crate::error::VenvError;
use crate::process::run_with_timeout;

const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const INSTALL_TIMEOUT: Duration = Duration::from_secs(300);
const REMOVE_TIMEOUT: Duration = Duration::from_secs(60);
const UPGRADE_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Deserialize)]
struct PipListEntry {
    name: String,
    version: String,
}

/// Installed packages as reported by the environment's own pip. Best-effort:
/// a missing interpreter, non-zero exit, timeout, or malformed payload all
/// yield an empty list rather than an error, so callers must read "empty" as
/// "unknown or none", never as a hard zero.
pub fn list_packages(env: &Path) -> Vec<PackageInfo> {
    list_packages_with_timeout(env, LIST_TIMEOUT)
}

fn list_packages_with_timeout(env: &Path, timeout: Duration) -> Vec<PackageInfo> {
    let python = venv_python(env);
    if !python.is_file() {
        return Vec::new();
    }
    let output = match run_with_timeout(&python, &["-m", "pip", "list", "--format=json"], timeout) {
        Ok(output) => output,
        Err(err) => {
            debug!(env = %env.display(), %err, "pip list failed to start");
            return Vec::new();
        }
    };
    if !output.success() {
        debug!(env = %env.display(), code = output.code, timed_out = output.timed_out, "pip list failed");
        return Vec::new();
    }
    serde_json::from_str::<Vec<PipListEntry>>(&output.stdout)
        .map(|entries| {
            entries
                .into_iter()
                .map(|entry| PackageInfo {
                    name: entry.name,
                    version: entry.version,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `pip install <spec>` with the literal spec string (name, optionally with a
/// version constraint). Returns pip's combined output on success.
pub fn install_package(env: &Path, spec: &str) -> Result<String, VenvError> {
    info!(env = %env.display(), spec, "installing package");
    run_pip(env, &["-m", "pip", "install", spec], INSTALL_TIMEOUT, |output| {
        VenvError::InstallFailed { output }
    })
}

/// `pip uninstall -y <name>`; non-interactive by construction.
pub fn remove_package(env: &Path, name: &str) -> Result<String, VenvError> {
    info!(env = %env.display(), name, "removing package");
    run_pip(
        env,
        &["-m", "pip", "uninstall", "-y", name],
        REMOVE_TIMEOUT,
        |output| VenvError::RemoveFailed { output },
    )
}

/// `pip install --upgrade <name>`.
pub fn upgrade_package(env: &Path, name: &str) -> Result<String, VenvError> {
    info!(env = %env.display(), name, "upgrading package");
    run_pip(
        env,
        &["-m", "pip", "install", "--upgrade", name],
        UPGRADE_TIMEOUT,
        |output| VenvError::UpgradeFailed { output },
    )
}

/// Sequential bulk removal: one pip invocation per package, aborting on the
/// first failure. Earlier removals are not rolled back.
pub fn remove_packages(env: &Path, names: &[String]) -> Result<(), VenvError> {
    for name in names {
        remove_package(env, name)?;
    }
    Ok(())
}

/// Sequential bulk upgrade with the same abort-on-first-failure policy.
pub fn upgrade_packages(env: &Path, names: &[String]) -> Result<(), VenvError> {
    for name in names {
        upgrade_package(env, name)?;
    }
    Ok(())
}

fn run_pip(
    env: &Path,
    args: &[&str],
    timeout: Duration,
    make_err: impl Fn(String) -> VenvError,
) -> Result<String, VenvError> {
    let python = venv_python(env);
    if !python.is_file() {
        return Err(VenvError::InterpreterUnavailable { path: python });
    }
    let output = run_with_timeout(&python, args, timeout)
        .map_err(|err| make_err(format!("failed to start {}: {err}", python.display())))?;
    if output.timed_out {
        return Err(make_err(format!(
            "timed out after {}s\n{}",
            timeout.as_secs(),
            output.combined()
        )));
    }
    if output.code != 0 {
        return Err(make_err(output.combined()));
    }
    Ok(output.combined())
}
