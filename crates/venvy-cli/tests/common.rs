#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::assert::Assert;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;

/// A `venvy` invocation pinned to an isolated config file so tests never
/// touch the real one.
pub fn venvy_cmd(config: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("venvy");
    cmd.arg("--config").arg(config);
    cmd
}

pub fn write_config(path: &Path, managed: &[PathBuf], scan_dirs: &[PathBuf], max_depth: usize) {
    let payload = serde_json::json!({
        "managed_venvs": managed,
        "scan_directories": scan_dirs,
        "scan_max_depth": max_depth,
        "default_venv_location": path.parent().map(|p| p.join("Envs")),
    });
    fs::write(
        path,
        serde_json::to_string_pretty(&payload).expect("serialize config"),
    )
    .expect("write config");
}

/// Lays down a minimal environment: `pyvenv.cfg` plus an executable
/// interpreter stub under `bin/`.
pub fn make_venv(parent: &Path, name: &str, version: &str) -> PathBuf {
    let env = parent.join(name);
    fs::create_dir_all(env.join("bin")).expect("create env dirs");
    fs::write(
        env.join("pyvenv.cfg"),
        format!("home = /usr/bin\nversion = {version}\n"),
    )
    .expect("write pyvenv.cfg");
    write_python_stub(&env, "#!/bin/sh\nexit 0\n");
    env
}

/// Replaces the environment's interpreter with an arbitrary shell script.
pub fn write_python_stub(env: &Path, script: &str) {
    let python = env.join("bin").join("python");
    fs::write(&python, script).expect("write python stub");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).expect("chmod python");
    }
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn managed_paths(config: &Path) -> Vec<String> {
    let contents = fs::read_to_string(config).expect("read config");
    let value: Value = serde_json::from_str(&contents).expect("valid config json");
    value["managed_venvs"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
