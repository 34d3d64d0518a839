use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};

use atty::Stream;
use color_eyre::{eyre::eyre, Result};
use serde_json::json;
use venvy_core::{
    activate_in_terminal, create_venv, delete_venv, detect, discover, expand_tilde,
    install_package, list_packages, load_managed, merge_venvs, remove_packages, reveal,
    upgrade_packages, CreateOptions, ExecutionOutcome, StatusObserver, TaskSupervisor, VenvError,
    VenvInfo, VenvyConfig, PYVENV_CFG,
};

use crate::cli::{
    CommandCli, CreateArgs, DeleteArgs, InstallArgs, ListArgs, ManageCommand, PackageNamesArgs,
    VenvyCli,
};

pub fn dispatch(cli: &VenvyCli) -> Result<ExecutionOutcome> {
    let config_path = cli.config.clone().unwrap_or_else(VenvyConfig::default_path);
    let mut config = VenvyConfig::load(&config_path);

    match &cli.command {
        CommandCli::Pythons => Ok(pythons_outcome()),
        CommandCli::List(args) => Ok(list_outcome(&config, args)),
        CommandCli::Create(args) => create(&mut config, &config_path, args, cli.quiet),
        CommandCli::Delete(args) => delete(&mut config, &config_path, args, cli.quiet),
        CommandCli::Manage(command) => manage(&mut config, &config_path, command),
        CommandCli::Packages(args) => Ok(packages_outcome(&expand_tilde(&args.env))),
        CommandCli::Install(args) => Ok(install(args, cli.quiet)),
        CommandCli::Remove(args) => Ok(bulk_pip(args, cli.quiet, PipBulk::Remove)),
        CommandCli::Upgrade(args) => Ok(bulk_pip(args, cli.quiet, PipBulk::Upgrade)),
        CommandCli::Reveal(args) => {
            let env = expand_tilde(&args.env);
            Ok(match reveal(&env) {
                Ok(()) => ExecutionOutcome::success(
                    format!("revealed {}", env.display()),
                    json!({ "path": env.display().to_string() }),
                ),
                Err(err) => ExecutionOutcome::from_error(&err),
            })
        }
        CommandCli::Activate(args) => {
            let env = expand_tilde(&args.env);
            Ok(match activate_in_terminal(&env) {
                Ok(()) => ExecutionOutcome::success(
                    format!("opened a terminal activated for {}", env.display()),
                    json!({ "path": env.display().to_string() }),
                ),
                Err(err) => ExecutionOutcome::from_error(&err),
            })
        }
    }
}

fn pythons_outcome() -> ExecutionOutcome {
    let installs = detect();
    let message = if installs.is_empty() {
        "no python interpreters found".to_string()
    } else {
        installs
            .iter()
            .map(|install| format!("{}  {}", install.display_name(), install.path.display()))
            .collect::<Vec<_>>()
            .join("\n")
    };
    ExecutionOutcome::success(message, json!({ "pythons": installs, "passthrough": true }))
}

fn list_outcome(config: &VenvyConfig, args: &ListArgs) -> ExecutionOutcome {
    let managed = load_managed(config.managed_venvs.paths());
    let discovered = if args.managed_only {
        Vec::new()
    } else {
        let roots: Vec<PathBuf> = if args.root.is_empty() {
            config.scan_directories.clone()
        } else {
            args.root.clone()
        };
        discover(&roots, args.max_depth.unwrap_or(config.scan_max_depth))
    };
    let merged = merge_venvs(managed, discovered);
    let message = if merged.is_empty() {
        "no environments found".to_string()
    } else {
        merged
            .iter()
            .map(format_venv_line)
            .collect::<Vec<_>>()
            .join("\n")
    };
    ExecutionOutcome::success(message, json!({ "environments": merged, "passthrough": true }))
}

fn format_venv_line(info: &VenvInfo) -> String {
    let marker = if info.is_valid { "" } else { "  (invalid)" };
    format!(
        "{}  {}  [{}]  {}{}",
        info.name,
        info.python_version,
        info.provenance,
        info.path.display(),
        marker
    )
}

fn create(
    config: &mut VenvyConfig,
    config_path: &Path,
    args: &CreateArgs,
    quiet: bool,
) -> Result<ExecutionOutcome> {
    let target = resolve_create_target(config, &args.target);
    if target.exists() {
        return Ok(ExecutionOutcome::user_error(
            format!("{} already exists", target.display()),
            json!({ "path": target.display().to_string() }),
        ));
    }
    let python = match &args.python {
        Some(python) => expand_tilde(python),
        None => match detect().into_iter().next() {
            Some(install) => install.path,
            None => {
                return Ok(ExecutionOutcome::user_error(
                    "no python interpreters found; pass --python",
                    json!({}),
                ))
            }
        },
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let options = CreateOptions {
        with_pip: !args.without_pip,
        system_site_packages: args.system_site_packages,
    };
    let result = run_supervised("Creating environment", quiet, {
        let target = target.clone();
        let python = python.clone();
        move || create_venv(&target, &python, options)
    });
    match result {
        Ok(info) => {
            config.managed_venvs.add(&info.path);
            persist(config, config_path)?;
            Ok(ExecutionOutcome::success(
                format!(
                    "created {} (Python {}) at {}",
                    info.name,
                    info.python_version,
                    info.path.display()
                ),
                json!({ "environment": info }),
            ))
        }
        Err(err) => Ok(ExecutionOutcome::from_error(&err)),
    }
}

/// Bare names land under the configured default location; anything with a
/// separator is taken as a path.
fn resolve_create_target(config: &VenvyConfig, target: &Path) -> PathBuf {
    if target.components().count() == 1 && !target.is_absolute() {
        expand_tilde(&config.default_venv_location).join(target)
    } else {
        expand_tilde(target)
    }
}

fn delete(
    config: &mut VenvyConfig,
    config_path: &Path,
    args: &DeleteArgs,
    quiet: bool,
) -> Result<ExecutionOutcome> {
    let path = expand_tilde(&args.path);
    if !args.yes {
        if !atty::is(Stream::Stdin) {
            return Ok(ExecutionOutcome::user_error(
                "refusing to delete without --yes in non-interactive mode",
                json!({ "path": path.display().to_string() }),
            ));
        }
        if !confirm(&format!(
            "Delete {} and everything under it?",
            path.display()
        ))? {
            return Ok(ExecutionOutcome::user_error(
                "deletion cancelled",
                json!({ "path": path.display().to_string() }),
            ));
        }
    }

    let result = run_supervised("Deleting environment", quiet, {
        let path = path.clone();
        move || delete_venv(&path)
    });
    match result {
        Ok(()) => {
            if config.managed_venvs.remove(&path) {
                persist(config, config_path)?;
            }
            Ok(ExecutionOutcome::success(
                format!("deleted {}", path.display()),
                json!({ "path": path.display().to_string() }),
            ))
        }
        Err(err) => Ok(ExecutionOutcome::from_error(&err)),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn manage(
    config: &mut VenvyConfig,
    config_path: &Path,
    command: &ManageCommand,
) -> Result<ExecutionOutcome> {
    match command {
        ManageCommand::Add(args) => {
            let path = expand_tilde(&args.path);
            if !config.managed_venvs.add(&path) {
                return Ok(ExecutionOutcome::user_error(
                    format!("{} is already managed", path.display()),
                    json!({ "path": path.display().to_string() }),
                ));
            }
            persist(config, config_path)?;
            let note = if path.join(PYVENV_CFG).is_file() {
                ""
            } else {
                " (no pyvenv.cfg there; it will show as managed (missing))"
            };
            Ok(ExecutionOutcome::success(
                format!("managing {}{}", path.display(), note),
                json!({ "path": path.display().to_string() }),
            ))
        }
        ManageCommand::Remove(args) => {
            let path = expand_tilde(&args.path);
            if !config.managed_venvs.remove(&path) {
                return Ok(ExecutionOutcome::user_error(
                    format!("{} is not managed", path.display()),
                    json!({ "path": path.display().to_string() }),
                ));
            }
            persist(config, config_path)?;
            Ok(ExecutionOutcome::success(
                format!("stopped managing {} (left on disk)", path.display()),
                json!({ "path": path.display().to_string() }),
            ))
        }
    }
}

fn packages_outcome(env: &Path) -> ExecutionOutcome {
    let packages = list_packages(env);
    let message = if packages.is_empty() {
        "no packages reported (environment may be missing or pip unavailable)".to_string()
    } else {
        packages
            .iter()
            .map(|package| format!("{} {}", package.name, package.version))
            .collect::<Vec<_>>()
            .join("\n")
    };
    ExecutionOutcome::success(message, json!({ "packages": packages, "passthrough": true }))
}

fn install(args: &InstallArgs, quiet: bool) -> ExecutionOutcome {
    let env = expand_tilde(&args.env);
    let spec = args.spec.clone();
    let result = run_supervised("Installing", quiet, {
        let env = env.clone();
        move || install_package(&env, &spec)
    });
    match result {
        Ok(output) => ExecutionOutcome::success(
            format!("installed {} into {}", args.spec, env.display()),
            json!({ "output": output }),
        ),
        Err(err) => ExecutionOutcome::from_error(&err),
    }
}

#[derive(Clone, Copy)]
enum PipBulk {
    Remove,
    Upgrade,
}

fn bulk_pip(args: &PackageNamesArgs, quiet: bool, mode: PipBulk) -> ExecutionOutcome {
    let env = expand_tilde(&args.env);
    let names = args.names.clone();
    let (label, verb) = match mode {
        PipBulk::Remove => ("Removing packages", "removed"),
        PipBulk::Upgrade => ("Upgrading packages", "upgraded"),
    };
    let result = run_supervised(label, quiet, {
        let env = env.clone();
        let names = names.clone();
        move || match mode {
            PipBulk::Remove => remove_packages(&env, &names),
            PipBulk::Upgrade => upgrade_packages(&env, &names),
        }
    });
    match result {
        Ok(()) => ExecutionOutcome::success(
            format!(
                "{} {} package(s) in {}",
                verb,
                names.len(),
                env.display()
            ),
            json!({ "packages": names }),
        ),
        Err(err) => ExecutionOutcome::from_error(&err),
    }
}

// Config writes carry anyhow context from the core; surface them as eyre
// reports at this boundary.
fn persist(config: &VenvyConfig, path: &Path) -> Result<()> {
    config.save(path).map_err(|err| eyre!("{err:?}"))
}

/// Runs a long operation through the supervisor so the status line shows
/// progress, then blocks for the single terminal callback.
fn run_supervised<T: Send + 'static>(
    label: &str,
    quiet: bool,
    op: impl FnOnce() -> Result<T, VenvError> + Send + 'static,
) -> Result<T, VenvError> {
    let supervisor = TaskSupervisor::with_observer(Arc::new(StderrStatus { quiet }));
    let (tx, rx) = mpsc::channel();
    let tx_err = tx.clone();
    supervisor.submit(
        label,
        op,
        move |value| {
            let _ = tx.send(Ok(value));
        },
        move |err| {
            let _ = tx_err.send(Err(err));
        },
    );
    match rx.recv() {
        Ok(result) => result,
        Err(_) => Err(VenvError::ToolInvocationFailed {
            tool: label.to_string(),
            message: "background task ended without reporting".to_string(),
        }),
    }
}

struct StderrStatus {
    quiet: bool,
}

impl StatusObserver for StderrStatus {
    fn busy(&self, message: &str) {
        if !self.quiet {
            eprintln!("{message}…");
        }
    }

    fn idle(&self) {}
}
