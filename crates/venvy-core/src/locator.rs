use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;
use venvy_domain::{canonical_key, sort_by_version, InstallSource, PythonInstall};
use which::which;

use crate::fs::is_executable;
use crate::process::run_with_timeout;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// One probe pattern from the fixed scan list. Ordering of the list is the
/// dedup priority: the first pattern to reach a canonical target claims it.
enum Candidate {
    /// A single well-known location.
    Literal(PathBuf),
    /// `python3.X` siblings inside a directory (Homebrew-style suffixes).
    NumberedPrefix { dir: PathBuf, prefix: &'static str },
    /// `<root>/<version>/bin/python3` layouts: framework installs, pyenv.
    VersionedRoot(PathBuf),
    /// Whatever `python3` resolves to on PATH, as a final fallback.
    PathLookup,
}

fn search_patterns() -> Vec<(Candidate, InstallSource)> {
    let mut patterns = vec![
        (
            Candidate::Literal(PathBuf::from("/usr/bin/python3")),
            InstallSource::System,
        ),
        (
            Candidate::Literal(PathBuf::from("/opt/homebrew/bin/python3")),
            InstallSource::Homebrew,
        ),
        (
            Candidate::NumberedPrefix {
                dir: PathBuf::from("/opt/homebrew/bin"),
                prefix: "python3.",
            },
            InstallSource::Homebrew,
        ),
        (
            Candidate::Literal(PathBuf::from("/usr/local/bin/python3")),
            InstallSource::Homebrew,
        ),
        (
            Candidate::NumberedPrefix {
                dir: PathBuf::from("/usr/local/bin"),
                prefix: "python3.",
            },
            InstallSource::Homebrew,
        ),
        (
            Candidate::VersionedRoot(PathBuf::from(
                "/Library/Frameworks/Python.framework/Versions",
            )),
            InstallSource::PythonOrg,
        ),
    ];
    if let Some(home) = dirs_next::home_dir() {
        let pyenv_root = home.join(".pyenv").join("versions");
        if pyenv_root.is_dir() {
            patterns.push((Candidate::VersionedRoot(pyenv_root), InstallSource::Pyenv));
        }
    }
    patterns.push((Candidate::PathLookup, InstallSource::System));
    patterns
}

/// Probe the machine for Python interpreters. Best-effort by contract: every
/// per-candidate failure (missing binary, permission problem, bad output,
/// timeout) is skipped silently, so this never fails, only returns less.
/// Results are deduplicated by canonical path and sorted newest-first.
pub fn detect() -> Vec<PythonInstall> {
    collect_installs(&search_patterns())
}

fn collect_installs(patterns: &[(Candidate, InstallSource)]) -> Vec<PythonInstall> {
    let mut installs = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for (candidate, source) in patterns {
        for path in expand_candidate(candidate) {
            if !is_executable(&path) {
                continue;
            }
            let key = canonical_key(&path);
            if seen.contains(&key) {
                continue;
            }
            let Some(version) = probe_version(&path) else {
                continue;
            };
            seen.insert(key);
            installs.push(PythonInstall {
                path,
                version,
                source: *source,
            });
        }
    }

    sort_by_version(&mut installs);
    installs
}

fn expand_candidate(candidate: &Candidate) -> Vec<PathBuf> {
    match candidate {
        Candidate::Literal(path) => {
            if path.exists() {
                vec![path.clone()]
            } else {
                Vec::new()
            }
        }
        Candidate::NumberedPrefix { dir, prefix } => {
            let mut matches = sorted_entries(dir);
            matches.retain(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| {
                        name.starts_with(prefix) && name.ends_with(|c: char| c.is_ascii_digit())
                    })
            });
            matches
        }
        Candidate::VersionedRoot(root) => sorted_entries(root)
            .into_iter()
            .map(|entry| entry.join("bin").join("python3"))
            .filter(|path| path.exists())
            .collect(),
        Candidate::PathLookup => which("python3").map(|path| vec![path]).unwrap_or_default(),
    }
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
    paths.sort();
    paths
}

fn probe_version(path: &Path) -> Option<String> {
    let output = match run_with_timeout(path, &["--version"], PROBE_TIMEOUT) {
        Ok(output) => output,
        Err(err) => {
            debug!(path = %path.display(), %err, "interpreter probe failed to start");
            return None;
        }
    };
    if !output.success() {
        debug!(path = %path.display(), code = output.code, timed_out = output.timed_out, "interpreter probe failed");
        return None;
    }
    Some(parse_version_output(&output.stdout))
}

/// `python3 --version` emits `Python X.Y.Z`; keep just the number.
fn parse_version_output(stdout: &str) -> String {
    let trimmed = stdout.trim();
    trimmed
        .strip_prefix("Python ")
        .unwrap_or(trimmed)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_output_strips_the_python_prefix() {
        assert_eq!(parse_version_output("Python 3.12.1\n"), "3.12.1");
        assert_eq!(parse_version_output("3.11.4"), "3.11.4");
        assert_eq!(parse_version_output(""), "");
    }

    #[cfg(unix)]
    mod fixtures {
        use super::super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn fake_python(path: &Path, version: &str) {
            fs::write(path, format!("#!/bin/sh\necho \"Python {version}\"\n")).expect("write");
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
        }

        #[test]
        fn symlinked_candidates_collapse_to_the_first_pattern() {
            let temp = tempfile::tempdir().expect("tempdir");
            let real = temp.path().join("python3");
            fake_python(&real, "3.12.1");
            let alias = temp.path().join("python3-alias");
            std::os::unix::fs::symlink(&real, &alias).expect("symlink");

            let patterns = vec![
                (Candidate::Literal(real.clone()), InstallSource::System),
                (Candidate::Literal(alias), InstallSource::Homebrew),
            ];
            let installs = collect_installs(&patterns);
            assert_eq!(installs.len(), 1);
            assert_eq!(installs[0].path, real);
            assert_eq!(installs[0].source, InstallSource::System);
        }

        #[test]
        fn results_sort_descending_by_version() {
            let temp = tempfile::tempdir().expect("tempdir");
            let old = temp.path().join("python3.9");
            let new = temp.path().join("python3.12");
            fake_python(&old, "3.9.18");
            fake_python(&new, "3.12.1");

            let patterns = vec![
                (Candidate::Literal(old), InstallSource::System),
                (Candidate::Literal(new), InstallSource::Homebrew),
            ];
            let installs = collect_installs(&patterns);
            let versions: Vec<&str> = installs.iter().map(|i| i.version.as_str()).collect();
            assert_eq!(versions, vec!["3.12.1", "3.9.18"]);
        }

        #[test]
        fn numbered_prefix_matches_only_versioned_names() {
            let temp = tempfile::tempdir().expect("tempdir");
            fake_python(&temp.path().join("python3.11"), "3.11.4");
            fake_python(&temp.path().join("python3.12"), "3.12.1");
            // config scripts next to real binaries must not match
            fake_python(&temp.path().join("python3.11-config"), "0.0.0");

            let patterns = vec![(
                Candidate::NumberedPrefix {
                    dir: temp.path().to_path_buf(),
                    prefix: "python3.",
                },
                InstallSource::Homebrew,
            )];
            let installs = collect_installs(&patterns);
            assert_eq!(installs.len(), 2);
        }

        #[test]
        fn non_executable_candidates_are_skipped() {
            let temp = tempfile::tempdir().expect("tempdir");
            let path = temp.path().join("python3");
            fs::write(&path, "#!/bin/sh\necho \"Python 3.12.1\"\n").expect("write");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

            let patterns = vec![(Candidate::Literal(path), InstallSource::System)];
            assert!(collect_installs(&patterns).is_empty());
        }

        #[test]
        fn versioned_root_expands_per_version_interpreters() {
            let temp = tempfile::tempdir().expect("tempdir");
            for version in ["3.10.13", "3.12.1"] {
                let bin = temp.path().join(version).join("bin");
                fs::create_dir_all(&bin).expect("mkdir");
                fake_python(&bin.join("python3"), version);
            }

            let patterns = vec![(
                Candidate::VersionedRoot(temp.path().to_path_buf()),
                InstallSource::Pyenv,
            )];
            let installs = collect_installs(&patterns);
            assert_eq!(installs.len(), 2);
            assert_eq!(installs[0].version, "3.12.1");
            assert_eq!(installs[1].source, InstallSource::Pyenv);
        }
    }
}
