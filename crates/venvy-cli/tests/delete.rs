use std::fs;

mod common;

use common::{make_venv, managed_paths, parse_json, venvy_cmd, write_config};

#[test]
fn delete_refuses_directories_without_environment_metadata() {
    let temp = tempfile::tempdir().expect("tempdir");
    let victim = temp.path().join("important-data");
    fs::create_dir_all(&victim).expect("create dir");
    fs::write(victim.join("notes.txt"), "keep me").expect("write file");
    let config = temp.path().join("config.json");
    write_config(&config, &[], &[], 3);

    let assert = venvy_cmd(&config)
        .arg("--json")
        .arg("delete")
        .arg(&victim)
        .arg("--yes")
        .assert()
        .code(1);
    let payload = parse_json(&assert);

    assert_eq!(payload["status"], "UserError");
    assert_eq!(payload["details"]["error"], "safety-check");
    assert!(victim.join("notes.txt").is_file(), "directory was touched");
}

#[test]
fn delete_removes_the_environment_and_forgets_it() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = make_venv(temp.path(), "doomed-env", "3.12.1");
    let config = temp.path().join("config.json");
    write_config(&config, &[env.clone()], &[], 3);

    venvy_cmd(&config)
        .arg("delete")
        .arg(&env)
        .arg("--yes")
        .assert()
        .success();

    assert!(!env.exists(), "environment still on disk");
    assert!(
        managed_paths(&config).is_empty(),
        "deleted path still in the managed list"
    );
}

#[test]
fn delete_without_yes_is_refused_when_stdin_is_not_a_terminal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = make_venv(temp.path(), "kept-env", "3.12.1");
    let config = temp.path().join("config.json");
    write_config(&config, &[env.clone()], &[], 3);

    let assert = venvy_cmd(&config)
        .arg("--json")
        .arg("delete")
        .arg(&env)
        .assert()
        .code(1);
    let payload = parse_json(&assert);

    assert_eq!(payload["status"], "UserError");
    assert!(env.exists(), "environment was deleted without --yes");
}

#[test]
fn delete_of_a_missing_path_reports_the_safety_check() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("config.json");
    write_config(&config, &[], &[], 3);

    venvy_cmd(&config)
        .arg("delete")
        .arg(temp.path().join("never-existed"))
        .arg("--yes")
        .assert()
        .code(1);
}
