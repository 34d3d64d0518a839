mod common;

use common::{make_venv, managed_paths, parse_json, venvy_cmd, write_config};

#[test]
fn manage_add_persists_the_path_and_list_shows_it() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = make_venv(temp.path(), "tracked-env", "3.11.5");
    let config = temp.path().join("config.json");
    write_config(&config, &[], &[], 3);

    venvy_cmd(&config)
        .arg("manage")
        .arg("add")
        .arg(&env)
        .assert()
        .success();
    assert_eq!(managed_paths(&config).len(), 1);

    let assert = venvy_cmd(&config)
        .args(["--json", "list", "--managed-only"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    let envs = payload["details"]["environments"]
        .as_array()
        .expect("environments array");
    assert_eq!(envs.len(), 1);
    assert_eq!(envs[0]["name"], "tracked-env");
}

#[test]
fn manage_add_rejects_a_duplicate() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = make_venv(temp.path(), "tracked-env", "3.11.5");
    let config = temp.path().join("config.json");
    write_config(&config, &[env.clone()], &[], 3);

    let assert = venvy_cmd(&config)
        .arg("--json")
        .arg("manage")
        .arg("add")
        .arg(&env)
        .assert()
        .code(1);
    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "UserError");
    assert_eq!(managed_paths(&config).len(), 1);
}

#[test]
fn manage_remove_untracks_without_deleting() {
    let temp = tempfile::tempdir().expect("tempdir");
    let env = make_venv(temp.path(), "tracked-env", "3.11.5");
    let config = temp.path().join("config.json");
    write_config(&config, &[env.clone()], &[], 3);

    venvy_cmd(&config)
        .arg("manage")
        .arg("remove")
        .arg(&env)
        .assert()
        .success();

    assert!(managed_paths(&config).is_empty());
    assert!(env.join("pyvenv.cfg").is_file(), "environment was deleted");
}

#[test]
fn manage_remove_of_an_unknown_path_is_a_user_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("config.json");
    write_config(&config, &[], &[], 3);

    venvy_cmd(&config)
        .arg("manage")
        .arg("remove")
        .arg(temp.path().join("nope"))
        .assert()
        .code(1);
}
