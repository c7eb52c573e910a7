use predicates::prelude::*;
use std::fs;
use test_env::{setup_home, setup_home_with_sample, taskbuddy_cmd};

#[test]
fn test_empty_title_is_user_error() {
    let _guard = test_env::lock_test_env();
    let home = setup_home(&[]);

    taskbuddy_cmd(&home)
        .args(["add", "   "])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Task title cannot be empty"))
        .stderr(predicate::str::contains("cannot be empty"));
}

#[test]
fn test_unknown_task_is_user_error() {
    let _guard = test_env::lock_test_env();
    let home = setup_home_with_sample();

    taskbuddy_cmd(&home)
        .args(["show", "00000000-0000-4000-8000-000000000000"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));

    taskbuddy_cmd(&home)
        .args(["done", "eeee"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Task 'eeee' not found"));
}

#[test]
fn test_invalid_task_id_is_user_error() {
    let _guard = test_env::lock_test_env();
    let home = setup_home_with_sample();

    taskbuddy_cmd(&home)
        .args(["delete", "xyz"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid task ID"));
}

#[test]
fn test_read_only_data_refuses_writes() {
    let _guard = test_env::lock_test_env();
    let home = setup_home_with_sample();
    let rc = home.path().join(".taskbuddy").join("rc");
    fs::write(&rc, "data.location=tasks.csv\ndata.readonly=true\n").unwrap();

    taskbuddy_cmd(&home)
        .args(["done", "f0a3"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("read-only"));

    taskbuddy_cmd(&home)
        .args(["add", "Nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("add_task is not supported"));
}

#[test]
fn test_unregistered_backend_is_internal_error() {
    let _guard = test_env::lock_test_env();
    let home = setup_home(&["data.backend=postgres"]);

    taskbuddy_cmd(&home)
        .args(["list"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Internal error: Could not initialize application services"))
        .stderr(predicate::str::contains("No repository registered for backend 'postgres'"));
}

#[test]
fn test_invalid_config_is_internal_error() {
    let _guard = test_env::lock_test_env();
    let home = setup_home(&["debug.mode=verbose"]);

    taskbuddy_cmd(&home)
        .args(["list"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to load configuration"))
        .stderr(predicate::str::contains("Invalid value 'verbose' for debug.mode"));
}

#[test]
fn test_missing_data_file_lists_nothing() {
    let _guard = test_env::lock_test_env();
    let home = setup_home(&[]);

    taskbuddy_cmd(&home)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."))
        .stderr(predicate::str::contains("Error retrieving all tasks"));
}

#[test]
fn test_unknown_subcommand_is_user_error() {
    let _guard = test_env::lock_test_env();
    let home = setup_home(&[]);

    taskbuddy_cmd(&home)
        .args(["frobnicate"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_add_refuses_to_rewrite_unrecognized_header() {
    let _guard = test_env::lock_test_env();
    let home = setup_home(&["data.location=tasks.csv"]);
    let data = home.path().join(".taskbuddy").join("tasks.csv");
    let original = "ID,Title,Status\n\
                    f0a3e8b1-1d2c-4e5f-8a9b-0c1d2e3f4a5b,Call plumber,PENDING\n\
                    1b2c3d4e-5f6a-7b8c-9d0e-1f2a3b4c5d6e,Dentist,COMPLETE\n";
    fs::write(&data, original).unwrap();

    taskbuddy_cmd(&home)
        .args(["add", "New"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Refusing to rewrite"));

    assert_eq!(fs::read_to_string(&data).unwrap(), original);
}

#[test]
fn test_add_refuses_to_drop_unreadable_rows() {
    let _guard = test_env::lock_test_env();
    let home = setup_home(&["data.location=tasks.csv"]);
    let data = home.path().join(".taskbuddy").join("tasks.csv");
    let original = "id,title,status\nf0a3e8b1-1d2c-4e5f-8a9b-0c1d2e3f4a5b,Call plumber,SOMEDAY\n";
    fs::write(&data, original).unwrap();

    taskbuddy_cmd(&home)
        .args(["add", "New"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("1 row(s) could not be read"));

    assert_eq!(fs::read_to_string(&data).unwrap(), original);
}

#[test]
fn test_prefix_lookup_on_fresh_install_is_user_error() {
    let _guard = test_env::lock_test_env();
    let home = setup_home(&[]);

    for command in ["show", "done", "delete"] {
        taskbuddy_cmd(&home)
            .args([command, "abcd"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Error: Task 'abcd' not found"));
    }
}

#[test]
fn test_mode_flag_wins_over_invalid_env_mode() {
    let _guard = test_env::lock_test_env();
    let home = setup_home_with_sample();

    taskbuddy_cmd(&home)
        .env("TASKBUDDY_MODE", "loud")
        .args(["--mode", "dev", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:   20"));

    taskbuddy_cmd(&home)
        .env("TASKBUDDY_MODE", "loud")
        .args(["status"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid debug mode 'loud'"));
}

#[test]
fn test_read_only_data_refuses_delete() {
    let _guard = test_env::lock_test_env();
    let home = setup_home_with_sample();
    let rc = home.path().join(".taskbuddy").join("rc");
    fs::write(&rc, "data.location=tasks.csv\ndata.readonly=true\n").unwrap();

    taskbuddy_cmd(&home)
        .args(["delete", "1b2c"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is read-only"));

    let content = fs::read_to_string(home.path().join(".taskbuddy").join("tasks.csv")).unwrap();
    assert!(content.contains("Schedule dentist appointment"));
}
