use assert_cmd::Command;
use predicates::prelude::*;

fn bin() -> Command {
    Command::cargo_bin("helm-shift").unwrap()
}

#[test]
fn help_works() {
    bin().arg("--help").assert().success();
}

#[test]
fn version_works() {
    bin().arg("--version").assert().success();
}

#[test]
fn subcommands_are_listed() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("cleanup"))
        .stdout(predicate::str::contains("move"));
}

#[test]
fn convert_requires_a_release_argument() {
    bin().arg("convert").assert().failure();
}

#[test]
fn convert_rejects_bad_release_storage() {
    // storage validation runs before any cluster access, so this fails fast
    bin()
        .args(["convert", "my-rel", "--release-storage", "etcd", "--tiller-out-cluster"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("conversion failed"))
        .stderr(predicate::str::contains("'secrets' or 'configmaps'"));
}

#[test]
fn cleanup_aborts_cleanly_when_declined() {
    // the confirmation gate precedes every destructive step
    bin()
        .arg("cleanup")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Cleanup/confirm] Are you sure you want to cleanup Helm v2 data? [y/N]: "))
        .stdout(predicate::str::contains("Cleanup will not proceed"));
}

#[test]
fn cleanup_aborts_cleanly_on_empty_answer() {
    bin()
        .arg("cleanup")
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleanup will not proceed"));
}

#[test]
fn cleanup_warning_covers_all_scopes_by_default() {
    bin()
        .arg("cleanup")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Helm v2 Configuration\""))
        .stdout(predicate::str::contains("\"Release Data\""))
        .stdout(predicate::str::contains("\"Tiller\""));
}

#[test]
fn move_rejects_other_targets() {
    bin().args(["move", "plugins"]).assert().failure();
}
