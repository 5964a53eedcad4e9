use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

/// Binary with ambient project, token, and endpoint settings cleared
fn bucketscan() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bucketscan"));
    for key in [
        "GOOGLE_CLOUD_PROJECT",
        "GCLOUD_PROJECT",
        "GOOGLE_OAUTH_ACCESS_TOKEN",
        "BUCKETSCAN_DLP_ENDPOINT",
        "BUCKETSCAN_PUBSUB_ENDPOINT",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    write!(file, "{}", content).expect("write config");
    file
}

#[test]
fn test_cli_help() {
    bucketscan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "bucketscan inspects Cloud Storage objects",
        ));
}

#[test]
fn test_cli_version() {
    let expected = format!("bucketscan {}", env!("CARGO_PKG_VERSION"));
    bucketscan()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_inspect_help() {
    bucketscan()
        .args(["inspect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inspect a Cloud Storage object"));
}

#[test]
fn test_inspect_gcs_help_lists_detector_options() {
    bucketscan()
        .args(["inspect", "gcs", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--subscription"))
        .stdout(predicate::str::contains("--min-likelihood"))
        .stdout(predicate::str::contains("--custom-regexes"));
}

#[test]
fn test_deidentify_help() {
    bucketscan()
        .args(["deidentify", "mask", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--masking-character"))
        .stdout(predicate::str::contains("--number-to-mask"));
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    bucketscan().assert().code(2);
}

#[test]
fn test_malformed_arguments_are_usage_errors() {
    bucketscan()
        .args(["inspect", "gcs", "--bucket", "b", "--file", "f"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--topic"));

    bucketscan()
        .args(["deidentify", "mask", "x", "--number-to-mask", "many"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_project_is_config_error() {
    let config = config_file("");
    bucketscan()
        .arg("--config")
        .arg(config.path())
        .args(["deidentify", "mask", "My SSN is 123456789"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no project specified"));
}

#[test]
fn test_invalid_likelihood_is_config_error() {
    let config = config_file("");
    bucketscan()
        .arg("--config")
        .arg(config.path())
        .args([
            "--project",
            "acme",
            "inspect",
            "string",
            "hello",
            "--min-likelihood",
            "SOMETIMES",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown likelihood 'SOMETIMES'"));
}

#[test]
fn test_multi_character_mask_is_config_error() {
    let config = config_file("");
    bucketscan()
        .arg("--config")
        .arg(config.path())
        .args([
            "--project",
            "acme",
            "deidentify",
            "mask",
            "x",
            "--masking-character",
            "##",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("single character"));
}

#[test]
fn test_unreadable_config_is_config_error() {
    let config = config_file("[watch\nbroken");
    bucketscan()
        .arg("--config")
        .arg(config.path())
        .args(["config", "show"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse configuration"));
}

#[test]
fn test_config_show_merges_file_and_flags() {
    let config = config_file(
        "[project]\nid = \"from-file\"\n\n[watch]\ncompletion_timeout_secs = 30\n",
    );
    bucketscan()
        .arg("--config")
        .arg(config.path())
        .args(["--format", "json", "--timeout-secs", "45", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"project\": \"from-file\""))
        .stdout(predicate::str::contains("\"completion_timeout_secs\": 45"));
}

#[test]
fn test_project_flag_overrides_file() {
    let config = config_file("[project]\nid = \"from-file\"\n");
    bucketscan()
        .arg("--config")
        .arg(config.path())
        .args(["--project", "from-flag", "--format", "plain", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id: from-flag"));
}

#[test]
fn test_config_path_reports_explicit_file() {
    let config = config_file("");
    bucketscan()
        .arg("--config")
        .arg(config.path())
        .args(["--format", "plain", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            config.path().display().to_string(),
        ));
}
