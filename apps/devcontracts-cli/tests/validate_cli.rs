use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn bin() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("devcontracts").expect("binary");
    cmd.env_remove("DEVCONTRACTS_EDGE_POLICY");
    cmd
}

const CONTRACT: &str = r#"
schemaVersion = 1

[metadata]
project = "ExampleProj"

[contracts.my-service]
ref = "./service-contract.ts"
description = "Main service contract"

[tokens]
license = "MIT"

[structure."src/index.ts"]
type = "file"
depends_on = ["package.json"]
"#;

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write fixture");
    path
}

#[test]
fn valid_contract_reports_dangling_edge_as_warning() {
    let tmp = tempdir().expect("tmpdir");
    let file = write(tmp.path(), "contracts.toml", CONTRACT);

    bin()
        .args(["validate", "contract", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Errors: none"))
        .stdout(predicate::str::contains("package.json"))
        .stdout(predicate::str::contains("- project: ExampleProj"));

    bin()
        .args(["validate", "contract", "--strict-warnings", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("warning(s) (strict)"));
}

#[test]
fn edge_policy_flag_and_env_are_honoured() {
    let tmp = tempdir().expect("tmpdir");
    let file = write(tmp.path(), "contracts.toml", CONTRACT);

    bin()
        .args(["validate", "contract", "--edge-policy", "deny", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("is not a key in [structure]"));

    bin()
        .env("DEVCONTRACTS_EDGE_POLICY", "ignore")
        .args(["validate", "contract", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Warnings: none"));
}

#[test]
fn options_file_is_checked() {
    let tmp = tempdir().expect("tmpdir");
    let file = write(tmp.path(), "contracts.toml", CONTRACT);
    let bad = write(tmp.path(), "options.toml", "edge_policy = \"sometimes\"\n");

    bin()
        .args(["validate", "contract", "--config"])
        .arg(&bad)
        .arg("--file")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading options"));

    let good = write(tmp.path(), "strict.toml", "warnings_as_errors = true\n");
    bin()
        .args(["validate", "contract", "--config"])
        .arg(&good)
        .arg("--file")
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Errors (1):"));
}

#[test]
fn invalid_contract_emits_json_report() {
    let tmp = tempdir().expect("tmpdir");
    let file = write(
        tmp.path(),
        "contracts.json",
        r#"{"schemaVersion": 1, "metadata": {}, "contracts": {}, "otherStuff": true}"#,
    );

    let output = bin()
        .args(["validate", "contract", "--json", "--file"])
        .arg(&file)
        .output()
        .expect("run");
    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(report["valid"], false);
    assert_eq!(report["report"]["errors"][0]["kind"], "UnrecognizedKey");
    assert_eq!(report["report"]["errors"][0]["keys"][0], "otherStuff");
}

#[test]
fn lockfile_cross_check_warns_about_missing_tokens() {
    let tmp = tempdir().expect("tmpdir");
    let contract = write(tmp.path(), "contracts.toml", CONTRACT);
    let lock = write(tmp.path(), "contracts.lock", "version = 1\n");

    bin()
        .args(["validate", "lockfile", "--file"])
        .arg(&lock)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 resolved token(s)"));

    bin()
        .args(["validate", "lockfile", "--file"])
        .arg(&lock)
        .arg("--contract")
        .arg(&contract)
        .assert()
        .success()
        .stdout(predicate::str::contains("token 'license' has no resolved entry"));
}

#[test]
fn lockfile_with_wrong_version_fails() {
    let tmp = tempdir().expect("tmpdir");
    let lock = write(tmp.path(), "contracts.lock", "version = 2\n");

    bin()
        .args(["validate", "lockfile", "--file"])
        .arg(&lock)
        .assert()
        .failure()
        .stdout(predicate::str::contains("unsupported version 2"));
}

#[test]
fn schema_export_writes_file() {
    let tmp = tempdir().expect("tmpdir");
    let out = tmp.path().join("schemas").join("contract.schema.json");

    bin()
        .args(["schema", "contract", "--out"])
        .arg(&out)
        .assert()
        .success();
    let text = fs::read_to_string(&out).expect("read schema");
    assert!(text.contains("https://devcontracts.dev/schemas/contract.schema.json"));

    bin()
        .args(["schema", "lockfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resolvedTokens"));
}
