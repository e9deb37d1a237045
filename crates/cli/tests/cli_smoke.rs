use assert_cmd::Command;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const CHANGELOG_1_24: &str = "\
# Kubernetes 1.24 changelog

## v1.24.1

- Fixed CVE-2022-3162 path traversal in the apiserver aggregation layer
- Improved kubelet memory accounting for pods with many containers

## v1.24.0

- Dockershim removed from the kubelet runtime integration
- Added beta support for contextual logging in kube-scheduler
";

const CHANGELOG_1_25: &str = "\
# Kubernetes 1.25 changelog

## v1.25.0

- Breaking change: PodSecurityPolicy API removed in favour of admission
- Security fix for token leakage in the audit logs of the apiserver
- The batch/v1beta1 CronJob API is deprecated and will go away in 1.26
";

fn source_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let tool = dir.path().join("kubernetes");
    fs::create_dir_all(&tool).unwrap();
    fs::write(tool.join("CHANGELOG-1.24.md"), CHANGELOG_1_24).unwrap();
    fs::write(tool.join("CHANGELOG-1.25.md"), CHANGELOG_1_25).unwrap();
    dir
}

fn scout(dir: &TempDir, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("upgrade-scout").unwrap();
    cmd.args(args)
        .args(["--tool", "kubernetes", "--from", "1.24.0", "--to", "v1.25.0"])
        .arg("--source")
        .arg(dir.path());
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn path_lists_versions_in_order() {
    let dir = source_dir();
    let output = scout(&dir, &["path", "--format", "text"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "1.24.0 -> 1.24.1 -> 1.25.0\n"
    );
}

#[test]
fn ask_with_security_preset_returns_every_security_change() {
    let dir = source_dir();
    let bundle = stdout_json(&mut scout(
        &dir,
        &["ask", "--preset", "security", "-k", "1", "--format", "json"],
    ));

    assert_eq!(bundle["degraded"], false);
    let structural: Vec<&str> = bundle["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|item| item["provenance"] != "semantic")
        .map(|item| item["document"]["meta"]["version"].as_str().unwrap())
        .collect();
    assert_eq!(structural, vec!["1.24.1", "1.25.0"]);
}

#[test]
fn ask_text_output_carries_completeness_directive() {
    let dir = source_dir();
    let output = scout(&dir, &["ask", "--question", "what was removed?"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("Question: what was removed?"));
    assert!(text.contains("Never omit a change."));
    assert!(text.contains("[REMOVAL] 1.24.0: - Dockershim removed"));
}

#[test]
fn changes_filters_by_type() {
    let dir = source_dir();
    let changes = stdout_json(&mut scout(&dir, &["changes", "--type", "breaking"]));
    let changes = changes["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["type"], "breaking");
    assert_eq!(changes[0]["version"], "1.25.0");
}

#[test]
fn analyze_reports_pipeline_and_summary() {
    let dir = source_dir();
    let report = stdout_json(&mut scout(&dir, &["analyze"]));
    assert_eq!(report["pipeline"]["lines"], serde_json::json!(["1.24", "1.25"]));
    assert_eq!(report["pipeline"]["build"]["accepted"], 3);
    assert_eq!(report["summary"]["versions"].as_array().unwrap().len(), 3);
    assert_eq!(report["summary"]["totals"]["breaking"], 1);
}

#[test]
fn config_file_is_applied() {
    let dir = source_dir();
    let config = dir.path().join("scout.toml");
    fs::write(&config, "[sections]\nmin_section_chars = 10000\n").unwrap();

    scout(&dir, &["path"])
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}

#[test]
fn templates_from_config_shape_retrieved_documents() {
    let dir = source_dir();
    let config = dir.path().join("scout.toml");
    fs::write(
        &config,
        "[templates]\natomic_change = \"{type} @ {version}: {description}\"\n",
    )
    .unwrap();

    let output = scout(&dir, &["ask", "--preset", "removals"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains(
        "removal @ 1.24.0: - Dockershim removed from the kubelet runtime integration"
    ));
}

#[test]
fn missing_changelogs_fail() {
    let dir = TempDir::new().unwrap();
    scout(&dir, &["path"]).assert().failure();
}

#[test]
fn ask_requires_a_question() {
    let dir = source_dir();
    scout(&dir, &["ask"]).assert().failure();
    scout(&dir, &["ask", "--preset", "everything"])
        .assert()
        .failure();
}
