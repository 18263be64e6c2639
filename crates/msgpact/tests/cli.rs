#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const DOCUMENT: &str = r#"{
  "messages": {
    "join": {
      "to_host": {
        "branch": {
          "fields": {
            "id": { "leaf": { "enum": ["1", "2", "3"] } },
            "name": { "leaf": { "anyOf": [{ "type": "string" }, { "type": "number" }] } }
          }
        }
      },
      "to_peer": {
        "branch": {
          "fields": {
            "id": { "leaf": { "type": "string" } },
            "name": { "leaf": { "type": "string" } },
            "etc": { "branch": { "fields": { "key": { "leaf": { "type": "string" } } } } }
          },
          "optional": ["etc"]
        }
      }
    },
    "leave": {
      "to_host": { "branch": { "fields": { "userId": { "leaf": { "type": "string" } } } } }
    }
  }
}"#;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "msgpact-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn write_document(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("messages.json");
    std::fs::write(&path, content).expect("document should be writable");
    path
}

fn msgpact(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_msgpact"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("msgpact should run")
}

#[test]
fn check_accepts_valid_join() {
    let dir = unique_temp_dir("valid");
    let doc = write_document(&dir, DOCUMENT);

    let output = msgpact(&[
        "--format",
        "json",
        "check",
        doc.to_str().expect("utf-8 path"),
        "--direction",
        "to-host",
        "--message",
        "join",
        "--json",
        r#"{"id":"1","name":"a"}"#,
    ]);

    assert!(output.status.success());
    let stdout: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(stdout["direction"], "to-host");
    assert_eq!(stdout["type"], "join");
    assert_eq!(stdout["payload"]["id"], "1");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn check_reports_violation_path_with_exit_60() {
    let dir = unique_temp_dir("invalid");
    let doc = write_document(&dir, DOCUMENT);

    let output = msgpact(&[
        "check",
        doc.to_str().expect("utf-8 path"),
        "-d",
        "to-host",
        "-m",
        "join",
        "--json",
        r#"{"id":"4","name":"a"}"#,
    ]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("at id"), "stderr: {stderr}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn check_unknown_message_for_direction_exits_64() {
    let dir = unique_temp_dir("unknown");
    let doc = write_document(&dir, DOCUMENT);

    let output = msgpact(&[
        "check",
        doc.to_str().expect("utf-8 path"),
        "-d",
        "to-peer",
        "-m",
        "leave",
        "--json",
        r#"{"userId":"u1"}"#,
    ]);

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown message for direction to-peer"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn check_strict_mode_rejects_extra_fields() {
    let dir = unique_temp_dir("strict");
    let doc = write_document(&dir, DOCUMENT);
    let doc = doc.to_str().expect("utf-8 path");
    let payload = r#"{"userId":"u1","extra":true}"#;

    let tolerant = msgpact(&[
        "check", doc, "-d", "to-host", "-m", "leave", "--json", payload,
    ]);
    assert!(tolerant.status.success());

    let strict = msgpact(&[
        "check", doc, "--strict", "-d", "to-host", "-m", "leave", "--json", payload,
    ]);
    assert_eq!(strict.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn contracts_lists_both_directions() {
    let dir = unique_temp_dir("contracts");
    let doc = write_document(&dir, DOCUMENT);

    let output = msgpact(&[
        "--format",
        "json",
        "contracts",
        doc.to_str().expect("utf-8 path"),
    ]);

    assert!(output.status.success());
    let rows: Vec<serde_json::Value> =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let listed: Vec<(String, String)> = rows
        .iter()
        .map(|row| {
            (
                row["direction"].as_str().unwrap_or_default().to_string(),
                row["message"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    assert_eq!(
        listed,
        vec![
            ("to-host".to_string(), "join".to_string()),
            ("to-host".to_string(), "leave".to_string()),
            ("to-peer".to_string(), "join".to_string()),
        ]
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn export_prints_json_schema_per_message() {
    let dir = unique_temp_dir("export");
    let doc = write_document(&dir, DOCUMENT);

    let output = msgpact(&[
        "--format",
        "json",
        "export",
        doc.to_str().expect("utf-8 path"),
        "--direction",
        "to-peer",
    ]);

    assert!(output.status.success());
    let schemas: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(schemas["join"]["type"], "object");
    assert_eq!(schemas["join"]["required"], serde_json::json!(["id", "name"]));
    assert!(schemas.get("leave").is_none());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_document_exits_60_with_every_defect() {
    let dir = unique_temp_dir("malformed");
    let doc = write_document(
        &dir,
        r#"{"messages":{"ping":{},"pong":{"to_host":{"bogus":1}}}}"#,
    );

    let output = msgpact(&["contracts", doc.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ping"), "stderr: {stderr}");
    assert!(stderr.contains("pong"), "stderr: {stderr}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn repeated_message_name_exits_60() {
    let dir = unique_temp_dir("repeated");
    let doc = write_document(
        &dir,
        r#"{"messages":{"join":{"to_host":{"literal":{"id":"1"}}},"join":{"to_peer":{"literal":{"id":"1"}}}}}"#,
    );

    let output = msgpact(&["contracts", doc.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("duplicate message name 'join'"),
        "stderr: {stderr}"
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_document_exits_1() {
    let output = msgpact(&["contracts", "/nonexistent/msgpact/messages.json"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn version_prints_package_version() {
    let output = msgpact(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("msgpact {}", env!("CARGO_PKG_VERSION"))
    );
}
