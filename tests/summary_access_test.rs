use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::{Value, json};

fn auditlog(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("auditlog");
    cmd.current_dir(dir.path())
        .env_remove("AUDITLOG_ROLE")
        .env_remove("RUST_LOG");
    cmd
}

fn init(backend: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    auditlog(&dir)
        .args(["init", "--backend", backend])
        .assert()
        .success();
    dir
}

fn record_login(dir: &TempDir, extra: &[&str]) {
    auditlog(dir)
        .args(["record", "login", "--ip", "203.0.113.9"])
        .args(extra)
        .assert()
        .success();
}

fn summary(dir: &TempDir, kind: &str, start: &str, end: &str) -> Value {
    let out = auditlog(dir)
        .args(["--role", "audit_admin", "--json", kind, "summary", "--start", start, "--end", end])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    serde_json::from_slice(&out.stdout).unwrap()
}

// ─── Summaries ───────────────────────────────────────────────────

#[test]
fn login_summary_over_two_attempts() {
    for backend in ["sqlite", "jsonl"] {
        let dir = init(backend);
        record_login(&dir, &[
            "--email", "a@example.com", "--user-id", "u1", "--login-type", "password",
            "--status", "failed", "--reason", "bad password", "--timestamp", "1000",
        ]);
        record_login(&dir, &[
            "--email", "b@example.com", "--user-id", "u2", "--login-type", "oauth",
            "--status", "success", "--timestamp", "2000",
        ]);

        let s = summary(&dir, "logins", "900", "2500");
        assert_eq!(
            s,
            json!({
                "total_logins": 2,
                "successful_logins": 1,
                "failed_logins": 1,
                "logins_by_type": { "password": 1, "oauth": 1 },
                "unique_users": 2,
            }),
            "{backend}"
        );
    }
}

#[test]
fn empty_window_summary_is_all_zero() {
    let dir = init("sqlite");
    record_login(&dir, &[
        "--email", "a@example.com", "--login-type", "password", "--status", "success",
        "--timestamp", "5000",
    ]);

    let s = summary(&dir, "logins", "0", "100");
    assert_eq!(s["total_logins"], 0);
    assert_eq!(s["logins_by_type"], json!({}));

    let s = summary(&dir, "ops", "0", "100");
    assert_eq!(s["total_operations"], 0);
    assert_eq!(s["operations_by_action"], json!({}));
}

#[test]
fn operation_summary_partitions_the_window() {
    let ops = [
        ("CREATE", Some("admin"), "201", "100"),
        ("DELETE", Some("admin"), "403", "200"),
        ("READ", None, "200", "300"),
        ("READ", Some("user"), "500", "301"),
    ];

    for backend in ["sqlite", "jsonl"] {
        let dir = init(backend);
        for (i, &(action, role, status, ts)) in ops.iter().enumerate() {
            let id = format!("op-{i}");
            let mut cmd = auditlog(&dir);
            cmd.args([
                "record", "operation", "--id", id.as_str(), "--action", action,
                "--resource-type", "chat", "--method", "POST", "--endpoint", "/api",
                "--status", status, "--ip", "10.0.0.1", "--user-id", "u1", "--timestamp", ts,
            ]);
            if let Some(role) = role {
                cmd.args(["--user-role", role]);
            }
            cmd.assert().success();
        }

        // 301 falls one second past the end bound.
        let s = summary(&dir, "ops", "100", "300");
        assert_eq!(s["total_operations"], 3, "{backend}");
        assert_eq!(s["failed_operations"], 1, "{backend}");
        assert_eq!(s["unique_users"], 1, "{backend}");
        assert_eq!(
            s["operations_by_action"],
            json!({ "CREATE": 1, "DELETE": 1, "READ": 1 }),
            "{backend}"
        );
        assert_eq!(
            s["operations_by_user_role"],
            json!({ "admin": 2, "unassigned": 1 }),
            "{backend}"
        );
        assert_eq!(s["operations_by_resource_type"], json!({ "chat": 3 }), "{backend}");
    }
}

#[test]
fn summary_table_output() {
    let dir = init("sqlite");
    record_login(&dir, &[
        "--email", "a@example.com", "--login-type", "ldap", "--status", "failed",
        "--timestamp", "10",
    ]);

    auditlog(&dir)
        .args(["--role", "audit_admin", "logins", "summary", "--start", "0", "--end", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("By login type"))
        .stdout(predicate::str::contains("ldap"));
}

#[test]
fn failed_and_user_login_listings() {
    let dir = init("jsonl");
    record_login(&dir, &[
        "--id", "l1", "--email", "a@example.com", "--user-id", "u1", "--login-type",
        "password", "--status", "failed", "--timestamp", "1",
    ]);
    record_login(&dir, &[
        "--id", "l2", "--email", "a@example.com", "--user-id", "u1", "--login-type",
        "password", "--status", "success", "--timestamp", "2",
    ]);
    record_login(&dir, &[
        "--id", "l3", "--email", "ghost@example.com", "--login-type", "password",
        "--status", "failed", "--timestamp", "3",
    ]);

    let failed = auditlog(&dir)
        .args(["--role", "audit_admin", "--json", "logins", "failed"])
        .output()
        .unwrap();
    let failed: Value = serde_json::from_slice(&failed.stdout).unwrap();
    let failed_ids: Vec<_> = failed.as_array().unwrap().iter().map(|e| e["id"].clone()).collect();
    assert_eq!(failed_ids, vec![json!("l3"), json!("l1")]);

    let user = auditlog(&dir)
        .args(["--role", "audit_admin", "--json", "logins", "user", "u1"])
        .output()
        .unwrap();
    let user: Value = serde_json::from_slice(&user.stdout).unwrap();
    assert_eq!(user.as_array().unwrap().len(), 2);
    assert_eq!(user[0]["status"], "success");
}

// ─── Access control ──────────────────────────────────────────────

#[test]
fn queries_without_role_are_denied() {
    let dir = init("sqlite");

    auditlog(&dir)
        .args(["ops", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied for role 'anonymous'"));
}

#[test]
fn queries_with_other_role_are_denied() {
    let dir = init("sqlite");

    auditlog(&dir)
        .args(["--role", "user", "logins", "summary", "--start", "0", "--end", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied for role 'user'"));
}

#[test]
fn role_can_come_from_environment() {
    let dir = init("sqlite");

    auditlog(&dir)
        .env("AUDITLOG_ROLE", "audit_admin")
        .args(["logins", "count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0"));
}

#[test]
fn recording_is_not_gated() {
    let dir = init("sqlite");

    record_login(&dir, &[
        "--email", "a@example.com", "--login-type", "api_key", "--status", "success",
    ]);
}

#[test]
fn audit_roles_come_from_config() {
    let dir = init("sqlite");
    let config_path = dir.path().join(".auditlog/config.toml");
    let config = std::fs::read_to_string(&config_path)
        .unwrap()
        .replace("audit_roles = [\"audit_admin\"]", "audit_roles = [\"auditor\"]");
    std::fs::write(&config_path, config).unwrap();

    auditlog(&dir)
        .args(["--role", "auditor", "ops", "count"])
        .assert()
        .success();
    auditlog(&dir)
        .args(["--role", "audit_admin", "ops", "count"])
        .assert()
        .failure();
}

#[test]
fn invalid_config_is_reported() {
    let dir = init("sqlite");
    let config_path = dir.path().join(".auditlog/config.toml");
    let config = std::fs::read_to_string(&config_path)
        .unwrap()
        .replace("path = \"audit.db\"", "path = \"../escape.db\"");
    std::fs::write(&config_path, config).unwrap();

    auditlog(&dir)
        .args(["--role", "audit_admin", "ops", "count"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}
