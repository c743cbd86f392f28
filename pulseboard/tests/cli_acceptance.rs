use chrono::{Duration, Utc};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn write_config(&self, content: &str) {
        let dir = self.xdg_config.join("pulseboard");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), content).expect("failed to write config");
    }

    fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home.join(name);
        fs::write(&path, content).expect("failed to write file");
        path
    }
}

fn fixture_snapshot() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../pulseboard-core/tests/fixtures/snapshot.json")
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("pulseboard"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute pulseboard: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "pulseboard {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn run_json(env: &CliTestEnv, args: &[&str]) -> serde_json::Value {
    let output = run_bin(env, args);
    assert_success(args, &output);
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn summary_from_snapshot_as_json() {
    let env = CliTestEnv::new();
    let snapshot = path_arg(&fixture_snapshot());

    let json = run_json(
        &env,
        &["summary", "--team", "t1", "--format", "json", "--snapshot", &snapshot],
    );
    assert_eq!(json["team_name"], "Platform");
    assert_eq!(json["summary"]["total_sessions"], 4);
    assert_eq!(json["summary"]["average_health_score"], 69.25);
    assert_eq!(json["top_projects"][0]["name"], "api");

    let log_dir = env.xdg_state.join("pulseboard");
    assert!(log_dir.exists(), "log directory should be created");
    let log_files: Vec<String> = fs::read_dir(&log_dir)
        .expect("log directory should be readable")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("pulseboard.") && name.ends_with(".log"))
        .collect();
    assert_eq!(log_files.len(), 1, "expected one daily log file, found {log_files:?}");
}

#[test]
fn unknown_team_yields_error_payload() {
    let env = CliTestEnv::new();
    let snapshot = path_arg(&fixture_snapshot());
    let args = ["summary", "--team", "ghost", "--format", "json", "--snapshot", snapshot.as_str()];

    let output = run_bin(&env, &args);
    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!({ "error": "Team not found" }));

    // Other reports treat an unknown team as empty.
    let health = run_json(
        &env,
        &["health", "--team", "ghost", "--format", "json", "--snapshot", &snapshot],
    );
    assert_eq!(health["total_sessions"], 0);
    assert_eq!(health["message"], "No sessions found");
}

#[test]
fn text_reports_render() {
    let env = CliTestEnv::new();
    let snapshot = path_arg(&fixture_snapshot());

    for (command, expected) in [
        ("summary", "Team: All Teams"),
        ("health", "average health 69.40"),
        ("tokens", "Approaching limit:"),
        ("duration", "median"),
        ("stats", "Sessions:       5"),
        ("projects", "api"),
        ("top", "Top 5 sessions by health_score"),
    ] {
        let args = [command, "--snapshot", snapshot.as_str()];
        let output = run_bin(&env, &args);
        assert_success(&args, &output);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains(expected),
            "`{command}` output should contain {expected:?}, got:\n{stdout}"
        );
    }
}

#[test]
fn trends_use_recent_sessions_from_config_snapshot() {
    let env = CliTestEnv::new();
    let now = Utc::now();
    let sessions: Vec<_> = [(3, 2), (2, 2), (1, 10), (0, 10)]
        .iter()
        .flat_map(|&(days_ago, count)| {
            let start = now - Duration::days(days_ago) - Duration::minutes(5);
            (0..count).map(move |i| {
                serde_json::json!({
                    "id": format!("d{days_ago}-{i}"),
                    "team_id": "t1",
                    "type": "claude_code",
                    "status": "completed",
                    "health_score": 80.0,
                    "start_time": start.to_rfc3339(),
                })
            })
        })
        .collect();
    let snapshot = serde_json::json!({ "teams": [{"id": "t1", "name": "Platform"}], "sessions": sessions });
    let path = env.write_file("recent.json", &snapshot.to_string());
    env.write_config(&format!(
        "[source]\nsnapshot = {:?}\n\n[metrics]\ntrend_days = 5\n",
        path_arg(&path)
    ));

    let json = run_json(&env, &["trends", "--format", "json"]);
    assert_eq!(json["period_days"], 5);
    assert_eq!(json["total_sessions"], 24);
    assert_eq!(json["trend"], "increasing");
    assert_eq!(json["trend_percentage"], 400.0);
}

#[test]
fn missing_database_fails_cleanly() {
    let env = CliTestEnv::new();
    let output = run_bin(&env, &["stats"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to open dashboard database"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn invalid_config_is_rejected() {
    let env = CliTestEnv::new();
    env.write_config("[metrics]\napproaching_limit_ratio = 1.5\n");
    let output = run_bin(&env, &["stats", "--snapshot", &path_arg(&fixture_snapshot())]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "unexpected stderr:\n{stderr}");
}
