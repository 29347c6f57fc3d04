use leadboard_core::{Database, Lead};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
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

        let env = Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        };
        env.seed_leads();
        env
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("leadboard/leads.db")
    }

    fn seed_leads(&self) {
        let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../leadboard-core/tests/fixtures/leads.json");
        let content = fs::read_to_string(fixture).expect("failed to read leads fixture");
        let leads: Vec<Lead> = serde_json::from_str(&content).expect("failed to parse fixture");

        let db_path = self.db_path();
        fs::create_dir_all(db_path.parent().expect("missing db parent"))
            .expect("failed to create data dir");
        let db = Database::open(&db_path).expect("failed to open db");
        db.migrate().expect("failed to migrate db");
        db.insert_leads(&leads).expect("failed to seed leads");
    }
}

fn run_report(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("leadboard-report"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("LEADBOARD_API_KEY")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute leadboard-report: {e}"))
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
        "leadboard-report {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn report_json(env: &CliTestEnv, args: &[&str]) -> serde_json::Value {
    let output = run_report(env, args);
    assert_success(args, &output);
    serde_json::from_slice(&output.stdout).expect("report should print valid JSON")
}

#[test]
fn text_report_summarizes_seeded_leads() {
    let env = CliTestEnv::new();

    let output = run_report(&env, &[]);
    assert_success(&[], &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Leads report (all tags, any date)"));
    assert!(stdout.contains("Total leads:      8"));
    assert!(stdout.contains("Best tag:         BIO IGOR (3)"));
    assert!(stdout.contains("Total potential:  R$ 2.5M"));
    assert!(
        stdout.contains("Status (All)"),
        "expected status section in stdout, got:\n{stdout}"
    );
}

#[test]
fn json_report_honors_tag_filter() {
    let env = CliTestEnv::new();

    let all = report_json(&env, &["--format", "json"]);
    assert_eq!(all["dashboard"]["stats"]["total_leads"], 8);
    assert_eq!(all["dashboard"]["potential"], 2_525_000);
    assert_eq!(all["dashboard"]["potential_tag"]["name"], "BIO IGOR");
    assert_eq!(all["dashboard"]["tag_options"].as_array().map(|t| t.len()), Some(3));

    let tagged = report_json(&env, &["--format", "json", "--tag", "CR 17"]);
    assert_eq!(tagged["filter"]["tag"], "CR 17");
    assert_eq!(tagged["dashboard"]["stats"]["total_leads"], 2);
    assert_eq!(tagged["dashboard"]["leads"].as_array().map(|l| l.len()), Some(2));
    // Tag options ignore the active filter
    assert_eq!(tagged["dashboard"]["tag_options"].as_array().map(|t| t.len()), Some(3));
}

#[test]
fn markdown_report_with_date_range() {
    let env = CliTestEnv::new();
    let args = ["--format", "md", "--from", "03/11/2025", "--to", "2025-11-04"];

    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# Leads report"));
    assert!(stdout.contains("_all tags, 03/11/2025 to 04/11/2025_"));
    assert!(stdout.contains("| Total leads | 4 |"));
    assert!(stdout.contains("## Leads by tag"));
}

#[test]
fn invalid_arguments_fail() {
    let env = CliTestEnv::new();

    let bad_date = run_report(&env, &["--from", "31/02/2025"]);
    assert!(!bad_date.status.success());

    let reversed = run_report(&env, &["--from", "05/11/2025", "--to", "01/11/2025"]);
    assert!(!reversed.status.success());
    assert!(String::from_utf8_lossy(&reversed.stderr).contains("is after"));

    let bad_format = run_report(&env, &["--format", "xml"]);
    assert!(!bad_format.status.success());
}
