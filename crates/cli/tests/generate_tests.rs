// Integration tests for `datalines generate`, `preview` and `default-name`.
// Run with: cargo test -p datalines-cli --test generate_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rusqlite::Connection;
use tempfile::TempDir;

const EXPECTED_PEOPLE: &str = concat!(
    "/* DATA step program generated from main.people */\n",
    "DATA WORK.main_people;\n",
    "\tattrib id \n\t\tlength=8;\n",
    "\tattrib name \n\t\tlength=$20;\n",
    "INFILE DATALINES DSD;\n",
    "INPUT \n",
    "\tid\n",
    "\tname\n",
    "\t;\n",
    "DATALINES4;\n",
    "1,\"Ann \"\"A\"\"\"\n",
    "2,\"Zoë\"\n",
    ";;;;\n",
    "RUN;\n",
);

/// A workspace with `shop.db` holding `people`, and an isolated settings path.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("shop.db")).unwrap();
        conn.execute_batch(
            "CREATE TABLE people (id INTEGER, name VARCHAR(20));
             INSERT INTO people VALUES (1, 'Ann \"A\"');
             INSERT INTO people VALUES (2, 'Zoë');",
        )
        .unwrap();
        Fixture { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn db(&self) -> String {
        self.path("shop.db").to_string_lossy().into_owned()
    }

    fn datalines(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_datalines"));
        cmd.current_dir(self.dir.path());
        cmd.arg("--config").arg(self.path("settings.json"));
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.datalines().args(args).output().expect("run datalines")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_prints_program_and_summary() {
    let fx = Fixture::new();
    let output = fx.run(&["generate", &fx.db(), "people"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), EXPECTED_PEOPLE);
    assert!(stderr(&output).contains("NOTE: Converted 2 columns and 2 rows."));
}

#[test]
fn generate_quiet_suppresses_summary() {
    let fx = Fixture::new();
    let output = fx.run(&["--quiet", "generate", &fx.db(), "main.people"]);

    assert!(output.status.success());
    assert!(!stderr(&output).contains("NOTE:"));
}

#[test]
fn generate_into_directory_uses_member_name() {
    let fx = Fixture::new();
    let out_dir = fx.path("out");
    fs::create_dir(&out_dir).unwrap();

    let output = fx.run(&["generate", &fx.db(), "people", "-o", out_dir.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    assert_eq!(fs::read_to_string(out_dir.join("people.sas")).unwrap(), EXPECTED_PEOPLE);
}

#[test]
fn generate_ascii_replaces_non_ascii() {
    let fx = Fixture::new();
    let target = fx.path("people.sas");

    let output = fx.run(&["generate", &fx.db(), "people", "--ascii", "-o", target.to_str().unwrap()]);

    assert!(output.status.success());
    let bytes = fs::read(&target).unwrap();
    assert!(bytes.is_ascii());
    assert!(String::from_utf8(bytes).unwrap().contains("2,\"Zo?\"\n"));
}

#[test]
fn generate_honours_out_name() {
    let fx = Fixture::new();
    let output = fx.run(&["generate", &fx.db(), "people", "--out-name", "OUT.PEOPLE"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("\nDATA OUT.PEOPLE;\n"));
}

#[test]
fn generate_reads_attached_library() {
    let fx = Fixture::new();
    let archive = fx.path("archive.db");
    Connection::open(&archive)
        .unwrap()
        .execute_batch("CREATE TABLE orders (total REAL); INSERT INTO orders VALUES (12.5);")
        .unwrap();

    let attach = format!("arch={}", archive.display());
    let output = fx.run(&["generate", &fx.db(), "arch.orders", "--attach", &attach]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let program = stdout(&output);
    assert!(program.starts_with("/* DATA step program generated from arch.orders */\nDATA WORK.arch_orders;\n"));
    assert!(program.contains("DATALINES4;\n12.5\n;;;;\nRUN;\n"));
}

// ---------------------------------------------------------------------------
// preview
// ---------------------------------------------------------------------------

#[test]
fn preview_has_header_and_no_values() {
    let fx = Fixture::new();
    let output = fx.run(&["preview", &fx.db(), "people"]);

    assert!(output.status.success());
    let preview = stdout(&output);
    let header = EXPECTED_PEOPLE.split("DATALINES4;\n").next().unwrap();
    assert!(preview.starts_with(header));
    assert!(preview.ends_with(
        "DATALINES4;\n\n/* Data values omitted for preview. Run the task to include all data values. */\n;;;;\n"
    ));
    assert!(!preview.contains("Ann"));
    assert!(!preview.contains("RUN;"));
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

#[test]
fn missing_table_exits_51() {
    let fx = Fixture::new();
    let output = fx.run(&["generate", &fx.db(), "nope"]);

    assert_eq!(output.status.code(), Some(51));
    assert!(stderr(&output).contains("table main.nope has no columns"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn missing_database_exits_50() {
    let fx = Fixture::new();
    let missing = fx.path("missing.db");
    let output = fx.run(&["generate", missing.to_str().unwrap(), "people"]);

    assert_eq!(output.status.code(), Some(50));
    assert!(stderr(&output).contains("cannot open data source"));
    assert!(!Path::new(&missing).exists(), "read-only open must not create the file");
}

#[test]
fn invalid_table_name_exits_2() {
    let fx = Fixture::new();
    let output = fx.run(&["generate", &fx.db(), "."]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_attach_exits_2() {
    let fx = Fixture::new();
    let output = fx.run(&["preview", &fx.db(), "people", "--attach", "archive.db"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("LIB=PATH"));
}

#[test]
fn unwritable_output_exits_3() {
    let fx = Fixture::new();
    let target = fx.path("no/such/dir/people.sas");
    let output = fx.run(&["generate", &fx.db(), "people", "-o", target.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
}

// ---------------------------------------------------------------------------
// default-name and settings
// ---------------------------------------------------------------------------

#[test]
fn default_name_is_valid_sas_name() {
    let fx = Fixture::new();
    let output = fx.run(&["default-name", "sashelp.class"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "WORK.sashelp_class\n");

    let output = fx.run(&["default-name", "main.2024 sales", "--library", "OUT"]);
    assert_eq!(stdout(&output), "OUT.main_2024_sales\n");
}

#[test]
fn settings_file_changes_defaults() {
    let fx = Fixture::new();
    fs::write(
        fx.path("settings.json"),
        "{\n  // staging area\n  \"output.library\": \"STAGE\",\n  \"source.defaultLibrary\": \"arch\"\n}\n",
    )
    .unwrap();

    let output = fx.run(&["default-name", "orders"]);
    assert_eq!(stdout(&output), "STAGE.arch_orders\n");
}

#[test]
fn config_init_writes_default_file() {
    let fx = Fixture::new();
    let output = fx.run(&["config", "--init"]);

    assert!(output.status.success());
    let written = fs::read_to_string(fx.path("settings.json")).unwrap();
    assert!(written.contains("\"output.library\": \"WORK\""));
    assert!(stdout(&output).contains("\"source.defaultLibrary\": \"main\""));
}
