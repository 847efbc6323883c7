use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "ts_model_check_cli_{}_{}_{}",
            prefix,
            std::process::id(),
            stamp
        ));
        fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }

    fn write(&self, file: &str, content: &str) -> PathBuf {
        let path = self.path.join(file);
        fs::write(&path, content).expect("write temp file");
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ts-model-check"))
        .args(args)
        .output()
        .expect("run binary")
}

#[test]
fn missing_models_file_reports_the_path_without_running_a_check() {
    let dir = TempDir::new("missing_models");
    let types = dir.write("types.ts", "export interface Event {\n  title: string;\n}\n");
    let missing = dir.path.join("nope.py");

    let output = run_cli(&[
        "-bmf",
        missing.to_str().expect("utf-8 path"),
        "-tsf",
        types.to_str().expect("utf-8 path"),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope.py"));
    assert!(stderr.contains("does not exist"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Success"));
}

#[test]
fn synced_pair_exits_zero_with_success_message() {
    let dir = TempDir::new("synced_pair");
    let models = dir.write(
        "models.py",
        "class Event(models.Model):\n    title = models.CharField(max_length=200)\n",
    );
    let types = dir.write("types.ts", "export interface Event {\n  title: string;\n}\n");

    let output = run_cli(&[
        "-bmf",
        models.to_str().expect("utf-8 path"),
        "-tsf",
        types.to_str().expect("utf-8 path"),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Success"));
}

#[test]
fn configured_checks_group_diagnostics_under_their_own_headers() {
    let dir = TempDir::new("grouped");
    let models_a = dir.write(
        "a_models.py",
        "class AlphaModel(models.Model):\n    alpha_only = models.CharField()\n",
    );
    let types_a = dir.write("a_types.ts", "export interface AlphaModel {\n}\n");
    let models_b = dir.write(
        "b_models.py",
        "class BetaModel(models.Model):\n    beta_only = models.CharField()\n",
    );
    let types_b = dir.write("b_types.ts", "export interface BetaModel {\n}\n");

    let config = dir.write(
        "config.yaml",
        &format!(
            "checks:\n  a_alpha:\n    backend_model_path: {}\n    frontend_interface_path: {}\n  b_beta:\n    backend_model_path: {}\n    frontend_interface_path: {}\n",
            models_a.display(),
            types_a.display(),
            models_b.display(),
            types_b.display()
        ),
    );

    let output = run_cli(&["--config", config.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let header_a = stdout.find("Check 'a_alpha' is out of sync:").expect("header a");
    let diag_a = stdout.find("'alpha_only'").expect("diagnostic a");
    let header_b = stdout.find("Check 'b_beta' is out of sync:").expect("header b");
    let diag_b = stdout.find("'beta_only'").expect("diagnostic b");

    // Each check's diagnostics must follow its own header.
    assert!(header_a < diag_a);
    assert!(diag_a < header_b);
    assert!(header_b < diag_b);

    assert!(stdout.contains("Please fix the 2 issues above"));
}
