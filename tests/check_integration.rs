use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ts_model_check::{check_files, CheckOptions};

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
            "ts_model_check_check_{}_{}_{}",
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

const EVENT_MODELS: &str = r#"
from django.db import models


class EventModel(models.Model):
    title = models.CharField(max_length=200)
    description = models.TextField()
    organizer = models.ForeignKey("User", on_delete=models.CASCADE)
    participants = models.ManyToManyField("User", related_name="events", blank=True)
    is_private = models.BooleanField(default=True)
    date = models.DateTimeField()
    _private_field = models.CharField(max_length=100)
"#;

const VALID_INTERFACES: &str = r#"
export interface Event {
  title: string;
  description: string;
  organizer: User;
  participants?: User[];
}

export interface EventExtended extends Event {
  isPrivate: boolean;
  // ts-model-check: ignore field date
}

export interface User {
  id: string;
  name: string;
}
"#;

fn event_conversions() -> BTreeMap<String, Vec<String>> {
    let mut conversions = BTreeMap::new();
    conversions.insert(
        "EventModel".to_string(),
        vec!["Event".to_string(), "EventExtended".to_string()],
    );
    conversions
}

#[test]
fn synced_model_split_across_interfaces_is_clean() {
    let dir = TempDir::new("synced");
    let models = dir.write("models.py", EVENT_MODELS);
    let types = dir.write("types.ts", VALID_INTERFACES);

    let options = CheckOptions {
        check_blank: false,
        name_conversions: event_conversions(),
    };
    let diagnostics = check_files(&models, &types, &options).expect("check");
    assert_eq!(diagnostics, Vec::<String>::new());
}

#[test]
fn blank_field_with_optional_property_agrees() {
    let dir = TempDir::new("blank_ok");
    let models = dir.write("models.py", EVENT_MODELS);
    let types = dir.write("types.ts", VALID_INTERFACES);

    let options = CheckOptions {
        check_blank: true,
        name_conversions: event_conversions(),
    };
    let diagnostics = check_files(&models, &types, &options).expect("check");
    assert!(diagnostics.is_empty());
}

#[test]
fn extra_backend_field_is_reported_with_both_name_forms() {
    let dir = TempDir::new("missing_field");
    let models = dir.write(
        "models.py",
        "from django.db import models\n\nclass TestModel(models.Model):\n    name = models.CharField(max_length=100)\n    extra_field = models.IntegerField()\n",
    );
    let types = dir.write("types.ts", "export interface TestModel {\n    name: string;\n}\n");

    let diagnostics =
        check_files(&models, &types, &CheckOptions::default()).expect("check");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("'extra_field'"));
    assert!(diagnostics[0].contains("'extraField'"));
    assert!(diagnostics[0].contains("TestModel"));
}

#[test]
fn unmatched_model_reports_once_and_skips_field_checks() {
    let dir = TempDir::new("unmatched");
    let models = dir.write(
        "models.py",
        "class UnmatchedModel(models.Model):\n    name = models.CharField(max_length=100)\n",
    );
    let types = dir.write(
        "types.ts",
        "export interface DifferentInterface {\n    something: string;\n}\n",
    );

    let diagnostics =
        check_files(&models, &types, &CheckOptions::default()).expect("check");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0]
        .contains("No matching TypeScript interface found for model: UnmatchedModel"));
}

#[test]
fn misordered_properties_report_exactly_once_per_model() {
    let dir = TempDir::new("unordered");
    let models = dir.write(
        "models.py",
        "class Pair(models.Model):\n    first = models.CharField()\n    second = models.CharField()\n",
    );
    // Both matched interfaces are misordered; still one diagnostic.
    let types = dir.write(
        "types.ts",
        "interface PairA {\n  second: string;\n  first: string;\n}\ninterface PairB {\n  second: string;\n}\n",
    );

    let mut conversions = BTreeMap::new();
    conversions.insert(
        "Pair".to_string(),
        vec!["PairA".to_string(), "PairB".to_string()],
    );
    let options = CheckOptions {
        check_blank: false,
        name_conversions: conversions,
    };

    let diagnostics = check_files(&models, &types, &options).expect("check");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("unordered"));
}

#[test]
fn ordering_is_not_checked_when_fields_are_missing() {
    let dir = TempDir::new("missing_then_order");
    let models = dir.write(
        "models.py",
        "class Pair(models.Model):\n    first = models.CharField()\n    second = models.CharField()\n    third = models.CharField()\n",
    );
    let types = dir.write(
        "types.ts",
        "interface Pair {\n  second: string;\n  first: string;\n}\n",
    );

    let diagnostics =
        check_files(&models, &types, &CheckOptions::default()).expect("check");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("'third'"));
}

#[test]
fn forward_cursor_rule_rejects_backtracking_even_when_all_fields_covered() {
    let dir = TempDir::new("cursor");
    let models = dir.write("models.py", EVENT_MODELS);
    // isPrivate appears before organizer, which needs a backwards scan.
    let types = dir.write(
        "types.ts",
        "export interface EventModel {\n  title: string;\n  description: string;\n  isPrivate: boolean;\n  organizer: User;\n  // ts-model-check: ignore field participants\n  // ts-model-check: ignore field date\n}\n",
    );

    let diagnostics =
        check_files(&models, &types, &CheckOptions::default()).expect("check");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("unordered"));
}

#[test]
fn blank_field_without_optional_marker_mismatches_only_when_enabled() {
    let dir = TempDir::new("blank");
    let models = dir.write(
        "models.py",
        "class NoteModel(models.Model):\n    body = models.TextField(blank=True)\n",
    );
    let types = dir.write(
        "types.ts",
        "export interface NoteModel {\n  body: string;\n}\n",
    );

    let disabled =
        check_files(&models, &types, &CheckOptions::default()).expect("check");
    assert!(disabled.is_empty());

    let options = CheckOptions {
        check_blank: true,
        ..CheckOptions::default()
    };
    let enabled = check_files(&models, &types, &options).expect("check");
    assert_eq!(enabled.len(), 1);
    assert!(enabled[0].contains("'body'"));
    assert!(enabled[0].contains("optional"));
}

#[test]
fn blank_check_runs_even_when_fields_are_missing() {
    let dir = TempDir::new("blank_and_missing");
    let models = dir.write(
        "models.py",
        "class NoteModel(models.Model):\n    body = models.TextField(blank=True)\n    extra = models.CharField()\n",
    );
    let types = dir.write(
        "types.ts",
        "export interface NoteModel {\n  body: string;\n}\n",
    );

    let options = CheckOptions {
        check_blank: true,
        ..CheckOptions::default()
    };
    let diagnostics = check_files(&models, &types, &options).expect("check");
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics[0].contains("'extra'"));
    assert!(diagnostics[1].contains("allows blank values"));
}

#[test]
fn raw_field_name_in_ignore_annotation_accounts_for_the_field() {
    let dir = TempDir::new("raw_ignore");
    let models = dir.write(
        "models.py",
        "class M(models.Model):\n    is_private = models.BooleanField()\n    extra = models.CharField()\n",
    );
    // Annotated with the raw snake_case name rather than the camelCase form.
    let types = dir.write(
        "types.ts",
        "export interface M {\n  // ts-model-check: ignore field is_private\n}\n",
    );

    let diagnostics =
        check_files(&models, &types, &CheckOptions::default()).expect("check");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("'extra'"));
    assert!(!diagnostics[0].contains("is_private"));
}
