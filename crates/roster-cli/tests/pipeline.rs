//! Integration tests for the import pipeline stages.

use std::path::Path;

use roster_cli::config::ImportSettings;
use roster_cli::pipeline::{import, load_mapping, load_table, propose, resolve_mapping, write_mapping};
use roster_commit::CancelFlag;
use roster_model::{TargetField, TenantId};
use roster_store::RosterStore;

const ROSTER_CSV: &str = "\
Student ID,Student First,Student Last,Grade Level,Parent Email,Homeroom
S1,Ada,Lovelace,7,ada.parent@example.com,7B
S2,Alan,Turing,8,alan.parent@example.com,8A
S3,,,9,,9C
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn settings_in(dir: &Path) -> ImportSettings {
    let mut settings = ImportSettings::default();
    settings.commit.database = dir.join("roster.sqlite3");
    settings
}

#[test]
fn propose_then_commit_with_the_written_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "roster.csv", ROSTER_CSV);
    let settings = settings_in(dir.path());

    let table = load_table(&csv, &settings).unwrap();
    assert_eq!(table.len(), 3);
    let proposal = propose(&table, &settings);
    assert_eq!(
        proposal.mapping.header(TargetField::StudentExternalId),
        Some("Student ID")
    );

    let mapping_path = dir.path().join("mapping.json");
    write_mapping(&mapping_path, &proposal.mapping).unwrap();
    assert_eq!(load_mapping(&mapping_path).unwrap(), proposal.mapping);

    let mapping = resolve_mapping(&table, Some(&mapping_path), &settings).unwrap();
    let tenant = TenantId::new("district-1");
    let report = import(&table, &mapping, &tenant, &settings, &CancelFlag::new()).unwrap();

    assert_eq!(report.created_students, 2);
    assert_eq!(report.created_guardians, 2);
    assert_eq!(report.created_classes, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].row_index, 2);
    insta::assert_snapshot!(report.to_string(), @"2/3 rows committed; students 2 created, 0 updated; guardians 2 created, 0 updated; 2 links, 0 schools, 0 classes, 0 enrollments created; 1 failed");

    let again = import(&table, &mapping, &tenant, &settings, &CancelFlag::new()).unwrap();
    assert_eq!(again.created_students, 0);
    assert_eq!(again.updated_students, 2);

    let store = RosterStore::open(&settings.commit.database).unwrap();
    assert_eq!(store.counts(&tenant).unwrap().students, 2);
}

#[test]
fn hand_edited_mapping_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "roster.csv", ROSTER_CSV);
    let mapping_path = write(
        dir.path(),
        "mapping.json",
        r#"{"first": "Student First", "last": "Student Last", "classroom": "Homeroom"}"#,
    );
    let mut settings = settings_in(dir.path());
    settings.commit.create_classes = true;

    let table = load_table(&csv, &settings).unwrap();
    let mapping = resolve_mapping(&table, Some(&mapping_path), &settings).unwrap();
    assert_eq!(mapping.len(), 3);
    assert!(!mapping.is_mapped(TargetField::Guardian1Email));

    let report = import(
        &table,
        &mapping,
        &TenantId::new("district-1"),
        &settings,
        &CancelFlag::new(),
    )
    .unwrap();
    assert_eq!(report.created_classes, 2);
    assert_eq!(report.created_enrollments, 2);
    assert_eq!(report.created_guardians, 0);
}

#[test]
fn mapping_with_unknown_header_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "roster.csv", ROSTER_CSV);
    let mapping_path = write(
        dir.path(),
        "mapping.json",
        r#"{"first": "Given Name", "last": "Student Last"}"#,
    );
    let settings = settings_in(dir.path());

    let table = load_table(&csv, &settings).unwrap();
    let err = resolve_mapping(&table, Some(&mapping_path), &settings).unwrap_err();
    assert!(format!("{err:#}").contains("column not found: Given Name"));
}

#[test]
fn mapping_file_sharing_a_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mapping_path = write(
        dir.path(),
        "mapping.json",
        r#"{"first": "Name", "last": "Name"}"#,
    );
    assert!(load_mapping(&mapping_path).is_err());
}

#[test]
fn empty_upload_aborts_before_commit() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "empty.csv", "");
    let err = load_table(&csv, &settings_in(dir.path())).unwrap_err();
    assert!(format!("{err:#}").contains("file is empty"));
}

#[test]
fn settings_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "roster.toml",
        "[mapping]\nmin_confidence = 0.8\n\n[ingest]\nheader_scan_rows = 2\n",
    );
    let settings = ImportSettings::load_or_default(Some(&path)).unwrap();
    assert!((settings.mapping.min_confidence - 0.8).abs() < f32::EPSILON);
    assert_eq!(settings.ingest.header_scan_rows, 2);
    assert!(!settings.commit.create_classes);

    let missing = dir.path().join("missing.toml");
    assert!(ImportSettings::load_or_default(Some(&missing)).is_err());
    assert_eq!(
        ImportSettings::load_or_default(None).unwrap(),
        ImportSettings::default()
    );
}
