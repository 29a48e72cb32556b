use std::thread;

use roster_commit::{CancelFlag, CommitOptions, FailureKind, commit, commit_with_cancel};
use roster_map::MappingEngine;
use roster_model::{ColumnMapping, SourceTable, TargetField, TenantId};
use roster_store::{EntityCounts, RosterStore};

fn table(headers: &[&str], rows: &[&[&str]]) -> SourceTable {
    SourceTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect(),
    )
    .unwrap()
}

fn mapping(pairs: &[(TargetField, &str)]) -> ColumnMapping {
    let mut mapping = ColumnMapping::new();
    for (field, header) in pairs {
        mapping.assign(*field, *header).unwrap();
    }
    mapping
}

const ROSTER_HEADERS: &[&str] = &[
    "Student ID",
    "First",
    "Last",
    "Grade",
    "Parent Email",
    "Parent Phone",
    "Relationship",
    "School",
    "Homeroom",
];

fn roster() -> (SourceTable, ColumnMapping) {
    let table = table(
        ROSTER_HEADERS,
        &[
            &["S1", "Ada", "Lovelace", "7", "anne@example.com", "555-0101", "Mother", "Springfield", "7B"],
            &["S2", "Alan", "Turing", "8", "ethel@example.com", "", "", "Springfield", "8A"],
            &["S3", "Grace", "Hopper", "7", "", "555-0103", "Father", "Shelbyville", "7B"],
        ],
    );
    let mapping = mapping(&[
        (TargetField::StudentExternalId, "Student ID"),
        (TargetField::First, "First"),
        (TargetField::Last, "Last"),
        (TargetField::Grade, "Grade"),
        (TargetField::Guardian1Email, "Parent Email"),
        (TargetField::Guardian1Phone, "Parent Phone"),
        (TargetField::Guardian1Relationship, "Relationship"),
        (TargetField::School, "School"),
        (TargetField::Classroom, "Homeroom"),
    ]);
    (table, mapping)
}

const CREATE_CLASSES: CommitOptions = CommitOptions {
    create_classes: true,
};

#[test]
fn second_commit_with_external_ids_only_updates() {
    let tenant = TenantId::new("district-1");
    let mut store = RosterStore::open_in_memory().unwrap();
    let (table, mapping) = roster();

    let first = commit(&mut store, &tenant, &mapping, table.rows(), CREATE_CLASSES);
    assert!(!first.has_failures(), "{:?}", first.failures);
    assert_eq!(first.created_students, 3);
    assert_eq!(first.created_guardians, 3);
    assert_eq!(first.created_links, 3);
    assert_eq!(first.created_schools, 2);
    assert_eq!(first.created_classes, 2);
    assert_eq!(first.created_enrollments, 3);
    let counts = store.counts(&tenant).unwrap();

    let second = commit(&mut store, &tenant, &mapping, table.rows(), CREATE_CLASSES);
    assert!(!second.has_failures());
    assert_eq!(second.created_students, 0);
    assert_eq!(second.updated_students, 3);
    assert_eq!(second.created_guardians, 0);
    assert_eq!(second.updated_guardians, 3);
    assert_eq!(second.created_links, 0);
    assert_eq!(second.created_schools, 0);
    assert_eq!(second.created_classes, 0);
    assert_eq!(second.created_enrollments, 0);
    assert_eq!(store.counts(&tenant).unwrap(), counts);
}

#[test]
fn proposed_mapping_commits_the_example_row() {
    let tenant = TenantId::new("district-1");
    let table = table(
        &["Student First", "Student Last", "Grade Level", "Parent Email"],
        &[&["Ada", "Lovelace", "7", "ada.parent@example.com"]],
    );
    let proposal = MappingEngine::default().propose(&table);
    let mut store = RosterStore::open_in_memory().unwrap();

    let report = commit(
        &mut store,
        &tenant,
        &proposal.mapping,
        table.rows(),
        CommitOptions::default(),
    );

    assert_eq!(report.created_students, 1);
    assert_eq!(report.created_guardians, 1);
    assert_eq!(report.created_links, 1);
    assert!(report.failures.is_empty());

    let students = store.students(&tenant).unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].grade.as_deref(), Some("7"));
    let guardians = store.guardians_of(&tenant, &students[0].id).unwrap();
    assert_eq!(guardians.len(), 1);
    assert_eq!(guardians[0].0.name, "Ada Parent");
    assert_eq!(guardians[0].0.email.as_deref(), Some("ada.parent@example.com"));
}

#[test]
fn rows_without_external_id_duplicate_on_reimport() {
    let tenant = TenantId::new("district-1");
    let table = table(&["First", "Last"], &[&["Ada", "Lovelace"]]);
    let mapping = mapping(&[(TargetField::First, "First"), (TargetField::Last, "Last")]);
    let mut store = RosterStore::open_in_memory().unwrap();

    for _ in 0..2 {
        let report = commit(&mut store, &tenant, &mapping, table.rows(), CommitOptions::default());
        assert_eq!(report.created_students, 1);
    }
    assert_eq!(store.counts(&tenant).unwrap().students, 2);
}

#[test]
fn nameless_row_is_skipped_and_reported() {
    let tenant = TenantId::new("district-1");
    let table = table(
        &["First", "Last", "Grade"],
        &[
            &["Ada", "Lovelace", "7"],
            &["Alan", "Turing", "8"],
            &["  ", "", "9"],
            &["Grace", "Hopper", "7"],
        ],
    );
    let mapping = mapping(&[
        (TargetField::First, "First"),
        (TargetField::Last, "Last"),
        (TargetField::Grade, "Grade"),
    ]);
    let mut store = RosterStore::open_in_memory().unwrap();

    let report = commit(&mut store, &tenant, &mapping, table.rows(), CommitOptions::default());

    assert_eq!(report.rows_total, 4);
    assert_eq!(report.rows_committed, 3);
    assert_eq!(report.created_students, 3);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.row_index, 2);
    assert_eq!(failure.kind, FailureKind::Validation);
    assert_eq!(failure.message, "missing first and last name");
}

#[test]
fn late_failure_rolls_back_the_whole_row() {
    let tenant = TenantId::new("district-1");
    let (table, mapping) = roster();
    let mut store = RosterStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_enrollment BEFORE INSERT ON enrollments
             WHEN (SELECT external_id FROM students WHERE id = NEW.student_id) = 'S2'
             BEGIN SELECT RAISE(ABORT, 'enrollment rejected'); END;",
        )
        .unwrap();

    let report = commit(&mut store, &tenant, &mapping, table.rows(), CREATE_CLASSES);

    assert_eq!(report.rows_committed, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].row_index, 1);
    assert_eq!(report.failures[0].kind, FailureKind::Commit);
    assert!(report.failures[0].message.starts_with("enrollment"));

    assert!(store.find_student(&tenant, "S2").unwrap().is_none());
    assert!(store.find_guardian(&tenant, "ethel@example.com").unwrap().is_none());
    assert!(store.find_classroom(&tenant, "8A").unwrap().is_none());
    assert_eq!(
        store.counts(&tenant).unwrap(),
        EntityCounts {
            schools: 2,
            students: 2,
            guardians: 2,
            links: 2,
            classrooms: 1,
            enrollments: 2,
        }
    );
    assert_eq!(report.created_students, 2);
    assert_eq!(report.created_classes, 1);
}

#[test]
fn concurrent_imports_into_one_tenant_converge() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.sqlite3");
    let tenant = TenantId::new("district-1");
    drop(RosterStore::open(&path).unwrap());

    let (table, mapping) = roster();
    let reports = thread::scope(|scope| {
        let import = || {
            let mut store = RosterStore::open(&path).unwrap();
            commit(&mut store, &tenant, &mapping, table.rows(), CREATE_CLASSES)
        };
        let first = scope.spawn(import);
        let second = scope.spawn(import);
        [first.join().unwrap(), second.join().unwrap()]
    });

    for report in &reports {
        assert!(!report.has_failures(), "{:?}", report.failures);
    }
    let created: usize = reports.iter().map(|r| r.created_students).sum();
    let classes: usize = reports.iter().map(|r| r.created_classes).sum();
    assert_eq!(created, 3);
    assert_eq!(classes, 2);

    let store = RosterStore::open(&path).unwrap();
    let counts = store.counts(&tenant).unwrap();
    assert_eq!(counts.students, 3);
    assert_eq!(counts.guardians, 3);
    assert_eq!(counts.schools, 2);
    assert_eq!(counts.classrooms, 2);
    assert_eq!(counts.enrollments, 3);
}

#[test]
fn cancelled_import_stops_before_the_next_row() {
    let tenant = TenantId::new("district-1");
    let (table, mapping) = roster();
    let mut store = RosterStore::open_in_memory().unwrap();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let report = commit_with_cancel(
        &mut store,
        &tenant,
        &mapping,
        table.rows(),
        CREATE_CLASSES,
        &cancel,
    );

    assert!(report.cancelled);
    assert_eq!(report.rows_committed, 0);
    assert_eq!(report.rows_total, 3);
    assert_eq!(store.counts(&tenant).unwrap(), EntityCounts::default());
}

#[test]
fn existing_classroom_is_used_without_create_classes() {
    let tenant = TenantId::new("district-1");
    let (table, mapping) = roster();
    let mut store = RosterStore::open_in_memory().unwrap();

    let report = commit(&mut store, &tenant, &mapping, table.rows(), CommitOptions::default());
    assert_eq!(report.created_classes, 0);
    assert_eq!(report.created_enrollments, 0);
    assert_eq!(store.counts(&tenant).unwrap().classrooms, 0);

    let tx = store.begin().unwrap();
    tx.upsert_classroom(&tenant, "7B", Some("7"), None).unwrap();
    tx.commit().unwrap();

    let report = commit(&mut store, &tenant, &mapping, table.rows(), CommitOptions::default());
    assert_eq!(report.created_classes, 0);
    assert_eq!(report.created_enrollments, 2);
    assert_eq!(store.counts(&tenant).unwrap().classrooms, 1);
}

#[test]
fn relationship_label_survives_reimport() {
    let tenant = TenantId::new("district-1");
    let (original, mapping) = roster();
    let mut store = RosterStore::open_in_memory().unwrap();
    commit(&mut store, &tenant, &mapping, original.rows(), CommitOptions::default());

    let relabelled = table(
        ROSTER_HEADERS,
        &[&["S1", "Ada", "Lovelace", "7", "anne@example.com", "", "Aunt", "Springfield", "7B"]],
    );
    commit(&mut store, &tenant, &mapping, relabelled.rows(), CommitOptions::default());

    let student = store.find_student(&tenant, "S1").unwrap().unwrap();
    let guardians = store.guardians_of(&tenant, &student.id).unwrap();
    assert_eq!(guardians.len(), 1);
    assert_eq!(guardians[0].1.as_deref(), Some("Mother"));
    assert_eq!(guardians[0].0.phone.as_deref(), Some("555-0101"));
}

#[test]
fn reimport_with_fewer_columns_keeps_unmapped_fields() {
    let tenant = TenantId::new("district-1");
    let mut store = RosterStore::open_in_memory().unwrap();

    let full = table(
        &["ID", "First", "Last", "Grade", "Gender", "Pronouns", "IEP", "ELL", "School"],
        &[&["S1", "Ada", "Lovelace", "7", "F", "they/them", "yes", "Y", "Springfield"]],
    );
    let full_mapping = mapping(&[
        (TargetField::StudentExternalId, "ID"),
        (TargetField::First, "First"),
        (TargetField::Last, "Last"),
        (TargetField::Grade, "Grade"),
        (TargetField::Gender, "Gender"),
        (TargetField::Pronouns, "Pronouns"),
        (TargetField::Iep, "IEP"),
        (TargetField::Ell, "ELL"),
        (TargetField::School, "School"),
    ]);
    let report = commit(&mut store, &tenant, &full_mapping, full.rows(), CommitOptions::default());
    assert!(!report.has_failures(), "{:?}", report.failures);
    let before = store.find_student(&tenant, "S1").unwrap().unwrap();

    let contacts = table(
        &["ID", "First", "Last", "Gender", "Parent Email"],
        &[&["S1", "Ada", "Lovelace", "F", "anne@example.com"]],
    );
    let contacts_mapping = mapping(&[
        (TargetField::StudentExternalId, "ID"),
        (TargetField::First, "First"),
        (TargetField::Last, "Last"),
        (TargetField::Gender, "Gender"),
        (TargetField::Guardian1Email, "Parent Email"),
    ]);
    let report = commit(
        &mut store,
        &tenant,
        &contacts_mapping,
        contacts.rows(),
        CommitOptions::default(),
    );
    assert_eq!(report.updated_students, 1);
    assert_eq!(report.created_guardians, 1);

    let after = store.find_student(&tenant, "S1").unwrap().unwrap();
    assert_eq!(after.pronouns.as_deref(), Some("they/them"));
    assert!(!after.pronouns_derived);
    assert!(after.iep);
    assert!(after.ell);
    assert!(!after.medical);
    assert_eq!(after.grade.as_deref(), Some("7"));
    assert_eq!(after.school_id, before.school_id);
}

#[test]
fn gender_change_refreshes_derived_pronouns() {
    let tenant = TenantId::new("district-1");
    let mut store = RosterStore::open_in_memory().unwrap();
    let gender_mapping = mapping(&[
        (TargetField::StudentExternalId, "ID"),
        (TargetField::First, "First"),
        (TargetField::Last, "Last"),
        (TargetField::Gender, "Gender"),
    ]);
    let headers = &["ID", "First", "Last", "Gender"];

    let first = table(headers, &[&["S1", "Alex", "Kim", "M"]]);
    commit(&mut store, &tenant, &gender_mapping, first.rows(), CommitOptions::default());
    let stored = store.find_student(&tenant, "S1").unwrap().unwrap();
    assert_eq!(stored.pronouns.as_deref(), Some("he/him/his"));
    assert!(stored.pronouns_derived);

    let second = table(headers, &[&["S1", "Alex", "Kim", "nonbinary"]]);
    commit(&mut store, &tenant, &gender_mapping, second.rows(), CommitOptions::default());
    let stored = store.find_student(&tenant, "S1").unwrap().unwrap();
    assert_eq!(stored.pronouns.as_deref(), Some("they/them/their"));
}
