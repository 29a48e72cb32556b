use std::collections::BTreeSet;

use proptest::prelude::*;
use roster_map::{CatalogProfile, FieldCatalog, MapperOptions, MappingEngine, WarningKind};
use roster_model::{SourceTable, TargetField};

fn table(headers: &[&str], rows: &[&[&str]]) -> SourceTable {
    SourceTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect(),
    )
    .unwrap()
}

#[test]
fn proposes_the_obvious_roster_mapping() {
    let table = table(
        &["Student First", "Student Last", "Grade Level", "Parent Email"],
        &[
            &["Ada", "Lovelace", "7", "ada.parent@example.com"],
            &["Alan", "Turing", "8", "alan.parent@example.com"],
        ],
    );
    let proposal = MappingEngine::default().propose(&table);

    assert_eq!(
        serde_json::to_value(&proposal.mapping).unwrap(),
        serde_json::json!({
            "first": "Student First",
            "last": "Student Last",
            "grade": "Grade Level",
            "guardian1Email": "Parent Email",
        })
    );
    assert!(proposal.is_complete());
    assert!(proposal.unmapped_headers.is_empty());
    assert_eq!(
        proposal.samples[&TargetField::First],
        vec!["Ada".to_string(), "Alan".to_string()]
    );
    assert!(proposal.confidence(TargetField::Grade).unwrap() >= 0.9);
    assert!(
        proposal
            .warnings
            .iter()
            .all(|w| w.kind != WarningKind::MissingRequired)
    );
}

#[test]
fn numbered_guardian_headers_fill_their_slots() {
    let table = table(
        &[
            "First",
            "Last",
            "Parent 1 Name",
            "Parent 1 Email",
            "Parent 2 Name",
            "Parent 2 Email",
            "Parent 2 Phone",
        ],
        &[&[
            "Ada",
            "Lovelace",
            "Anne Lovelace",
            "anne@example.com",
            "George Lovelace",
            "george@example.com",
            "555-123-4567",
        ]],
    );
    let proposal = MappingEngine::default().propose(&table);
    let mapping = &proposal.mapping;

    assert_eq!(mapping.header(TargetField::Guardian1Name), Some("Parent 1 Name"));
    assert_eq!(mapping.header(TargetField::Guardian1Email), Some("Parent 1 Email"));
    assert_eq!(mapping.header(TargetField::Guardian2Name), Some("Parent 2 Name"));
    assert_eq!(mapping.header(TargetField::Guardian2Email), Some("Parent 2 Email"));
    assert_eq!(mapping.header(TargetField::Guardian2Phone), Some("Parent 2 Phone"));
    assert!(!mapping.is_mapped(TargetField::Guardian1Phone));
}

#[test]
fn assignments_explain_themselves() {
    let table = table(&["First Name", "Last Name"], &[&["Ada", "Lovelace"]]);
    let proposal = MappingEngine::default().propose(&table);
    let assignment = proposal.assignment(TargetField::First).unwrap();
    assert_eq!(assignment.header, "First Name");
    assert!(!assignment.score.explanation.is_empty());
    assert!(assignment.score.explain().contains("Header alias"));
}

#[test]
fn web_profile_leaves_placement_columns_unmapped() {
    let table = table(
        &["First", "Last", "School", "Homeroom"],
        &[&["Ada", "Lovelace", "Springfield", "Room 12"]],
    );

    let full = MappingEngine::default().propose(&table);
    assert_eq!(full.mapping.header(TargetField::School), Some("School"));
    assert_eq!(full.mapping.header(TargetField::Classroom), Some("Homeroom"));

    let web = MappingEngine::new(MapperOptions {
        profile: CatalogProfile::Web,
        ..MapperOptions::default()
    })
    .propose(&table);
    assert!(!web.mapping.is_mapped(TargetField::School));
    assert!(!web.mapping.is_mapped(TargetField::Classroom));
    assert_eq!(web.unmapped_headers, vec!["School", "Homeroom"]);
}

#[test]
fn custom_catalog_subset() {
    let catalog = FieldCatalog::standard().filtered(|field| field.is_student_field());
    let engine = MappingEngine::with_catalog(catalog, MapperOptions::default());
    let proposal = engine.propose(&table(
        &["First", "Last", "Parent Email"],
        &[&["Ada", "Lovelace", "ada.parent@example.com"]],
    ));
    assert_eq!(proposal.mapping.len(), 2);
    assert_eq!(proposal.unmapped_headers, vec!["Parent Email"]);
}

#[test]
fn raising_the_threshold_drops_weak_matches() {
    let table = table(&["First", "Last", "Grade"], &[&["Ada", "Lovelace", "A+"]]);

    let lenient = MappingEngine::default().propose(&table);
    assert!(lenient.mapping.is_mapped(TargetField::Grade));

    let strict = MappingEngine::new(MapperOptions {
        min_confidence: 0.9,
        ..MapperOptions::default()
    })
    .propose(&table);
    assert!(!strict.mapping.is_mapped(TargetField::Grade));
    assert!(strict.warnings.iter().any(|w| {
        w.field == TargetField::Grade && w.kind == WarningKind::BelowThreshold
    }));
}

#[test]
fn proposal_is_deterministic() {
    let table = table(
        &["Email", "E-mail", "First", "Last"],
        &[&["a@x.org", "b@x.org", "Ada", "Lovelace"]],
    );
    let engine = MappingEngine::default();
    let first = engine.propose(&table);
    let second = engine.propose(&table);
    assert_eq!(first.mapping, second.mapping);
    assert_eq!(first.mapping.header(TargetField::StudentEmail), Some("Email"));
}

const HEADER_POOL: &[&str] = &[
    "First",
    "First Name",
    "Last",
    "Surname",
    "Student ID",
    "ID",
    "Grade",
    "Year",
    "Email",
    "E-mail",
    "Gender",
    "Sex",
    "Pronouns",
    "IEP",
    "ELL",
    "Medical",
    "School",
    "Homeroom",
    "Class",
    "Parent",
    "Parent Email",
    "Guardian Email",
    "Parent 2 Email",
    "Phone",
    "Parent Phone",
    "Relationship",
    "Notes",
];

const VALUE_POOL: &[&str] = &[
    "Ada",
    "7",
    "K",
    "a@example.com",
    "555-123-4567",
    "Yes",
    "F",
    "she/her",
    "S123",
    "Mother",
    "",
];

proptest! {
    #[test]
    fn mapping_is_always_injective(
        headers in prop::sample::subsequence(HEADER_POOL.to_vec(), 1..HEADER_POOL.len()),
        values in prop::collection::vec(prop::sample::select(VALUE_POOL.to_vec()), HEADER_POOL.len()),
    ) {
        let row: &[&str] = &values[..headers.len()];
        let table = table(&headers, &[row]);
        let proposal = MappingEngine::default().propose(&table);

        let used: Vec<&str> = proposal.mapping.iter().map(|(_, header)| header).collect();
        let unique: BTreeSet<&str> = used.iter().copied().collect();
        prop_assert_eq!(used.len(), unique.len());
        for header in &used {
            prop_assert!(headers.contains(header));
        }
        prop_assert_eq!(proposal.assignments.len(), proposal.mapping.len());
        prop_assert_eq!(
            proposal.mapping.len() + proposal.unmapped_headers.len(),
            headers.len()
        );
        for assignment in &proposal.assignments {
            prop_assert!(assignment.score.confidence >= 0.5);
        }
    }
}
