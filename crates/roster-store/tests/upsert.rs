use roster_model::{GuardianKey, GuardianSlot, NormalizedGuardian, NormalizedStudent, TenantId};
use roster_store::{EntityCounts, RosterStore};

fn student(tenant: &TenantId, external_id: Option<&str>, first: &str) -> NormalizedStudent {
    NormalizedStudent {
        tenant_id: tenant.clone(),
        external_id: external_id.map(String::from),
        first: first.to_string(),
        last: "Lovelace".to_string(),
        grade: Some("7".to_string()),
        email: None,
        gender: None,
        pronouns: None,
        pronouns_derived: false,
        iep: Some(false),
        ell: Some(false),
        medical: Some(false),
        school_name: None,
        classroom_name: None,
    }
}

fn guardian(name: &str, email: Option<&str>, synthesized_name: bool) -> NormalizedGuardian {
    NormalizedGuardian {
        slot: GuardianSlot::First,
        name: name.to_string(),
        synthesized_name,
        email: email.map(String::from),
        phone: None,
        relationship: None,
        key: match email {
            Some(email) => GuardianKey::Email(email.to_string()),
            None => GuardianKey::Synthetic {
                name: name.to_string(),
            },
        },
    }
}

#[test]
fn student_with_external_id_is_updated_in_place() {
    let tenant = TenantId::new("t1");
    let mut store = RosterStore::open_in_memory().unwrap();

    let tx = store.begin().unwrap();
    let first = tx.upsert_student(&student(&tenant, Some("S1"), "Ada"), None).unwrap();
    tx.commit().unwrap();
    assert!(first.created);

    let mut renamed = student(&tenant, Some("S1"), "Augusta");
    renamed.grade = None;
    renamed.iep = Some(true);
    renamed.ell = None;
    let tx = store.begin().unwrap();
    let second = tx.upsert_student(&renamed, None).unwrap();
    tx.commit().unwrap();

    assert!(!second.created);
    assert_eq!(second.id, first.id);
    let stored = store.find_student(&tenant, "S1").unwrap().unwrap();
    assert_eq!(stored.first, "Augusta");
    assert_eq!(stored.grade.as_deref(), Some("7"));
    assert!(stored.iep);

    let mut without_flags = student(&tenant, Some("S1"), "Augusta");
    without_flags.iep = None;
    let tx = store.begin().unwrap();
    tx.upsert_student(&without_flags, None).unwrap();
    tx.commit().unwrap();
    assert!(store.find_student(&tenant, "S1").unwrap().unwrap().iep);
}

#[test]
fn derived_pronouns_only_replace_derived_pronouns() {
    let tenant = TenantId::new("t1");
    let mut store = RosterStore::open_in_memory().unwrap();
    let upsert = |store: &mut RosterStore, pronouns: Option<&str>, derived: bool| {
        let mut record = student(&tenant, Some("S1"), "Ada");
        record.pronouns = pronouns.map(String::from);
        record.pronouns_derived = derived;
        let tx = store.begin().unwrap();
        tx.upsert_student(&record, None).unwrap();
        tx.commit().unwrap();
        store.find_student(&tenant, "S1").unwrap().unwrap()
    };

    let stored = upsert(&mut store, Some("she/her/her"), true);
    assert!(stored.pronouns_derived);

    let stored = upsert(&mut store, Some("they/them/their"), true);
    assert_eq!(stored.pronouns.as_deref(), Some("they/them/their"));

    let stored = upsert(&mut store, Some("they/them"), false);
    assert_eq!(stored.pronouns.as_deref(), Some("they/them"));
    assert!(!stored.pronouns_derived);

    let stored = upsert(&mut store, Some("she/her/her"), true);
    assert_eq!(stored.pronouns.as_deref(), Some("they/them"));
    assert!(!stored.pronouns_derived);

    let stored = upsert(&mut store, None, false);
    assert_eq!(stored.pronouns.as_deref(), Some("they/them"));

    let stored = upsert(&mut store, Some("xe/xem"), false);
    assert_eq!(stored.pronouns.as_deref(), Some("xe/xem"));
}

#[test]
fn students_without_external_id_always_insert() {
    let tenant = TenantId::new("t1");
    let mut store = RosterStore::open_in_memory().unwrap();
    for _ in 0..2 {
        let tx = store.begin().unwrap();
        assert!(tx.upsert_student(&student(&tenant, None, "Ada"), None).unwrap().created);
        tx.commit().unwrap();
    }
    assert_eq!(store.counts(&tenant).unwrap().students, 2);
}

#[test]
fn natural_keys_are_tenant_scoped() {
    let mut store = RosterStore::open_in_memory().unwrap();
    for tenant in ["t1", "t2"] {
        let tenant = TenantId::new(tenant);
        let tx = store.begin().unwrap();
        assert!(tx.upsert_school(&tenant, "Springfield").unwrap().created);
        assert!(tx.upsert_student(&student(&tenant, Some("S1"), "Ada"), None).unwrap().created);
        tx.commit().unwrap();
    }
    let counts = store.counts(&TenantId::new("t1")).unwrap();
    assert_eq!(counts.schools, 1);
    assert_eq!(counts.students, 1);
}

#[test]
fn guardian_link_keeps_relationship_label() {
    let tenant = TenantId::new("t1");
    let mut store = RosterStore::open_in_memory().unwrap();

    let tx = store.begin().unwrap();
    let s = tx.upsert_student(&student(&tenant, Some("S1"), "Ada"), None).unwrap();
    let g = tx
        .upsert_guardian(&tenant, &guardian("Anne", Some("anne@example.com"), false), "anne@example.com")
        .unwrap();
    assert!(tx.link_guardian(&tenant, &s.id, &g.id, Some("Mother")).unwrap());
    assert!(!tx.link_guardian(&tenant, &s.id, &g.id, Some("Aunt")).unwrap());
    tx.commit().unwrap();

    let linked = store.guardians_of(&tenant, &s.id).unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].1.as_deref(), Some("Mother"));
}

#[test]
fn synthesized_name_does_not_replace_a_real_one() {
    let tenant = TenantId::new("t1");
    let mut store = RosterStore::open_in_memory().unwrap();
    let key = "anne@example.com";

    let tx = store.begin().unwrap();
    tx.upsert_guardian(&tenant, &guardian("Anne Lovelace", Some(key), false), key)
        .unwrap();
    let again = tx
        .upsert_guardian(&tenant, &guardian("Anne", Some(key), true), key)
        .unwrap();
    tx.commit().unwrap();

    assert!(!again.created);
    let stored = store.find_guardian(&tenant, key).unwrap().unwrap();
    assert_eq!(stored.name, "Anne Lovelace");
}

#[test]
fn classroom_fill_in_and_lookup() {
    let tenant = TenantId::new("t1");
    let mut store = RosterStore::open_in_memory().unwrap();

    let tx = store.begin().unwrap();
    assert_eq!(tx.find_classroom_id(&tenant, "7B").unwrap(), None);
    let created = tx.upsert_classroom(&tenant, "7B", None, None).unwrap();
    let again = tx.upsert_classroom(&tenant, "7B", Some("7"), None).unwrap();
    assert_eq!(tx.find_classroom_id(&tenant, "7B").unwrap(), Some(created.id.clone()));
    tx.commit().unwrap();

    assert!(created.created);
    assert!(!again.created);
    let classroom = store.find_classroom(&tenant, "7B").unwrap().unwrap();
    assert_eq!(classroom.grade.as_deref(), Some("7"));
}

#[test]
fn dropped_transaction_rolls_back() {
    let tenant = TenantId::new("t1");
    let mut store = RosterStore::open_in_memory().unwrap();
    {
        let tx = store.begin().unwrap();
        tx.upsert_school(&tenant, "Springfield").unwrap();
    }
    assert_eq!(store.counts(&tenant).unwrap(), EntityCounts::default());
}

#[test]
fn reopening_a_file_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.sqlite3");
    let tenant = TenantId::new("t1");
    {
        let mut store = RosterStore::open(&path).unwrap();
        let tx = store.begin().unwrap();
        tx.upsert_school(&tenant, "Springfield").unwrap();
        tx.commit().unwrap();
    }
    let store = RosterStore::open(&path).unwrap();
    assert_eq!(store.counts(&tenant).unwrap().schools, 1);
}
