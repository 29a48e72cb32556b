//! Row-level normalization.

use tracing::trace;

use roster_model::{
    ColumnMapping, Gender, GuardianSlot, NormalizedRow, NormalizedStudent, SourceRow, TargetField,
    TenantId,
};

use crate::boolean::coerce_bool;
use crate::error::{Result, RowValidationError};
use crate::guardian::extract_guardian;
use crate::text::cell;

/// Applies `mapping` to one raw row.
///
/// Text is trimmed and blank cells are treated as absent. Rows without a
/// first or last name are rejected; everything else is best-effort.
pub fn normalize_row(
    tenant: &TenantId,
    row: &SourceRow,
    mapping: &ColumnMapping,
) -> Result<NormalizedRow> {
    let text = |field| cell(row, mapping, field).map(str::to_string);

    let (first, last) = match (text(TargetField::First), text(TargetField::Last)) {
        (Some(first), Some(last)) => (first, last),
        (None, None) => return Err(RowValidationError::MissingName),
        (None, Some(_)) => return Err(RowValidationError::MissingFirstName),
        (Some(_), None) => return Err(RowValidationError::MissingLastName),
    };

    let gender = cell(row, mapping, TargetField::Gender).and_then(Gender::parse);
    let explicit = text(TargetField::Pronouns);
    let pronouns_derived = explicit.is_none();
    let pronouns = explicit.or_else(|| {
        let derived = gender.as_ref().and_then(Gender::derived_pronouns)?;
        trace!(pronouns = derived, "derived pronouns from gender");
        Some(derived.to_string())
    });
    let flag = |field| {
        mapping
            .is_mapped(field)
            .then(|| coerce_bool(mapping.raw(row, field)))
    };

    let student = NormalizedStudent {
        tenant_id: tenant.clone(),
        external_id: text(TargetField::StudentExternalId),
        first,
        last,
        grade: text(TargetField::Grade),
        email: text(TargetField::StudentEmail),
        gender,
        pronouns_derived: pronouns_derived && pronouns.is_some(),
        pronouns,
        iep: flag(TargetField::Iep),
        ell: flag(TargetField::Ell),
        medical: flag(TargetField::Medical),
        school_name: text(TargetField::School),
        classroom_name: text(TargetField::Classroom),
    };

    let guardians = [GuardianSlot::First, GuardianSlot::Second]
        .into_iter()
        .filter_map(|slot| extract_guardian(row, mapping, slot))
        .collect();

    Ok(NormalizedRow { student, guardians })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_model::{GuardianKey, SourceTable};

    fn single_row(headers: &[&str], values: &[&str]) -> (SourceTable, ColumnMapping) {
        let table = SourceTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            vec![values.iter().map(|v| v.to_string()).collect()],
        )
        .unwrap();
        let mut mapping = ColumnMapping::new();
        for header in headers {
            let field: TargetField = header.parse().unwrap();
            mapping.assign(field, *header).unwrap();
        }
        (table, mapping)
    }

    fn normalize(headers: &[&str], values: &[&str]) -> Result<NormalizedRow> {
        let (table, mapping) = single_row(headers, values);
        normalize_row(&TenantId::new("t1"), &table.rows()[0], &mapping)
    }

    #[test]
    fn test_trims_and_drops_blank_cells() {
        let row = normalize(&["first", "last", "grade", "studentEmail"], &[" Ada ", "Lovelace", "  ", ""]).unwrap();
        assert_eq!(row.student.first, "Ada");
        assert_eq!(row.student.grade, None);
        assert_eq!(row.student.email, None);
        assert!(row.guardians.is_empty());
    }

    #[test]
    fn test_missing_names() {
        assert_eq!(
            normalize(&["first", "last"], &["", " "]).unwrap_err(),
            RowValidationError::MissingName
        );
        assert_eq!(
            normalize(&["first", "last"], &["Ada", ""]).unwrap_err(),
            RowValidationError::MissingLastName
        );
        assert_eq!(
            normalize(&["last"], &["Lovelace"]).unwrap_err(),
            RowValidationError::MissingFirstName
        );
    }

    #[test]
    fn test_explicit_pronouns_win_over_gender() {
        let row = normalize(&["first", "last", "gender", "pronouns"], &["Ada", "L", "F", "they/them"]).unwrap();
        assert_eq!(row.student.gender, Some(Gender::Female));
        assert_eq!(row.student.pronouns.as_deref(), Some("they/them"));
        assert!(!row.student.pronouns_derived);
    }

    #[test]
    fn test_pronouns_derived_from_gender() {
        let row = normalize(&["first", "last", "gender", "pronouns"], &["Ada", "L", "female", " "]).unwrap();
        assert_eq!(row.student.pronouns.as_deref(), Some("she/her/her"));
        assert!(row.student.pronouns_derived);

        let row = normalize(&["first", "last", "gender"], &["Ada", "L", "Two-Spirit"]).unwrap();
        assert_eq!(row.student.gender, Some(Gender::Other("Two-Spirit".into())));
        assert_eq!(row.student.pronouns, None);
        assert!(!row.student.pronouns_derived);
    }

    #[test]
    fn test_unmapped_flags_are_absent() {
        let row = normalize(&["first", "last", "iep"], &["Ada", "L", ""]).unwrap();
        assert_eq!(row.student.iep, Some(false));
        assert_eq!(row.student.ell, None);
        assert_eq!(row.student.medical, None);
    }

    #[test]
    fn test_guardian_synthesized_from_email() {
        let row = normalize(&["first", "last", "guardian1Email"], &["Ada", "Lovelace", "Ada.Parent@Example.com"]).unwrap();
        assert_eq!(row.guardians.len(), 1);
        let guardian = &row.guardians[0];
        assert_eq!(guardian.name, "Ada Parent");
        assert_eq!(guardian.email.as_deref(), Some("ada.parent@example.com"));
        assert_eq!(guardian.key, GuardianKey::Email("ada.parent@example.com".into()));
    }

    #[test]
    fn test_guardian_without_email_gets_synthetic_key() {
        let row = normalize(
            &["first", "last", "guardian2Name", "guardian2Phone", "guardian2Relationship"],
            &["Ada", "Lovelace", "Anne Lovelace", "555 123 4567", "Mother"],
        )
        .unwrap();
        assert_eq!(row.guardians.len(), 1);
        let guardian = &row.guardians[0];
        assert_eq!(guardian.slot, GuardianSlot::Second);
        assert_eq!(guardian.relationship.as_deref(), Some("Mother"));
        assert_eq!(
            guardian.key,
            GuardianKey::Synthetic {
                name: "Anne Lovelace".into()
            }
        );
    }

    #[test]
    fn test_phone_only_guardian_is_named_by_slot() {
        let row = normalize(&["first", "last", "guardian1Phone"], &["Ada", "L", "555 123 4567"]).unwrap();
        assert_eq!(row.guardians[0].name, "Guardian 1");
    }

    #[test]
    fn test_relationship_alone_is_not_a_guardian() {
        let row = normalize(&["first", "last", "guardian1Relationship"], &["Ada", "L", "Mother"]).unwrap();
        assert!(row.guardians.is_empty());
    }
}
