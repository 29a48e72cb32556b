//! Guardian extraction for one slot.

use roster_model::{
    ColumnMapping, GuardianKey, GuardianSlot, NormalizedGuardian, SourceRow, TargetField,
};

use crate::text::cell;

/// Builds the guardian of `slot` from its mapped fields.
///
/// Returns `None` when name, email and phone are all empty. A missing name is
/// synthesized from the email local part, or falls back to "Guardian N".
pub fn extract_guardian(
    row: &SourceRow,
    mapping: &ColumnMapping,
    slot: GuardianSlot,
) -> Option<NormalizedGuardian> {
    let [name_field, email_field, phone_field, relationship_field] =
        TargetField::guardian_fields(slot);

    let name = cell(row, mapping, name_field);
    let email = cell(row, mapping, email_field).map(str::to_lowercase);
    let phone = cell(row, mapping, phone_field).map(str::to_string);
    if name.is_none() && email.is_none() && phone.is_none() {
        return None;
    }

    let synthesized_name = name.is_none();
    let name = match (name, email.as_deref()) {
        (Some(name), _) => name.to_string(),
        (None, Some(email)) => name_from_email(email)
            .unwrap_or_else(|| format!("Guardian {}", slot.number())),
        (None, None) => format!("Guardian {}", slot.number()),
    };

    let key = match &email {
        Some(email) => GuardianKey::Email(email.clone()),
        None => GuardianKey::Synthetic { name: name.clone() },
    };

    Some(NormalizedGuardian {
        slot,
        name,
        synthesized_name,
        email,
        phone,
        relationship: cell(row, mapping, relationship_field).map(str::to_string),
        key,
    })
}

/// Display name from an email local part: `ada.parent@x` → "Ada Parent".
pub fn name_from_email(email: &str) -> Option<String> {
    let local = email.split('@').next()?;
    let words: Vec<String> = local
        .split(['.', '_', '-', '+'])
        .filter(|part| !part.is_empty() && part.chars().any(char::is_alphabetic))
        .map(capitalize)
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
