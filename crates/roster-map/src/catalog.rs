//! The versioned field catalog.
//!
//! The catalog pairs every [`TargetField`] with its header aliases and the
//! value shape it expects. Profiles restrict the catalog to the subset of
//! fields a given entry point accepts.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use roster_model::TargetField;

use crate::detect::ValueDetector;
use crate::patterns::aliases;

/// Version of the alias and detector tables. Bumped whenever a change could
/// alter proposals for an existing file.
pub const CATALOG_VERSION: u32 = 1;

static STANDARD: LazyLock<FieldCatalog> = LazyLock::new(|| FieldCatalog {
    specs: TargetField::ALL.iter().map(|&field| FieldSpec::new(field)).collect(),
});

/// Named subsets of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogProfile {
    /// Every field.
    #[default]
    Full,
    /// Student and guardian fields only; no school or classroom placement.
    Web,
}

impl CatalogProfile {
    pub fn includes(self, field: TargetField) -> bool {
        match self {
            CatalogProfile::Full => true,
            CatalogProfile::Web => !matches!(field, TargetField::School | TargetField::Classroom),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CatalogProfile::Full => "full",
            CatalogProfile::Web => "web",
        }
    }
}

impl std::str::FromStr for CatalogProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(CatalogProfile::Full),
            "web" => Ok(CatalogProfile::Web),
            other => Err(format!("unknown catalog profile '{other}' (expected full or web)")),
        }
    }
}

/// How strongly a header matched a field's aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    /// The whole header is an alias.
    Strong,
    /// An alias appears inside the header.
    Weak,
    None,
}

/// One catalog entry.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    field: TargetField,
    strong: Vec<Regex>,
    weak: Vec<Regex>,
    detector: Option<ValueDetector>,
}

impl FieldSpec {
    fn new(field: TargetField) -> Self {
        let patterns = aliases(field);
        Self {
            field,
            strong: compile(patterns.strong),
            weak: compile(patterns.weak),
            detector: detector_for(field),
        }
    }

    pub fn field(&self) -> TargetField {
        self.field
    }

    /// Value detector for the field, if its values have a recognizable shape.
    pub fn detector(&self) -> Option<ValueDetector> {
        self.detector
    }

    /// Matches a normalized header against the aliases.
    pub fn header_match(&self, normalized: &str) -> HeaderMatch {
        if self.strong.iter().any(|re| re.is_match(normalized)) {
            HeaderMatch::Strong
        } else if self.weak.iter().any(|re| re.is_match(normalized)) {
            HeaderMatch::Weak
        } else {
            HeaderMatch::None
        }
    }
}

fn compile(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|source| Regex::new(source).expect("alias pattern is valid"))
        .collect()
}

fn detector_for(field: TargetField) -> Option<ValueDetector> {
    use TargetField as F;
    match field {
        F::First | F::Last | F::Guardian1Name | F::Guardian2Name => Some(ValueDetector::PersonName),
        F::StudentExternalId => Some(ValueDetector::Identifier),
        F::Grade => Some(ValueDetector::Grade),
        F::StudentEmail | F::Guardian1Email | F::Guardian2Email => Some(ValueDetector::Email),
        F::Gender => Some(ValueDetector::Gender),
        F::Pronouns => Some(ValueDetector::Pronouns),
        F::Iep | F::Ell | F::Medical => Some(ValueDetector::Boolean),
        F::Guardian1Phone | F::Guardian2Phone => Some(ValueDetector::Phone),
        F::Guardian1Relationship | F::Guardian2Relationship => Some(ValueDetector::Relationship),
        F::School | F::Classroom => None,
    }
}

/// An ordered set of field specs.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    specs: Vec<FieldSpec>,
}

impl FieldCatalog {
    /// The full catalog.
    pub fn standard() -> &'static FieldCatalog {
        &STANDARD
    }

    /// The catalog restricted to a profile.
    pub fn for_profile(profile: CatalogProfile) -> FieldCatalog {
        Self::standard().filtered(|field| profile.includes(field))
    }

    /// A copy keeping only the fields `keep` accepts.
    pub fn filtered(&self, keep: impl Fn(TargetField) -> bool) -> FieldCatalog {
        FieldCatalog {
            specs: self
                .specs
                .iter()
                .filter(|spec| keep(spec.field))
                .cloned()
                .collect(),
        }
    }

    pub fn version(&self) -> u32 {
        CATALOG_VERSION
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn fields(&self) -> impl Iterator<Item = TargetField> + '_ {
        self.specs.iter().map(FieldSpec::field)
    }

    pub fn get(&self, field: TargetField) -> Option<&FieldSpec> {
        self.specs.iter().find(|spec| spec.field == field)
    }

    pub fn contains(&self, field: TargetField) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
