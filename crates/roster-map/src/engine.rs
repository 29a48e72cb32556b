//! Mapping engine: scores every header against every catalog field and
//! proposes a one-to-one assignment.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use roster_ingest::sample_values;
use roster_model::{ColumnMapping, SourceTable, TargetField};

use crate::catalog::{CATALOG_VERSION, FieldCatalog};
use crate::score::{ColumnScore, HeaderProfile, score_column};
use crate::types::{
    FieldAssignment, MapperOptions, MappingAmbiguityWarning, MappingProposal, WarningKind,
};

/// Score gap under which two candidates count as competing.
const CONTESTED_MARGIN: f32 = 0.10;
/// Scores below this are not worth mentioning in warnings.
const WARNING_FLOOR: f32 = 0.30;

/// Confidence level categories for mapping quality assessment.
///
/// - `High`: near-certain, can be accepted without review
/// - `Medium`: good match, worth a glance
/// - `Low`: above the threshold but should be confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }
}

/// Boundaries between confidence levels.
///
/// - below `low`: not assigned
/// - `low` to `medium`: [`ConfidenceLevel::Low`]
/// - `medium` to `high`: [`ConfidenceLevel::Medium`]
/// - at or above `high`: [`ConfidenceLevel::High`]
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceThresholds {
    pub high: f32,
    pub medium: f32,
    pub low: f32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.90,
            medium: 0.70,
            low: 0.50,
        }
    }
}

impl ConfidenceThresholds {
    /// Default upper boundaries with a custom acceptance threshold.
    #[must_use]
    pub fn with_min(low: f32) -> Self {
        Self {
            low,
            ..Self::default()
        }
    }

    /// Categorizes a confidence; `None` below the low threshold.
    #[must_use]
    pub fn categorize(&self, confidence: f32) -> Option<ConfidenceLevel> {
        if confidence >= self.high {
            Some(ConfidenceLevel::High)
        } else if confidence >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if confidence >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}

/// Proposes column mappings for roster tables.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    catalog: FieldCatalog,
    options: MapperOptions,
    thresholds: ConfidenceThresholds,
}

struct Candidate {
    header: usize,
    field: TargetField,
    score: ColumnScore,
}

impl MappingEngine {
    /// Engine over the catalog subset named by `options.profile`.
    pub fn new(options: MapperOptions) -> Self {
        Self::with_catalog(FieldCatalog::for_profile(options.profile), options)
    }

    /// Engine over an arbitrary catalog subset.
    pub fn with_catalog(catalog: FieldCatalog, options: MapperOptions) -> Self {
        Self {
            catalog,
            thresholds: ConfidenceThresholds::with_min(options.min_confidence),
            options,
        }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn thresholds(&self) -> &ConfidenceThresholds {
        &self.thresholds
    }

    /// Proposes a mapping for `table`.
    ///
    /// Every header is scored against every catalog field. Pairs at or above
    /// the threshold are assigned greedily in descending score order, so each
    /// header and each field is used at most once. Ties resolve by catalog
    /// order, then header order.
    pub fn propose(&self, table: &SourceTable) -> MappingProposal {
        let headers: Vec<HeaderProfile> = table
            .headers()
            .iter()
            .map(|h| HeaderProfile::new(h))
            .collect();
        let samples: Vec<Vec<&str>> = table
            .headers()
            .iter()
            .map(|h| {
                table
                    .non_empty_values(h)
                    .take(self.options.sample_limit)
                    .collect()
            })
            .collect();

        let mut scored = Vec::with_capacity(headers.len() * self.catalog.len());
        for spec in self.catalog.specs() {
            for (idx, header) in headers.iter().enumerate() {
                scored.push(Candidate {
                    header: idx,
                    field: spec.field(),
                    score: score_column(header, spec, &samples[idx]),
                });
            }
        }

        let mut ranked: Vec<&Candidate> = scored
            .iter()
            .filter(|c| c.score.confidence >= self.thresholds.low)
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .confidence
                .partial_cmp(&a.score.confidence)
                .unwrap_or(Ordering::Equal)
                .then(a.field.cmp(&b.field))
                .then(a.header.cmp(&b.header))
        });

        let mut mapping = ColumnMapping::new();
        let mut chosen: BTreeMap<TargetField, &Candidate> = BTreeMap::new();
        let mut used_headers: BTreeSet<usize> = BTreeSet::new();
        for candidate in ranked {
            if chosen.contains_key(&candidate.field) || used_headers.contains(&candidate.header) {
                continue;
            }
            let header = &headers[candidate.header].raw;
            if let Err(error) = mapping.assign(candidate.field, header.clone()) {
                debug!(%error, "skipping conflicting assignment");
                continue;
            }
            debug!(
                field = %candidate.field,
                header = %header,
                confidence = candidate.score.confidence,
                "assigned column"
            );
            used_headers.insert(candidate.header);
            chosen.insert(candidate.field, candidate);
        }

        let warnings = self.collect_warnings(&headers, &scored, &chosen);

        let assignments: Vec<FieldAssignment> = chosen
            .values()
            .map(|c| FieldAssignment {
                field: c.field,
                header: headers[c.header].raw.clone(),
                score: c.score.clone(),
            })
            .collect();

        let samples = assignments
            .iter()
            .map(|a| {
                (
                    a.field,
                    sample_values(table, &a.header, self.options.preview_samples),
                )
            })
            .collect();

        let unmapped_headers: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| !used_headers.contains(idx))
            .map(|(_, h)| h.raw.clone())
            .collect();

        info!(
            mapped = assignments.len(),
            unmapped = unmapped_headers.len(),
            warnings = warnings.len(),
            "proposed column mapping"
        );

        MappingProposal {
            mapping,
            assignments,
            samples,
            warnings,
            unmapped_headers,
            catalog_version: CATALOG_VERSION,
        }
    }

    fn collect_warnings(
        &self,
        headers: &[HeaderProfile],
        scored: &[Candidate],
        chosen: &BTreeMap<TargetField, &Candidate>,
    ) -> Vec<MappingAmbiguityWarning> {
        let owner_of = |header: usize| chosen.values().find(|c| c.header == header);
        let mut warnings = Vec::new();

        for field in self.catalog.fields() {
            let mut options: Vec<&Candidate> = scored.iter().filter(|c| c.field == field).collect();
            options.sort_by(|a, b| {
                b.score
                    .confidence
                    .partial_cmp(&a.score.confidence)
                    .unwrap_or(Ordering::Equal)
                    .then(a.header.cmp(&b.header))
            });

            if let Some(winner) = chosen.get(&field) {
                let rival = options.iter().find(|c| {
                    c.header != winner.header
                        && owner_of(c.header).is_none()
                        && c.score.confidence >= self.thresholds.low
                        && winner.score.confidence - c.score.confidence < CONTESTED_MARGIN
                });
                if let Some(rival) = rival {
                    let chosen_header = &headers[winner.header].raw;
                    let rival_header = &headers[rival.header].raw;
                    warnings.push(MappingAmbiguityWarning {
                        field,
                        kind: WarningKind::Contested,
                        headers: vec![chosen_header.clone(), rival_header.clone()],
                        message: format!(
                            "'{chosen_header}' and '{rival_header}' both look like {}",
                            field.label()
                        ),
                    });
                }
                continue;
            }

            let best = options
                .first()
                .filter(|c| c.score.confidence >= WARNING_FLOOR);

            if field.is_required() {
                let (headers_involved, message) = match best {
                    Some(c) => (
                        vec![headers[c.header].raw.clone()],
                        format!(
                            "required field {} is unmapped; best candidate '{}' scored {:.0}%",
                            field.label(),
                            headers[c.header].raw,
                            c.score.confidence * 100.0
                        ),
                    ),
                    None => (
                        Vec::new(),
                        format!("required field {} is unmapped", field.label()),
                    ),
                };
                warnings.push(MappingAmbiguityWarning {
                    field,
                    kind: WarningKind::MissingRequired,
                    headers: headers_involved,
                    message,
                });
                continue;
            }

            let Some(best) = best else { continue };
            let header = &headers[best.header].raw;
            if best.score.confidence < self.thresholds.low {
                warnings.push(MappingAmbiguityWarning {
                    field,
                    kind: WarningKind::BelowThreshold,
                    headers: vec![header.clone()],
                    message: format!(
                        "'{header}' may be {} ({:.0}%, below threshold)",
                        field.label(),
                        best.score.confidence * 100.0
                    ),
                });
            } else if let Some(owner) = owner_of(best.header)
                && owner.score.confidence - best.score.confidence < CONTESTED_MARGIN
            {
                warnings.push(MappingAmbiguityWarning {
                    field,
                    kind: WarningKind::Displaced,
                    headers: vec![header.clone()],
                    message: format!(
                        "'{header}' was assigned to {} but also fits {}",
                        owner.field.label(),
                        field.label()
                    ),
                });
            }
        }

        warnings
    }
}

impl Default for MappingEngine {
    fn default() -> Self {
        Self::new(MapperOptions::default())
    }
}
