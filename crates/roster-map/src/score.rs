//! Column-to-field scoring.
//!
//! A score is the sum of a header signal (alias match plus a small fuzzy
//! bonus against the field label) and a value signal (fraction of sampled
//! cells with the field's value shape), followed by context adjustments:
//! guardian slot bias, and penalties for student fields in guardian or
//! school/class context.

use std::sync::LazyLock;

use rapidfuzz::distance::jaro_winkler;
use regex::Regex;
use serde::Serialize;

use roster_model::GuardianSlot;

use crate::catalog::{FieldSpec, HeaderMatch};
use crate::patterns::{ENTITY_CONTEXT, FIRST_SLOT, GUARDIAN_CONTEXT, SECOND_SLOT};
use crate::utils::normalize_header;

const STRONG_ALIAS: f32 = 0.70;
const WEAK_ALIAS: f32 = 0.40;
const LABEL_SIMILARITY_MIN: f64 = 0.88;
const LABEL_BONUS: f32 = 0.05;
const VALUE_FULL: f32 = 0.30;
/// Match ratio at which the value signal earns full credit.
const VALUE_FULL_RATIO: f32 = 0.60;
const VALUE_MISFIT_RATIO: f32 = 0.20;
const VALUE_MISFIT_PENALTY: f32 = -0.10;
const SLOT_MATCH_BOOST: f32 = 0.10;
const SLOT_MISMATCH_PENALTY: f32 = -0.25;
const DEFAULT_SLOT_BOOST: f32 = 0.05;
const DEFAULT_SLOT_PENALTY: f32 = -0.20;
const GUARDIAN_CONTEXT_FACTOR: f32 = 0.3;
const ENTITY_CONTEXT_FACTOR: f32 = 0.5;

static GUARDIAN_CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GUARDIAN_CONTEXT).expect("guardian context pattern is valid"));
static ENTITY_CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ENTITY_CONTEXT).expect("entity context pattern is valid"));
static SECOND_SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SECOND_SLOT).expect("slot pattern is valid"));
static FIRST_SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FIRST_SLOT).expect("slot pattern is valid"));

/// Score for a single header-field pair.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnScore {
    /// Final confidence, clamped to 0.0..=1.0.
    pub confidence: f32,
    /// Breakdown of score components for explainability.
    pub explanation: Vec<ScoreComponent>,
}

impl ColumnScore {
    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        self.explanation
            .iter()
            .map(|c| format!("{}: {:+.0}%", c.name, c.value * 100.0))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A component contributing to the final score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponent {
    /// Component name (e.g., "Header alias").
    pub name: &'static str,
    /// Additive contribution; multiplicative penalties record the amount removed.
    pub value: f32,
    pub description: String,
}

/// Precomputed facts about one source header.
#[derive(Debug, Clone)]
pub struct HeaderProfile {
    pub raw: String,
    pub normalized: String,
    guardian_context: bool,
    entity_context: bool,
    slot: Option<GuardianSlot>,
}

impl HeaderProfile {
    pub fn new(raw: &str) -> Self {
        let normalized = normalize_header(raw);
        let slot = if SECOND_SLOT_RE.is_match(&normalized) {
            Some(GuardianSlot::Second)
        } else if FIRST_SLOT_RE.is_match(&normalized) {
            Some(GuardianSlot::First)
        } else {
            None
        };
        Self {
            raw: raw.to_string(),
            guardian_context: GUARDIAN_CONTEXT_RE.is_match(&normalized),
            entity_context: ENTITY_CONTEXT_RE.is_match(&normalized),
            normalized,
            slot,
        }
    }

    /// Guardian slot the header names explicitly, if any.
    pub fn slot(&self) -> Option<GuardianSlot> {
        self.slot
    }

    pub fn has_guardian_context(&self) -> bool {
        self.guardian_context
    }
}

/// Scores one header against one field.
///
/// `samples` are trimmed, non-empty cells from the column.
pub fn score_column(header: &HeaderProfile, spec: &FieldSpec, samples: &[&str]) -> ColumnScore {
    let field = spec.field();
    let mut components = Vec::new();
    let mut score = 0.0_f32;

    let alias = spec.header_match(&header.normalized);
    match alias {
        HeaderMatch::Strong => {
            score += STRONG_ALIAS;
            components.push(ScoreComponent {
                name: "Header alias",
                value: STRONG_ALIAS,
                description: format!("'{}' is an alias of {}", header.raw, field),
            });
        }
        HeaderMatch::Weak => {
            score += WEAK_ALIAS;
            components.push(ScoreComponent {
                name: "Header keyword",
                value: WEAK_ALIAS,
                description: format!("'{}' mentions {}", header.raw, field.label()),
            });
        }
        HeaderMatch::None => {}
    }

    let label = normalize_header(field.label());
    let similarity = jaro_winkler::similarity(header.normalized.chars(), label.chars());
    if similarity >= LABEL_SIMILARITY_MIN {
        score += LABEL_BONUS;
        components.push(ScoreComponent {
            name: "Label similarity",
            value: LABEL_BONUS,
            description: format!("{:.0}% similar to '{}'", similarity * 100.0, field.label()),
        });
    }

    if let Some(detector) = spec.detector()
        && let Some(ratio) = detector.match_ratio(samples.iter().copied())
    {
        let value = if ratio >= VALUE_FULL_RATIO {
            VALUE_FULL
        } else if ratio < VALUE_MISFIT_RATIO && alias != HeaderMatch::None {
            VALUE_MISFIT_PENALTY
        } else {
            VALUE_FULL * 0.5 * (ratio / VALUE_FULL_RATIO)
        };
        if value != 0.0 {
            score += value;
            components.push(ScoreComponent {
                name: if value > 0.0 { "Value shape" } else { "Value misfit" },
                value,
                description: format!(
                    "{:.0}% of {} samples are {}",
                    ratio * 100.0,
                    samples.len(),
                    detector.label()
                ),
            });
        }
    }

    if let Some(slot) = field.guardian_slot() {
        let (value, description) = match (header.slot, slot) {
            (Some(named), wanted) if named == wanted => {
                (SLOT_MATCH_BOOST, format!("header names guardian {}", wanted.number()))
            }
            (Some(named), _) => (
                SLOT_MISMATCH_PENALTY,
                format!("header names guardian {}", named.number()),
            ),
            (None, GuardianSlot::First) => (
                DEFAULT_SLOT_BOOST,
                "unnumbered guardian header defaults to guardian 1".to_string(),
            ),
            (None, GuardianSlot::Second) => (
                DEFAULT_SLOT_PENALTY,
                "unnumbered guardian header defaults to guardian 1".to_string(),
            ),
        };
        score += value;
        components.push(ScoreComponent {
            name: "Guardian slot",
            value,
            description,
        });
    }

    if field.is_student_field() && header.guardian_context {
        let removed = score * (1.0 - GUARDIAN_CONTEXT_FACTOR);
        score *= GUARDIAN_CONTEXT_FACTOR;
        components.push(ScoreComponent {
            name: "Guardian context",
            value: -removed,
            description: "header describes a guardian, not the student".into(),
        });
    } else if field.is_student_field() && header.entity_context && alias != HeaderMatch::Strong {
        let removed = score * (1.0 - ENTITY_CONTEXT_FACTOR);
        score *= ENTITY_CONTEXT_FACTOR;
        components.push(ScoreComponent {
            name: "School/class context",
            value: -removed,
            description: "header describes a school or class".into(),
        });
    }

    ColumnScore {
        confidence: score.clamp(0.0, 1.0),
        explanation: components,
    }
}
