#![deny(unsafe_code)]

//! Column mapping for roster import.
//!
//! Given a [`SourceTable`](roster_model::SourceTable), the engine proposes
//! which header feeds which [`TargetField`](roster_model::TargetField). Every
//! assignment carries a confidence and an explanation so a reviewer can
//! accept or correct it before anything is committed.
//!
//! # Example
//!
//! ```ignore
//! use roster_map::{MapperOptions, MappingEngine};
//!
//! let engine = MappingEngine::new(MapperOptions::default());
//! let proposal = engine.propose(&table);
//! for assignment in &proposal.assignments {
//!     println!("{} <- {} ({:.0}%)", assignment.field, assignment.header,
//!         assignment.score.confidence * 100.0);
//! }
//! ```

mod catalog;
mod detect;
mod engine;
mod patterns;
mod score;
mod types;
mod utils;

pub use catalog::{CATALOG_VERSION, CatalogProfile, FieldCatalog, FieldSpec, HeaderMatch};
pub use detect::ValueDetector;
pub use engine::{ConfidenceLevel, ConfidenceThresholds, MappingEngine};
pub use score::{ColumnScore, HeaderProfile, ScoreComponent, score_column};
pub use types::{
    FieldAssignment, MapperOptions, MappingAmbiguityWarning, MappingProposal, WarningKind,
};
pub use utils::normalize_header;
