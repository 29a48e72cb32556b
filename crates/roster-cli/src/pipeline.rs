//! Import stages shared by the commands: read, map, commit.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span, trace, warn};

use roster_commit::{CancelFlag, ImportReport, commit_with_cancel};
use roster_ingest::read_table_from_path;
use roster_map::{MappingEngine, MappingProposal};
use roster_model::{ColumnMapping, SourceTable, TargetField, TenantId};
use roster_store::RosterStore;

use crate::config::ImportSettings;
use crate::logging::redact_value;

/// Reads an upload into a table. Any failure here aborts the import.
pub fn load_table(path: &Path, settings: &ImportSettings) -> Result<SourceTable> {
    let span = info_span!("ingest", file = %path.display());
    let _guard = span.enter();
    let start = Instant::now();
    let table = read_table_from_path(path, &settings.ingest)
        .with_context(|| format!("read {}", path.display()))?;
    info!(
        columns = table.headers().len(),
        rows = table.len(),
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(table)
}

/// Runs the mapping engine with the configured options.
pub fn propose(table: &SourceTable, settings: &ImportSettings) -> MappingProposal {
    let span = info_span!("map", columns = table.headers().len());
    let _guard = span.enter();
    let proposal = MappingEngine::new(settings.mapping).propose(table);
    for warning in &proposal.warnings {
        warn!(field = %warning.field, kind = ?warning.kind, "{}", warning.message);
    }
    proposal
}

/// Loads a reviewed mapping file (JSON object keyed by field id).
pub fn load_mapping(path: &Path) -> Result<ColumnMapping> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read mapping {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse mapping {}", path.display()))
}

/// Writes a mapping as pretty JSON for human review.
pub fn write_mapping(path: &Path, mapping: &ColumnMapping) -> Result<()> {
    let json = serde_json::to_string_pretty(mapping).context("serialize mapping")?;
    std::fs::write(path, json + "\n").with_context(|| format!("write mapping {}", path.display()))
}

/// The mapping to commit with: the reviewed file when given, otherwise a
/// fresh proposal. A file naming headers the table does not have is rejected.
pub fn resolve_mapping(
    table: &SourceTable,
    mapping_file: Option<&Path>,
    settings: &ImportSettings,
) -> Result<ColumnMapping> {
    let mapping = match mapping_file {
        Some(path) => load_mapping(path)?,
        None => propose(table, settings).mapping,
    };
    mapping
        .validate_against(table.headers())
        .context("mapping does not match the file's headers")?;
    for field in [TargetField::First, TargetField::Last] {
        if !mapping.is_mapped(field) {
            warn!(field = %field, "required field is not mapped; every row will be skipped");
        }
    }
    Ok(mapping)
}

/// Commits every row of `table` into the configured database.
pub fn import(
    table: &SourceTable,
    mapping: &ColumnMapping,
    tenant: &TenantId,
    settings: &ImportSettings,
    cancel: &CancelFlag,
) -> Result<ImportReport> {
    let database = &settings.commit.database;
    let mut store = RosterStore::open(database)
        .with_context(|| format!("open database {}", database.display()))?;
    let start = Instant::now();
    let report = commit_with_cancel(
        &mut store,
        tenant,
        mapping,
        table.rows(),
        settings.commit.options(),
        cancel,
    );
    debug!(duration_ms = start.elapsed().as_millis(), "commit complete");

    for failure in &report.failures {
        if let Some(row) = table.rows().get(failure.row_index) {
            let name = |field| mapping.raw(row, field).map(str::trim).unwrap_or("");
            trace!(
                row = failure.row_index + 1,
                first = redact_value(name(TargetField::First)),
                last = redact_value(name(TargetField::Last)),
                "rejected row"
            );
        }
    }
    Ok(report)
}
