use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use roster_commit::{FailureKind, ImportReport};
use roster_map::{
    ConfidenceLevel, ConfidenceThresholds, FieldCatalog, MappingProposal, WarningKind,
};
use roster_model::SourceTable;

pub fn print_fields(catalog: &FieldCatalog) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Kind"),
        header_cell("Required"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Center);
    for field in catalog.fields() {
        table.add_row(vec![
            Cell::new(field.as_str()).fg(Color::Blue),
            Cell::new(field.label()),
            Cell::new(format!("{:?}", field.kind()).to_lowercase()),
            if field.is_required() {
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                dim_cell("-")
            },
        ]);
    }
    println!("Field catalog v{} ({} fields)", catalog.version(), catalog.len());
    println!("{table}");
}

pub fn print_preview(table: &SourceTable, rows: usize) {
    println!("{} columns, {} data rows", table.headers().len(), table.len());
    let mut preview = Table::new();
    preview.set_header(table.headers().iter().map(|h| header_cell(h)));
    apply_table_style(&mut preview);
    for row in table.rows().iter().take(rows) {
        preview.add_row(
            table
                .headers()
                .iter()
                .map(|header| Cell::new(row.value(header))),
        );
    }
    println!("{preview}");
}

pub fn print_proposal(proposal: &MappingProposal, thresholds: &ConfidenceThresholds) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Column"),
        header_cell("Confidence"),
        header_cell("Samples"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for assignment in &proposal.assignments {
        let samples = proposal
            .samples
            .get(&assignment.field)
            .map(|values| values.join(", "))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(assignment.field.as_str()).fg(Color::Blue),
            Cell::new(&assignment.header),
            confidence_cell(
                assignment.score.confidence,
                thresholds.categorize(assignment.score.confidence),
            ),
            if samples.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(samples)
            },
        ]);
    }
    println!("{table}");

    if !proposal.unmapped_headers.is_empty() {
        println!("Unmapped columns: {}", proposal.unmapped_headers.join(", "));
    }
    if !proposal.warnings.is_empty() {
        let mut warnings = Table::new();
        warnings.set_header(vec![
            header_cell("Field"),
            header_cell("Issue"),
            header_cell("Message"),
        ]);
        apply_table_style(&mut warnings);
        for warning in &proposal.warnings {
            warnings.add_row(vec![
                Cell::new(warning.field.as_str()),
                warning_cell(warning.kind),
                Cell::new(&warning.message),
            ]);
        }
        println!();
        println!("Needs review:");
        println!("{warnings}");
    }
}

pub fn print_report(report: &ImportReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Created"),
        header_cell("Updated"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let rows = [
        ("Students", report.created_students, Some(report.updated_students)),
        ("Guardians", report.created_guardians, Some(report.updated_guardians)),
        ("Guardian links", report.created_links, None),
        ("Schools", report.created_schools, None),
        ("Classes", report.created_classes, None),
        ("Enrollments", report.created_enrollments, None),
    ];
    for (entity, created, updated) in rows {
        table.add_row(vec![
            Cell::new(entity),
            count_cell(Some(created), Color::Green),
            count_cell(updated, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("Rows committed")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{}/{}", report.rows_committed, report.rows_total))
            .add_attribute(Attribute::Bold),
        count_cell(Some(report.rows_failed()), Color::Red),
    ]);
    println!("{table}");

    if report.cancelled {
        eprintln!("Import cancelled before all rows were processed.");
    }
    if report.has_failures() {
        let mut failures = Table::new();
        failures.set_header(vec![header_cell("Row"), header_cell("Stage"), header_cell("Reason")]);
        apply_table_style(&mut failures);
        align_column(&mut failures, 0, CellAlignment::Right);
        for failure in &report.failures {
            let stage = match failure.kind {
                FailureKind::Validation => Cell::new("skipped").fg(Color::Yellow),
                FailureKind::Commit => Cell::new("rolled back").fg(Color::Red),
            };
            failures.add_row(vec![
                Cell::new(failure.row_index + 1),
                stage,
                Cell::new(&failure.message),
            ]);
        }
        eprintln!("Failed rows:");
        eprintln!("{failures}");
    }
}

fn confidence_cell(confidence: f32, level: Option<ConfidenceLevel>) -> Cell {
    let text = format!("{confidence:.2}");
    match level {
        Some(ConfidenceLevel::High) => Cell::new(text).fg(Color::Green),
        Some(ConfidenceLevel::Medium) => Cell::new(text),
        Some(ConfidenceLevel::Low) => Cell::new(text).fg(Color::Yellow),
        None => Cell::new(text).fg(Color::Red),
    }
}

fn warning_cell(kind: WarningKind) -> Cell {
    match kind {
        WarningKind::MissingRequired => Cell::new("missing")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        WarningKind::BelowThreshold => Cell::new("low score").fg(Color::Yellow),
        WarningKind::Contested => Cell::new("contested").fg(Color::Yellow),
        WarningKind::Displaced => Cell::new("displaced").fg(Color::Yellow),
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
