//! Table rendering for command output.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use agtrial_core::ReviewPayload;
use agtrial_map::all_configs;
use agtrial_model::{BatchResult, Binding, FileResult, FileStatus, PivotMode};
use agtrial_store::CoverageEntry;

/// One row per file, followed by a totals row.
pub fn batch_table(result: &BatchResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Type"),
        header_cell("Status"),
        header_cell("Records"),
        header_cell("Upload"),
        header_cell("Detail"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for file in &result.files {
        table.add_row(file_row(file));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(format!(
            "{} ok / {} review / {} error / {} skipped",
            result.count(FileStatus::Success),
            result.count(FileStatus::NeedsReview),
            result.count(FileStatus::Error),
            result.count(FileStatus::Skipped)
        ))
        .add_attribute(Attribute::Bold),
        Cell::new(result.total_records()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    table
}

pub fn print_batch_summary(result: &BatchResult) {
    match &result.trial_id {
        Some(trial_id) => println!("Trial: {trial_id}"),
        None => println!("Trial: (none established)"),
    }
    println!("{}", batch_table(result));
    let review: Vec<&FileResult> = result
        .files
        .iter()
        .filter(|f| f.status == FileStatus::NeedsReview)
        .collect();
    if !review.is_empty() {
        println!();
        println!("Files waiting for column review:");
        for file in review {
            if let Some(id) = file.raw_upload_id {
                println!("- {} (run `review show {id}`)", file.filename);
            }
        }
    }
}

/// Single-file result of a review submission.
pub fn file_result_table(result: &FileResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Type"),
        header_cell("Status"),
        header_cell("Records"),
        header_cell("Upload"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    table.add_row(file_row(result));
    table
}

/// Header-by-header view of a staged upload.
pub fn review_table(payload: &ReviewPayload) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Header"),
        header_cell("Mapping"),
        header_cell("Samples"),
        header_cell("Suggestions"),
    ]);
    apply_table_style(&mut table);
    for header in &payload.headers {
        let mapping = if payload.unmapped_columns.contains(header) {
            Cell::new("unmapped")
                .fg(Color::Yellow)
                .add_attribute(Attribute::Bold)
        } else {
            match payload.column_map.get(header) {
                Some(Binding::Field(field)) => Cell::new(field).fg(Color::Green),
                Some(binding) => dim_cell(binding.as_str()),
                None => dim_cell("-"),
            }
        };
        let samples = payload
            .sample_values
            .get(header)
            .map(|values| values.join(", "))
            .unwrap_or_default();
        let suggestions = payload
            .suggestions
            .get(header)
            .map(|list| {
                list.iter()
                    .map(|s| format!("{} ({:.2})", s.field, s.score))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(header),
            mapping,
            Cell::new(samples),
            if suggestions.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(suggestions)
            },
        ]);
    }
    table
}

pub fn print_review(payload: &ReviewPayload) {
    println!(
        "Upload {}: {} ({}, {})",
        payload.upload_id,
        payload.filename,
        payload.data_type.label(),
        payload.status
    );
    if let Some(detail) = &payload.error_detail {
        println!("Last error: {detail}");
    }
    println!("{}", review_table(payload));
    let unbound: Vec<&str> = payload
        .fields
        .iter()
        .filter(|f| f.header.is_none())
        .map(|f| f.field)
        .collect();
    if !unbound.is_empty() {
        println!("Fields with no column: {}", unbound.join(", "));
    }
}

/// Registered data types and their canonical fields.
pub fn types_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Type"),
        header_cell("Table"),
        header_cell("Mode"),
        header_cell("Identity"),
        header_cell("Values"),
        header_cell("Natural key"),
    ]);
    apply_table_style(&mut table);
    for config in all_configs() {
        let mode = match config.pivot_mode {
            PivotMode::Direct => "direct",
            PivotMode::WideToLong => "wide-to-long",
        };
        let identity: Vec<&str> = config.identity_columns.iter().map(|s| s.field).collect();
        let values: Vec<&str> = if config.is_pivot() {
            vec!["metric", "value", "unit"]
        } else {
            config.value_columns.iter().map(|s| s.field).collect()
        };
        table.add_row(vec![
            Cell::new(config.data_type.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(config.target_table),
            Cell::new(mode),
            Cell::new(identity.join(", ")),
            Cell::new(values.join(", ")),
            Cell::new(config.natural_key_fields.join(", ")),
        ]);
    }
    table
}

/// Coverage flags with the current record count of each destination table.
pub fn coverage_table(entries: &[CoverageEntry], counts: &[(String, usize)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File type"),
        header_cell("Has data"),
        header_cell("Records"),
        header_cell("Updated"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for (file_type, records) in counts {
        let entry = entries.iter().find(|e| &e.file_type == file_type);
        let has_data = match entry {
            Some(e) if e.has_data => Cell::new("✓")
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
            _ => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(file_type),
            has_data,
            count_cell(*records),
            entry.map_or_else(|| dim_cell("-"), |e| Cell::new(&e.updated_at)),
        ]);
    }
    table
}

fn file_row(file: &FileResult) -> Vec<Cell> {
    vec![
        Cell::new(&file.filename),
        file.file_type
            .map_or_else(|| dim_cell("-"), |t| Cell::new(t.as_str())),
        status_cell(file.status),
        file.record_count
            .map_or_else(|| dim_cell("-"), count_cell),
        file.raw_upload_id
            .map_or_else(|| dim_cell("-"), Cell::new),
        file.detail
            .as_deref()
            .map_or_else(|| dim_cell("-"), Cell::new),
    ]
}

fn status_cell(status: FileStatus) -> Cell {
    match status {
        FileStatus::Success => Cell::new(status.as_str()).fg(Color::Green),
        FileStatus::NeedsReview => Cell::new(status.as_str())
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold),
        FileStatus::Error => Cell::new(status.as_str())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        FileStatus::Skipped => dim_cell(status.as_str()),
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
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
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(12)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ]);
    }
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
