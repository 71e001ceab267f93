use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tabnorm_cli::batch::{BatchResult, FileOutcome};

pub fn print_summary(result: &BatchResult) {
    println!("Input: {}", result.input_dir.display());
    if result.dry_run {
        println!("Output: (dry run, nothing written)");
    } else {
        println!("Output: {}", result.output_dir.display());
    }
    println!("Reference queries: {}", result.reference_queries);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Derived"),
        header_cell("Reverted"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);

    let mut total_rows = 0usize;
    let mut total_failed = 0usize;
    for file in &result.files {
        match &file.result {
            Ok(summary) => {
                total_rows += summary.rows;
                let derived: Vec<&str> = summary.report.derived_columns().collect();
                let reverted: Vec<&str> = summary.report.reverted_columns().collect();
                table.add_row(vec![
                    Cell::new(file.file_name()),
                    Cell::new(summary.rows),
                    Cell::new(summary.columns),
                    list_cell(&derived, Color::Green),
                    list_cell(&reverted, Color::Yellow),
                    Cell::new("✓")
                        .fg(Color::Green)
                        .add_attribute(Attribute::Bold),
                ]);
            }
            Err(_) => {
                total_failed += 1;
                table.add_row(vec![
                    Cell::new(file.file_name()),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new("FAILED")
                        .fg(Color::Red)
                        .add_attribute(Attribute::Bold),
                ]);
            }
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        failed_cell(total_failed),
    ]);
    println!("{table}");

    let failed: Vec<&FileOutcome> = result.failed().collect();
    if !failed.is_empty() {
        eprintln!();
        eprintln!("Failures:");
        for file in failed {
            if let Err(message) = &file.result {
                eprintln!("  {}: {message}", file.file_name());
            }
        }
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn list_cell(names: &[&str], color: Color) -> Cell {
    if names.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(names.join(", ")).fg(color)
    }
}

fn failed_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(format!("{count} failed"))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("ok")
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
