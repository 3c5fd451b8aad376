//! CLI display utilities for formatting output

use crate::core::styles::StyleRole;
use crate::core::time::format_millis;
use crate::store::{AggregateStats, ScanRecord};
use prettytable::format::{self, TableFormat};
use prettytable::{Cell, Row, Table};

/// Longest payload shown in full in the list table
const PAYLOAD_COLUMN_WIDTH: usize = 48;

fn table_format() -> TableFormat {
    format::FormatBuilder::new()
        .column_separator(' ')
        .separator(
            format::LinePosition::Title,
            format::LineSeparator::new('-', ' ', ' ', ' '),
        )
        .padding(0, 2)
        .build()
}

fn styled_cell(text: &str, role: StyleRole, use_color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.to_prettytable_spec() {
        Some(spec) if use_color => cell.style_spec(&spec),
        _ => cell,
    }
}

fn title_row(titles: &[&str], use_color: bool) -> Row {
    Row::new(
        titles
            .iter()
            .map(|t| styled_cell(t, StyleRole::Header, use_color))
            .collect(),
    )
}

/// Shorten long payloads for table display
pub fn truncate_payload(payload: &str) -> String {
    if payload.chars().count() <= PAYLOAD_COLUMN_WIDTH {
        return payload.to_string();
    }
    let kept: String = payload.chars().take(PAYLOAD_COLUMN_WIDTH - 1).collect();
    format!("{}…", kept)
}

/// Table of records in the order given
pub fn records_table(records: &[ScanRecord], use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(table_format());
    table.set_titles(title_row(&["ID", "Type", "Scanned", "Data"], use_color));

    for record in records {
        table.add_row(Row::new(vec![
            styled_cell(&record.id.to_string(), StyleRole::Key, use_color),
            styled_cell(&record.type_tag, StyleRole::Literal, use_color),
            styled_cell(&format_millis(record.created_at), StyleRole::Dim, use_color),
            Cell::new(&truncate_payload(&record.data)),
        ]));
    }
    table
}

/// Per-type counts; with `include_empty` every known symbology is listed
pub fn stats_table(stats: &AggregateStats, include_empty: bool, use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(table_format());
    table.set_titles(title_row(&["Type", "Count"], use_color));

    let rows: Vec<(&str, usize)> = if include_empty {
        stats.by_type.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    } else {
        stats.non_empty_types()
    };

    for (tag, count) in rows {
        let role = if count == 0 {
            StyleRole::Dim
        } else {
            StyleRole::Literal
        };
        table.add_row(Row::new(vec![
            styled_cell(tag, role, use_color),
            styled_cell(&count.to_string(), StyleRole::Value, use_color),
        ]));
    }
    table
}

pub fn print_records(records: &[ScanRecord], use_color: bool) {
    if records.is_empty() {
        println!("{}", StyleRole::Dim.paint("No scans stored.", use_color));
        return;
    }
    records_table(records, use_color).printstd();
}

pub fn print_stats(stats: &AggregateStats, include_empty: bool, use_color: bool) {
    println!(
        "{} {}",
        StyleRole::Key.paint("Total scans:", use_color),
        stats.total
    );
    let last = stats
        .last_scan_at
        .map(format_millis)
        .unwrap_or_else(|| "never".to_string());
    println!("{} {}", StyleRole::Key.paint("Last scan:", use_color), last);

    if stats.total > 0 || include_empty {
        println!();
        stats_table(stats, include_empty, use_color).printstd();
    }
}
