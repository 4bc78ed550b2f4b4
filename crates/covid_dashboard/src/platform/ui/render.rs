use std::fmt::Write as _;

use covid_core::{
    DashboardViewModel, ExportStatus, LoadState, Record, SortDirection, SortKey, Totals,
};

use super::constants::*;
use super::layout::{column_widths, is_numeric};

/// Renders the whole dashboard as plain text.
pub fn render(view: &DashboardViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{}", totals_line(view.totals.as_ref()));

    match &view.load {
        LoadState::Idle | LoadState::Loading => {
            let _ = writeln!(out, "Loading statewise data...");
        }
        LoadState::Failed { .. } => {
            let _ = writeln!(out, "Statewise data unavailable.");
        }
        LoadState::Loaded => {}
    }
    if !view.filter_text.is_empty() {
        let _ = writeln!(out, "Search: {:?}", view.filter_text);
    }

    let widths = column_widths(view);
    let separator = separator_line(&widths);
    out.push_str(&separator);

    let headers: Vec<(String, bool)> = view
        .columns
        .iter()
        .map(|column| (header_text(column.label, column.sort), false))
        .collect();
    out.push_str(&table_line(&headers, &widths));
    out.push_str(&separator);

    for row in &view.rows {
        let cells: Vec<(String, bool)> = view
            .columns
            .iter()
            .map(|column| (cell_text(row, column.key), is_numeric(column.key)))
            .collect();
        out.push_str(&table_line(&cells, &widths));
    }
    let blank: Vec<(String, bool)> = widths.iter().map(|_| (String::new(), false)).collect();
    for _ in 0..view.empty_row_count {
        out.push_str(&table_line(&blank, &widths));
    }
    out.push_str(&separator);

    let _ = writeln!(out, "{}", footer_line(view));
    if let Some(status) = &view.last_export {
        let _ = writeln!(out, "{}", export_line(status));
    }
    out
}

pub fn header_text(label: &str, sort: Option<SortDirection>) -> String {
    match sort {
        Some(SortDirection::Ascending) => format!("{label}{ASCENDING_MARK}"),
        Some(SortDirection::Descending) => format!("{label}{DESCENDING_MARK}"),
        None => label.to_string(),
    }
}

pub fn cell_text(row: &Record, key: SortKey) -> String {
    match key {
        SortKey::State => row.state.clone(),
        SortKey::Confirmed => format_with_commas(row.confirmed),
        SortKey::Recovered => format_with_commas(row.recovered),
        SortKey::Deaths => format_with_commas(row.deaths),
        SortKey::Active => format_with_commas(row.active),
    }
}

fn totals_line(totals: Option<&Totals>) -> String {
    let show = |value: Option<u64>| value.map(format_with_commas).unwrap_or_else(|| "-".into());
    format!(
        "Total Cases: {} | Total Recovered: {} | Total Active: {} | Total Deaths: {}",
        show(totals.map(|t| t.confirmed)),
        show(totals.map(|t| t.recovered)),
        show(totals.map(|t| t.active)),
        show(totals.map(|t| t.deaths)),
    )
}

fn separator_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn table_line(cells: &[(String, bool)], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for ((text, right_align), width) in cells.iter().zip(widths) {
        let padding = width.saturating_sub(text.chars().count());
        line.push(' ');
        if *right_align {
            line.push_str(&" ".repeat(padding));
            line.push_str(text);
        } else {
            line.push_str(text);
            line.push_str(&" ".repeat(padding));
        }
        line.push_str(" |");
    }
    line.push('\n');
    line
}

fn footer_line(view: &DashboardViewModel) -> String {
    let (from, to) = view.display_range.unwrap_or((0, 0));
    format!(
        "Rows per page: {}   {}-{} of {}   Page {} of {}",
        view.page_size,
        from,
        to,
        view.filtered_count,
        view.page_index + 1,
        view.page_count.max(1)
    )
}

fn export_line(status: &ExportStatus) -> String {
    match status {
        ExportStatus::Pending => "Export: writing...".to_string(),
        ExportStatus::Written { path, rows } => format!("Export: wrote {rows} rows to {path}"),
        ExportStatus::Failed { reason } => format!("Export failed: {reason}"),
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
