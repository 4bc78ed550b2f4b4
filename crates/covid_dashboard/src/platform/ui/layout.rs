use covid_core::{ColumnHeaderView, DashboardViewModel, SortKey};

use super::constants::{ASCENDING_MARK, DESCENDING_MARK};
use super::render::cell_text;

/// Width of each column: the widest of its header (with room for the sort
/// mark) and the cells on the current page.
pub fn column_widths(view: &DashboardViewModel) -> Vec<usize> {
    view.columns
        .iter()
        .map(|column| {
            let header = header_width(column);
            view.rows
                .iter()
                .map(|row| cell_text(row, column.key).chars().count())
                .fold(header, usize::max)
        })
        .collect()
}

fn header_width(column: &ColumnHeaderView) -> usize {
    let mark = ASCENDING_MARK.len().max(DESCENDING_MARK.len());
    column.label.chars().count() + mark
}

/// Text columns are left-aligned, counts right-aligned.
pub fn is_numeric(key: SortKey) -> bool {
    key != SortKey::State
}
