use crate::{ExportStatus, LoadState, PageSize, Record, SortDirection, SortKey, Totals};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeaderView {
    pub key: SortKey,
    pub label: &'static str,
    /// Direction when this is the active sort column.
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardViewModel {
    pub load: LoadState,
    pub totals: Option<Totals>,
    pub columns: Vec<ColumnHeaderView>,
    /// Rows of the current page only.
    pub rows: Vec<Record>,
    pub empty_row_count: usize,
    /// 1-based inclusive range of `rows` within the filtered set.
    pub display_range: Option<(usize, usize)>,
    pub filter_text: String,
    pub filtered_count: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: PageSize,
    pub last_export: Option<ExportStatus>,
}
