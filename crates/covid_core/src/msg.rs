use std::path::PathBuf;

use crate::{ExportStatus, PageSize, Record, SortKey, Totals};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The dashboard is shown for the first time (or re-rendered).
    Mounted,
    /// The data source returned a snapshot.
    StatsLoaded { records: Vec<Record>, totals: Totals },
    /// The data source failed; the reason is only for display and logs.
    LoadFailed(String),
    /// User clicked a column header.
    SortRequested(SortKey),
    /// User edited the search box.
    SearchChanged(String),
    /// User jumped to a zero-based page.
    PageChanged(usize),
    NextPage,
    PreviousPage,
    /// User picked a different rows-per-page option.
    PageSizeChanged(PageSize),
    /// User asked for a CSV of the current view.
    ExportRequested { destination: Option<PathBuf> },
    /// Engine finished (or failed) an export.
    ExportFinished(ExportStatus),
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
