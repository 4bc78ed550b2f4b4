use std::path::PathBuf;

use crate::Record;

/// I/O requested by [`crate::update`]; executed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the statewise snapshot. Emitted at most once per session.
    FetchStatewise,
    /// Write `records` (filtered and sorted, not paginated) as CSV.
    ExportCsv {
        records: Vec<Record>,
        destination: Option<PathBuf>,
    },
}
