/// One region's case-count snapshot.
///
/// `active` is usually `confirmed - recovered - deaths`, but the upstream
/// feed does not guarantee it and nothing here relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub state: String,
    pub confirmed: u64,
    pub recovered: u64,
    pub deaths: u64,
    pub active: u64,
}

impl Record {
    pub fn new(
        state: impl Into<String>,
        confirmed: u64,
        recovered: u64,
        deaths: u64,
        active: u64,
    ) -> Self {
        Self {
            state: state.into(),
            confirmed,
            recovered,
            deaths,
            active,
        }
    }
}

/// Aggregate counts across all regions of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub confirmed: u64,
    pub recovered: u64,
    pub deaths: u64,
    pub active: u64,
}
