//! Table engine: filtering, stable sorting and pagination over an in-memory
//! record set.
//!
//! Every function here is pure. Callers keep the original record set and
//! derive a fresh view from it on every interaction.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::Record;

/// Column a table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    State,
    Confirmed,
    Recovered,
    Deaths,
    Active,
}

impl SortKey {
    /// Display order of the columns.
    pub const ALL: [SortKey; 5] = [
        SortKey::State,
        SortKey::Confirmed,
        SortKey::Recovered,
        SortKey::Deaths,
        SortKey::Active,
    ];

    /// Stable identifier, also used as the CSV header name.
    pub fn id(self) -> &'static str {
        match self {
            SortKey::State => "state",
            SortKey::Confirmed => "confirmed",
            SortKey::Recovered => "recovered",
            SortKey::Deaths => "deaths",
            SortKey::Active => "active",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::State => "State",
            SortKey::Confirmed => "Confirmed Cases",
            SortKey::Recovered => "Recovered Cases",
            SortKey::Deaths => "Deaths Cases",
            SortKey::Active => "Active Cases",
        }
    }

    /// Ascending comparison of two records on this column: lexicographic for
    /// `state`, numeric for the counts.
    pub fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortKey::State => a.state.cmp(&b.state),
            SortKey::Confirmed => a.confirmed.cmp(&b.confirmed),
            SortKey::Recovered => a.recovered.cmp(&b.recovered),
            SortKey::Deaths => a.deaths.cmp(&b.deaths),
            SortKey::Active => a.active.cmp(&b.active),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column `{0}` (expected one of state, confirmed, recovered, deaths, active)")]
pub struct ParseSortKeyError(pub String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseSortKeyError(wanted.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }

    /// Header-click rule: the active column flips direction, any other
    /// column becomes active in ascending order.
    pub fn toggle(current: Option<SortState>, clicked: SortKey) -> SortState {
        match current {
            Some(active) if active.key == clicked => SortState {
                key: clicked,
                direction: active.direction.toggled(),
            },
            _ => SortState::ascending(clicked),
        }
    }

    /// Comparator for this key and direction. Equal values stay `Equal` in
    /// both directions so a stable sort keeps their input order.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = self.key.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Rows-per-page choices offered by the pagination controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Five,
    Ten,
    TwentyFive,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Five, PageSize::Ten, PageSize::TwentyFive];

    pub fn get(self) -> usize {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported page size {0} (expected 5, 10 or 25)")]
pub struct InvalidPageSize(pub usize);

impl TryFrom<usize> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or(InvalidPageSize(value))
    }
}

/// Zero-based page position plus page size.
///
/// Changing the size always starts again from the first page; use
/// [`PageState::with_size`] rather than assigning `size` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageState {
    pub index: usize,
    pub size: PageSize,
}

impl PageState {
    pub fn new(size: PageSize) -> Self {
        Self { index: 0, size }
    }

    pub fn with_size(self, size: PageSize) -> Self {
        Self::new(size)
    }

    pub fn offset(&self) -> usize {
        self.index.saturating_mul(self.size.get())
    }

    /// Same size, index clamped into `0..page_count(total)`.
    pub fn clamped(self, total: usize) -> Self {
        let last = page_count(total, self.size).saturating_sub(1);
        Self {
            index: self.index.min(last),
            size: self.size,
        }
    }
}

/// What to do when a search matches no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPolicy {
    /// Always show the filtered result, even when it is empty.
    #[default]
    CommitEmpty,
    /// Keep the previous view when the new result is empty.
    RetainOnEmpty,
}

/// Records whose `state` contains `text` (case-sensitive). An empty `text`
/// keeps everything.
pub fn filter(records: &[Record], text: &str) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record.state.contains(text))
        .cloned()
        .collect()
}

/// Stable sort by `sort`; ties keep their relative input order.
pub fn sort(records: &[Record], sort: SortState) -> Vec<Record> {
    let mut sorted = records.to_vec();
    // `sort_by` is a stable merge sort.
    sorted.sort_by(|a, b| sort.compare(a, b));
    sorted
}

/// One window of a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    pub rows: &'a [Record],
    /// Rows missing from a full page, used to pad a short last page.
    pub empty_row_count: usize,
    /// Zero-based offset of `rows[0]` within the full set.
    pub offset: usize,
    pub total: usize,
}

impl Page<'_> {
    /// 1-based inclusive range of the visible rows, `None` on an empty page.
    pub fn display_range(&self) -> Option<(usize, usize)> {
        if self.rows.is_empty() {
            None
        } else {
            Some((self.offset + 1, self.offset + self.rows.len()))
        }
    }
}

/// Slice `[index * size, index * size + size)` of `records`, clipped to
/// bounds.
pub fn paginate(records: &[Record], page: PageState) -> Page<'_> {
    window(records, page.index, page.size.get())
}

/// [`paginate`] for an arbitrary page size.
pub fn window(records: &[Record], index: usize, size: usize) -> Page<'_> {
    let start = index.saturating_mul(size).min(records.len());
    let end = start.saturating_add(size).min(records.len());
    let rows = &records[start..end];
    Page {
        rows,
        empty_row_count: size - rows.len(),
        offset: start,
        total: records.len(),
    }
}

pub fn page_count(total: usize, size: PageSize) -> usize {
    total.div_ceil(size.get())
}
