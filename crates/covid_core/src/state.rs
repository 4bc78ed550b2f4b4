use crate::table::{self, FilterPolicy, PageSize, PageState, SortState};
use crate::view_model::{ColumnHeaderView, DashboardViewModel};
use crate::{Record, SortKey, Totals};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Pending,
    Written { path: String, rows: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    /// Snapshot as delivered by the data source, never reordered.
    records: Vec<Record>,
    /// Current filtered view, in source order.
    view: Vec<Record>,
    totals: Option<Totals>,
    sort: Option<SortState>,
    page: PageState,
    filter_text: String,
    filter_policy: FilterPolicy,
    load: LoadState,
    last_export: Option<ExportStatus>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page = self.page.with_size(size);
        self
    }

    pub fn with_filter_policy(mut self, policy: FilterPolicy) -> Self {
        self.filter_policy = policy;
        self
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn last_export(&self) -> Option<&ExportStatus> {
        self.last_export.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Filtered view ordered by the active sort, not paginated. This is the
    /// set a CSV export contains.
    pub fn sorted_view(&self) -> Vec<Record> {
        match self.sort {
            Some(sort) => table::sort(&self.view, sort),
            None => self.view.clone(),
        }
    }

    pub fn view(&self) -> DashboardViewModel {
        let sorted = self.sorted_view();
        let page = table::paginate(&sorted, self.page);
        let columns = SortKey::ALL
            .into_iter()
            .map(|key| ColumnHeaderView {
                key,
                label: key.label(),
                sort: self
                    .sort
                    .filter(|active| active.key == key)
                    .map(|active| active.direction),
            })
            .collect();

        DashboardViewModel {
            load: self.load.clone(),
            totals: self.totals,
            columns,
            rows: page.rows.to_vec(),
            empty_row_count: page.empty_row_count,
            display_range: page.display_range(),
            filter_text: self.filter_text.clone(),
            filtered_count: sorted.len(),
            page_index: self.page.index,
            page_count: table::page_count(sorted.len(), self.page.size),
            page_size: self.page.size,
            last_export: self.last_export.clone(),
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Idle → Loading. Returns false when a load was already started.
    pub(crate) fn begin_load(&mut self) -> bool {
        if self.load != LoadState::Idle {
            return false;
        }
        self.load = LoadState::Loading;
        self.mark_dirty();
        true
    }

    /// Returns false if a snapshot was already accepted this session.
    pub(crate) fn apply_loaded(&mut self, records: Vec<Record>, totals: Totals) -> bool {
        if self.load == LoadState::Loaded {
            return false;
        }
        self.records = records;
        self.totals = Some(totals);
        self.view = self.records.clone();
        self.load = LoadState::Loaded;
        if !self.filter_text.is_empty() {
            let text = self.filter_text.clone();
            self.apply_search(text);
        }
        self.page = self.page.clamped(self.view.len());
        self.mark_dirty();
        true
    }

    pub(crate) fn apply_load_failed(&mut self, reason: String) {
        if self.load == LoadState::Loaded {
            return;
        }
        self.load = LoadState::Failed { reason };
        self.mark_dirty();
    }

    pub(crate) fn apply_sort_click(&mut self, key: SortKey) {
        self.sort = Some(SortState::toggle(self.sort, key));
        self.mark_dirty();
    }

    /// Re-filters the original record set. The committed view follows the
    /// configured [`FilterPolicy`]; a changed view restarts at page 0.
    pub(crate) fn apply_search(&mut self, text: String) {
        let candidate = table::filter(&self.records, &text);
        self.filter_text = text;
        self.mark_dirty();

        let commit = match self.filter_policy {
            FilterPolicy::CommitEmpty => true,
            FilterPolicy::RetainOnEmpty => !candidate.is_empty(),
        };
        if commit && candidate != self.view {
            self.view = candidate;
            self.page.index = 0;
        }
    }

    pub(crate) fn go_to_page(&mut self, index: usize) {
        let target = PageState {
            index,
            size: self.page.size,
        }
        .clamped(self.view.len());
        if target != self.page {
            self.page = target;
            self.mark_dirty();
        }
    }

    pub(crate) fn next_page(&mut self) {
        self.go_to_page(self.page.index.saturating_add(1));
    }

    pub(crate) fn previous_page(&mut self) {
        self.go_to_page(self.page.index.saturating_sub(1));
    }

    pub(crate) fn set_page_size(&mut self, size: PageSize) {
        let next = self.page.with_size(size);
        if next != self.page {
            self.page = next;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_export_status(&mut self, status: ExportStatus) {
        self.last_export = Some(status);
        self.mark_dirty();
    }
}
