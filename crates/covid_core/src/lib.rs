//! Covid dashboard core: pure state machine, table engine and view-model helpers.
mod effect;
mod msg;
mod record;
mod state;
pub mod table;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use record::{Record, Totals};
pub use state::{AppState, ExportStatus, LoadState};
pub use table::{
    filter, page_count, paginate, sort, window, FilterPolicy, InvalidPageSize, Page, PageSize,
    PageState, ParseSortKeyError, SortDirection, SortKey, SortState,
};
pub use update::update;
pub use view_model::{ColumnHeaderView, DashboardViewModel};
