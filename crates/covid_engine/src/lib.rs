//! Covid dashboard engine: statewise fetch, CSV export and the background
//! worker that runs them.
mod engine;
mod export;
mod fetch;
mod persist;
mod types;

pub use engine::EngineHandle;
pub use export::{export_csv, to_csv, ExportError, CSV_HEADER};
pub use fetch::{
    decode_statewise, FetchSettings, ReqwestStatsSource, RequestMethod, StatsSource,
    DEFAULT_ENDPOINT,
};
pub use persist::{ensure_export_dir, AtomicFileWriter, PersistError};
pub(crate) use types::StatewiseEnvelope;
pub use types::{
    EngineEvent, ExportSummary, FailureKind, FetchError, StateStats, StatewiseSnapshot, TotalStats,
};
