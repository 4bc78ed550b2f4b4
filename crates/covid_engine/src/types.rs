use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ExportError;

/// Case counts for one state as served by the statewise endpoint.
///
/// Counts missing from the payload decode as zero; extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StateStats {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub confirmed: u64,
    #[serde(default)]
    pub recovered: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub active: u64,
}

/// Country-wide aggregate of the same counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct TotalStats {
    #[serde(default)]
    pub confirmed: u64,
    #[serde(default)]
    pub recovered: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub active: u64,
}

/// One decoded response: per-state rows in source order plus the totals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatewiseSnapshot {
    pub states: Vec<StateStats>,
    pub total: TotalStats,
}

/// `{ "data": { "statewise": [...], "total": {...} } }`
#[derive(Debug, Deserialize)]
pub(crate) struct StatewiseEnvelope {
    pub data: StatewisePayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatewisePayload {
    pub statewise: Vec<StateStats>,
    #[serde(default)]
    pub total: TotalStats,
}

impl From<StatewiseEnvelope> for StatewiseSnapshot {
    fn from(envelope: StatewiseEnvelope) -> Self {
        Self {
            states: envelope.data.statewise,
            total: envelope.data.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub row_count: usize,
}

#[derive(Debug)]
pub enum EngineEvent {
    StatewiseLoaded(Result<StatewiseSnapshot, FetchError>),
    ExportCompleted(Result<ExportSummary, ExportError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
