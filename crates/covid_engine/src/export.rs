use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::{ExportSummary, StateStats};

/// Column order of every export.
pub const CSV_HEADER: [&str; 5] = ["state", "confirmed", "recovered", "deaths", "active"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("export file name must not be empty or contain a path: {0:?}")]
    InvalidFileName(String),
    #[error("export worker failed: {0}")]
    Worker(String),
}

/// Renders rows as CSV with a header line. Fields containing a comma, quote
/// or line break are quoted with inner quotes doubled.
pub fn to_csv(rows: &[StateStats]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADER.join(","));
    out.push('\n');
    for row in rows {
        let fields = [
            escape_field(&row.state),
            row.confirmed.to_string(),
            row.recovered.to_string(),
            row.deaths.to_string(),
            row.active.to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Writes `rows` to `{dir}/{filename}` atomically.
pub fn export_csv(
    dir: &Path,
    filename: &str,
    rows: &[StateStats],
) -> Result<ExportSummary, ExportError> {
    if filename.is_empty() || Path::new(filename).file_name() != Some(OsStr::new(filename)) {
        return Err(ExportError::InvalidFileName(filename.to_string()));
    }
    let writer = AtomicFileWriter::new(PathBuf::from(dir));
    let path = writer.write(filename, to_csv(rows).as_bytes())?;
    engine_info!("Exported {} rows to {:?}", rows.len(), path);
    Ok(ExportSummary {
        path,
        row_count: rows.len(),
    })
}
