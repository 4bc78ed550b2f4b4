use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use covid_core::{Effect, ExportStatus, Msg, Record, Totals};
use covid_engine::{EngineEvent, EngineHandle, StateStats, StatewiseSnapshot};
use engine_logging::{engine_error, engine_info};

pub struct EffectRunner {
    engine: EngineHandle,
    export_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, export_dir: PathBuf) -> Self {
        Self { engine, export_dir }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchStatewise => {
                    engine_info!("FetchStatewise");
                    self.engine.load_statewise();
                }
                Effect::ExportCsv {
                    records,
                    destination,
                } => {
                    let (dir, filename) =
                        resolve_destination(&self.export_dir, destination.as_deref(), Local::now());
                    engine_info!(
                        "ExportCsv rows={} dir={:?} file={}",
                        records.len(),
                        dir,
                        filename
                    );
                    let rows = records.into_iter().map(to_stats).collect();
                    self.engine.export_csv(dir, filename, rows);
                }
            }
        }
    }

    /// Engine events that arrived since the last call, as core messages.
    pub fn poll(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            msgs.push(map_event(event));
        }
        msgs
    }

    /// Blocks up to `timeout` for the next engine event.
    pub fn wait(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

/// Splits an export destination into directory and file name. Bare file
/// names and a missing destination land in `export_dir`; the latter gets a
/// timestamped name.
pub fn resolve_destination(
    export_dir: &Path,
    destination: Option<&Path>,
    now: DateTime<Local>,
) -> (PathBuf, String) {
    let default_name = || format!("statewise_{}.csv", now.format("%Y%m%d_%H%M%S"));
    let Some(destination) = destination else {
        return (export_dir.to_path_buf(), default_name());
    };
    let filename = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(default_name);
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => export_dir.to_path_buf(),
    };
    (dir, filename)
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StatewiseLoaded(Ok(snapshot)) => {
            engine_info!("Loaded statewise stats for {} states", snapshot.states.len());
            snapshot_to_msg(snapshot)
        }
        EngineEvent::StatewiseLoaded(Err(err)) => {
            engine_error!("Failed to load statewise stats: {}", err);
            Msg::LoadFailed(err.to_string())
        }
        EngineEvent::ExportCompleted(Ok(summary)) => Msg::ExportFinished(ExportStatus::Written {
            path: summary.path.display().to_string(),
            rows: summary.row_count,
        }),
        EngineEvent::ExportCompleted(Err(err)) => {
            engine_error!("CSV export failed: {}", err);
            Msg::ExportFinished(ExportStatus::Failed {
                reason: err.to_string(),
            })
        }
    }
}

fn snapshot_to_msg(snapshot: StatewiseSnapshot) -> Msg {
    Msg::StatsLoaded {
        records: snapshot
            .states
            .into_iter()
            .map(|s| Record::new(s.state, s.confirmed, s.recovered, s.deaths, s.active))
            .collect(),
        totals: Totals {
            confirmed: snapshot.total.confirmed,
            recovered: snapshot.total.recovered,
            deaths: snapshot.total.deaths,
            active: snapshot.total.active,
        },
    }
}

fn to_stats(record: Record) -> StateStats {
    StateStats {
        state: record.state,
        confirmed: record.confirmed,
        recovered: record.recovered,
        deaths: record.deaths,
        active: record.active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use covid_engine::{ExportSummary, FailureKind, FetchError, TotalStats};
    use pretty_assertions::assert_eq;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2020, 6, 1, 9, 30, 5).unwrap()
    }

    #[test]
    fn missing_destination_gets_timestamped_name() {
        let (dir, name) = resolve_destination(Path::new("exports"), None, fixed_now());
        assert_eq!(dir, PathBuf::from("exports"));
        assert_eq!(name, "statewise_20200601_093005.csv");
    }

    #[test]
    fn bare_name_lands_in_export_dir() {
        let (dir, name) =
            resolve_destination(Path::new("exports"), Some(Path::new("k.csv")), fixed_now());
        assert_eq!(dir, PathBuf::from("exports"));
        assert_eq!(name, "k.csv");
    }

    #[test]
    fn path_destination_keeps_its_directory() {
        let (dir, name) = resolve_destination(
            Path::new("exports"),
            Some(Path::new("/tmp/reports/k.csv")),
            fixed_now(),
        );
        assert_eq!(dir, PathBuf::from("/tmp/reports"));
        assert_eq!(name, "k.csv");
    }

    #[test]
    fn snapshot_event_becomes_loaded_msg() {
        let event = EngineEvent::StatewiseLoaded(Ok(StatewiseSnapshot {
            states: vec![StateStats {
                state: "Goa".into(),
                confirmed: 3,
                recovered: 1,
                deaths: 0,
                active: 2,
            }],
            total: TotalStats {
                confirmed: 3,
                recovered: 1,
                deaths: 0,
                active: 2,
            },
        }));

        assert_eq!(
            map_event(event),
            Msg::StatsLoaded {
                records: vec![Record::new("Goa", 3, 1, 0, 2)],
                totals: Totals {
                    confirmed: 3,
                    recovered: 1,
                    deaths: 0,
                    active: 2,
                },
            }
        );
    }

    #[test]
    fn failures_become_status_msgs() {
        let event = EngineEvent::StatewiseLoaded(Err(FetchError {
            kind: FailureKind::Timeout,
            message: "slow".into(),
        }));
        assert_eq!(map_event(event), Msg::LoadFailed("timeout: slow".into()));

        let event = EngineEvent::ExportCompleted(Ok(ExportSummary {
            path: PathBuf::from("exports/a.csv"),
            row_count: 4,
        }));
        assert_eq!(
            map_event(event),
            Msg::ExportFinished(ExportStatus::Written {
                path: PathBuf::from("exports/a.csv").display().to_string(),
                rows: 4,
            })
        );
    }
}
