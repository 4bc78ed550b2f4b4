use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::export::{export_csv, ExportError};
use crate::fetch::{FetchSettings, ReqwestStatsSource, StatsSource};
use crate::{EngineEvent, FailureKind, FetchError, StateStats};

enum EngineCommand {
    LoadStatewise,
    ExportCsv {
        dir: PathBuf,
        filename: String,
        rows: Vec<StateStats>,
    },
}

/// Handle to the background I/O worker.
///
/// Dropping the handle cancels any in-flight fetch; its result is discarded
/// instead of being delivered to a receiver that is gone.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings) -> Self {
        Self::with_source(Arc::new(ReqwestStatsSource::new(settings)))
    }

    pub fn with_source(source: Arc<dyn StatsSource>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        thread::spawn(move || run_worker(source, cmd_rx, event_tx, worker_cancel));

        Self {
            cmd_tx,
            event_rx,
            cancel,
        }
    }

    pub fn load_statewise(&self) {
        let _ = self.cmd_tx.send(EngineCommand::LoadStatewise);
    }

    pub fn export_csv(&self, dir: PathBuf, filename: impl Into<String>, rows: Vec<StateStats>) {
        let _ = self.cmd_tx.send(EngineCommand::ExportCsv {
            dir,
            filename: filename.into(),
            rows,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn run_worker(
    source: Arc<dyn StatsSource>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            engine_error!("Failed to start engine runtime: {}", err);
            // Answer every command so callers are not left waiting.
            while let Ok(command) = cmd_rx.recv() {
                let _ = event_tx.send(runtime_failure(command, &err.to_string()));
            }
            return;
        }
    };

    while let Ok(command) = cmd_rx.recv() {
        let source = source.clone();
        let event_tx = event_tx.clone();
        let cancel = cancel.clone();
        runtime.spawn(async move {
            handle_command(source.as_ref(), command, event_tx, cancel).await;
        });
    }
}

async fn handle_command(
    source: &dyn StatsSource,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    let event = match command {
        EngineCommand::LoadStatewise => {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    engine_debug!("Statewise fetch cancelled before completion");
                    return;
                }
                result = source.fetch_statewise() => result,
            };
            if let Err(err) = &result {
                engine_warn!("Statewise fetch failed: {}", err);
            }
            EngineEvent::StatewiseLoaded(result)
        }
        EngineCommand::ExportCsv {
            dir,
            filename,
            rows,
        } => {
            let joined =
                tokio::task::spawn_blocking(move || export_csv(&dir, &filename, &rows)).await;
            let result = joined.unwrap_or_else(|err| Err(ExportError::Worker(err.to_string())));
            if let Err(err) = &result {
                engine_warn!("CSV export failed: {}", err);
            }
            EngineEvent::ExportCompleted(result)
        }
    };

    if cancel.is_cancelled() {
        engine_debug!("Engine torn down, dropping event");
        return;
    }
    if event_tx.send(event).is_err() {
        engine_debug!("Engine event receiver gone");
    }
}

fn runtime_failure(command: EngineCommand, reason: &str) -> EngineEvent {
    match command {
        EngineCommand::LoadStatewise => EngineEvent::StatewiseLoaded(Err(FetchError::new(
            FailureKind::Network,
            format!("engine runtime unavailable: {reason}"),
        ))),
        EngineCommand::ExportCsv { .. } => EngineEvent::ExportCompleted(Err(
            ExportError::Worker(format!("engine runtime unavailable: {reason}")),
        )),
    }
}
