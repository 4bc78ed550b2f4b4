use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use covid_core::{update, AppState, ExportStatus, LoadState, Msg};
use covid_engine::EngineHandle;
use engine_logging::{engine_info, engine_warn};

use super::cli::CliArgs;
use super::commands::{parse_command, Command};
use super::config::DashboardConfig;
use super::effects::EffectRunner;
use super::ui;

pub fn run_app(args: CliArgs) -> Result<()> {
    let config = DashboardConfig::load(args.config.as_deref())?.apply_overrides(&args);
    engine_logging::initialize(
        config.log_destination(),
        config.log_level()?,
        &config.log_file,
    );
    engine_info!("Starting dashboard endpoint={}", config.endpoint);

    let state = AppState::new()
        .with_page_size(config.page_size()?)
        .with_filter_policy(config.filter_policy());
    let runner = EffectRunner::new(
        EngineHandle::new(config.fetch_settings()),
        config.export_dir.clone(),
    );
    let mut session = Session::new(state, runner, args.initial_messages());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.once {
        // Fetch plus one optional export, each bounded by the request timeout.
        let wait = config.fetch_settings().request_timeout + Duration::from_secs(5);
        session.run_once(wait, &mut out)
    } else {
        session.run_interactive(&mut out)
    }
}

/// Core state plus the effect runner, and messages to replay once the
/// snapshot has arrived.
struct Session {
    state: AppState,
    runner: EffectRunner,
    deferred: Vec<Msg>,
}

impl Session {
    fn new(state: AppState, runner: EffectRunner, deferred: Vec<Msg>) -> Self {
        Self {
            state,
            runner,
            deferred,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let completes_load = matches!(msg, Msg::StatsLoaded { .. } | Msg::LoadFailed(_));
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);

        if completes_load {
            for msg in std::mem::take(&mut self.deferred) {
                self.dispatch(msg);
            }
        }
    }

    fn render(&mut self, out: &mut impl Write) -> Result<()> {
        self.state.consume_dirty();
        write!(out, "{}", ui::render::render(&self.state.view()))?;
        out.flush()?;
        Ok(())
    }

    fn run_once(&mut self, wait: Duration, out: &mut impl Write) -> Result<()> {
        self.dispatch(Msg::Mounted);
        while !self.settled() {
            match self.runner.wait(wait) {
                Some(msg) => self.dispatch(msg),
                None => {
                    engine_warn!("Gave up waiting for the engine after {:?}", wait);
                    break;
                }
            }
        }
        self.render(out)
    }

    /// Load finished and no export is still being written.
    fn settled(&self) -> bool {
        let loading = matches!(
            self.state.load_state(),
            LoadState::Idle | LoadState::Loading
        );
        let exporting = self.state.last_export() == Some(&ExportStatus::Pending);
        !loading && !exporting
    }

    fn run_interactive(&mut self, out: &mut impl Write) -> Result<()> {
        let lines = spawn_stdin_reader();
        self.dispatch(Msg::Mounted);
        self.render(out)?;
        writeln!(out, "Type `help` for commands.")?;
        write!(out, "{}", ui::constants::PROMPT)?;
        out.flush()?;

        loop {
            for msg in self.runner.poll() {
                self.dispatch(msg);
            }

            let mut force_render = false;
            match lines.recv_timeout(ui::constants::TICK_INTERVAL) {
                Ok(line) => match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => {
                        writeln!(out, "{}", ui::constants::HELP_TEXT)?;
                        write!(out, "{}", ui::constants::PROMPT)?;
                        out.flush()?;
                    }
                    Ok(Command::Redraw) => force_render = true,
                    Ok(Command::Dispatch(msg)) => {
                        self.dispatch(msg);
                        force_render = true;
                    }
                    Err(err) => {
                        writeln!(out, "{err}")?;
                        write!(out, "{}", ui::constants::PROMPT)?;
                        out.flush()?;
                    }
                },
                Err(RecvTimeoutError::Timeout) => self.dispatch(Msg::Tick),
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if force_render || self.state.is_dirty() {
                self.render(out)?;
                write!(out, "{}", ui::constants::PROMPT)?;
                out.flush()?;
            }
        }

        engine_info!("Dashboard closed");
        Ok(())
    }
}

/// Forwards stdin lines over a channel; the channel closes on EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line.context("reading stdin") {
                Ok(line) => line,
                Err(err) => {
                    engine_warn!("{:#}", err);
                    break;
                }
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Once};

    use covid_core::{SortKey, SortState};
    use covid_engine::{
        FailureKind, FetchError, StateStats, StatewiseSnapshot, StatsSource, TotalStats,
    };
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(5);

    fn init_logging() {
        static INIT: Once = Once::new();
        INIT.call_once(engine_logging::initialize_for_tests);
    }

    struct StubSource(Result<StatewiseSnapshot, FetchError>);

    #[async_trait::async_trait]
    impl StatsSource for StubSource {
        async fn fetch_statewise(&self) -> Result<StatewiseSnapshot, FetchError> {
            self.0.clone()
        }
    }

    fn snapshot(count: u64) -> StatewiseSnapshot {
        StatewiseSnapshot {
            states: (0..count)
                .map(|i| StateStats {
                    state: format!("Region {i:02}"),
                    confirmed: i,
                    ..StateStats::default()
                })
                .collect(),
            total: TotalStats::default(),
        }
    }

    fn session(
        result: Result<StatewiseSnapshot, FetchError>,
        deferred: Vec<Msg>,
        export_dir: &Path,
    ) -> Session {
        init_logging();
        let runner = EffectRunner::new(
            EngineHandle::with_source(Arc::new(StubSource(result))),
            export_dir.to_path_buf(),
        );
        Session::new(AppState::new(), runner, deferred)
    }

    fn next_msg(session: &Session) -> Msg {
        match session.runner.wait(WAIT) {
            Some(msg) => msg,
            None => panic!("no engine event within {WAIT:?}"),
        }
    }

    #[test]
    fn deferred_flags_apply_once_snapshot_arrives() {
        let temp = TempDir::new().unwrap();
        let mut session = session(
            Ok(snapshot(12)),
            vec![
                Msg::SearchChanged("Region".into()),
                Msg::SortRequested(SortKey::Confirmed),
                Msg::SortRequested(SortKey::Confirmed),
                Msg::PageChanged(1),
            ],
            temp.path(),
        );

        session.dispatch(Msg::Mounted);
        assert_eq!(session.state.filter_text(), "");
        assert_eq!(session.state.sort_state(), None);
        assert_eq!(session.deferred.len(), 4);

        let msg = next_msg(&session);
        assert!(matches!(msg, Msg::StatsLoaded { .. }));
        session.dispatch(msg);

        assert!(session.deferred.is_empty());
        assert_eq!(session.state.filter_text(), "Region");
        assert_eq!(
            session.state.sort_state(),
            Some(SortState::descending(SortKey::Confirmed))
        );
        assert_eq!(session.state.page_state().index, 1);
        let names: Vec<String> = session
            .state
            .view()
            .rows
            .into_iter()
            .map(|r| r.state)
            .collect();
        assert_eq!(
            names,
            vec!["Region 06", "Region 05", "Region 04", "Region 03", "Region 02"]
        );
    }

    #[test]
    fn deferred_flags_replay_after_failed_load() {
        let temp = TempDir::new().unwrap();
        let mut session = session(
            Err(FetchError {
                kind: FailureKind::HttpStatus(503),
                message: "down".into(),
            }),
            vec![Msg::SearchChanged("Goa".into())],
            temp.path(),
        );

        session.dispatch(Msg::Mounted);
        assert!(!session.settled());
        let msg = next_msg(&session);
        assert!(matches!(msg, Msg::LoadFailed(_)));
        session.dispatch(msg);

        assert!(session.deferred.is_empty());
        assert_eq!(session.state.filter_text(), "Goa");
        assert!(matches!(
            session.state.load_state(),
            LoadState::Failed { .. }
        ));
        assert!(session.settled());
    }

    #[test]
    fn pending_export_keeps_session_unsettled() {
        let temp = TempDir::new().unwrap();
        let mut session = session(
            Ok(snapshot(3)),
            vec![Msg::ExportRequested {
                destination: Some(PathBuf::from("out.csv")),
            }],
            temp.path(),
        );

        session.dispatch(Msg::Mounted);
        assert!(!session.settled());

        let msg = next_msg(&session);
        session.dispatch(msg);
        assert_eq!(session.state.last_export(), Some(&ExportStatus::Pending));
        assert!(!session.settled());

        let msg = next_msg(&session);
        session.dispatch(msg);
        assert!(matches!(
            session.state.last_export(),
            Some(ExportStatus::Written { rows: 3, .. })
        ));
        assert!(session.settled());
        assert!(temp.path().join("out.csv").is_file());
    }

    #[test]
    fn run_once_renders_settled_view() {
        let temp = TempDir::new().unwrap();
        let mut session = session(
            Ok(snapshot(7)),
            vec![Msg::SearchChanged("Region 0".into())],
            temp.path(),
        );
        let mut out = Vec::new();

        session.run_once(WAIT, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Search: \"Region 0\"\n"));
        assert!(text.contains("Rows per page: 5   1-5 of 7   Page 1 of 2"));
        assert!(!text.contains("Loading statewise data..."));
    }
}
