//! Dashboard configuration: an optional RON file, overridden by CLI flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use covid_core::{FilterPolicy, PageSize};
use covid_engine::{FetchSettings, RequestMethod, DEFAULT_ENDPOINT};
use engine_logging::{engine_info, LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;
use serde::Deserialize;

use super::cli::CliArgs;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum EmptySearch {
    /// Show an empty table.
    Commit,
    /// Keep showing the previous result.
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub endpoint: String,
    pub method: HttpMethod,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
    pub page_size: usize,
    pub empty_search: EmptySearch,
    pub export_dir: PathBuf,
    pub log_target: LogTarget,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            method: HttpMethod::Post,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_bytes: fetch.max_bytes,
            page_size: PageSize::default().get(),
            empty_search: EmptySearch::Commit,
            export_dir: PathBuf::from("exports"),
            log_target: LogTarget::File,
            log_level: "info".to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl DashboardConfig {
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|err| anyhow!("invalid dashboard config: {err}"))
    }

    /// Reads `explicit` if given (it must exist), otherwise
    /// [`DEFAULT_CONFIG_FILE`] when present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config =
            Self::from_ron(&text).with_context(|| format!("parsing {}", path.display()))?;
        engine_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply_overrides(mut self, args: &CliArgs) -> Self {
        if let Some(endpoint) = &args.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(method) = args.method {
            self.method = method;
        }
        if let Some(page_size) = args.page_size {
            self.page_size = page_size;
        }
        if let Some(empty_search) = args.empty_search {
            self.empty_search = empty_search;
        }
        if let Some(dir) = &args.export_dir {
            self.export_dir = dir.clone();
        }
        if let Some(target) = args.log {
            self.log_target = target;
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        self
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            endpoint: self.endpoint.clone(),
            method: match self.method {
                HttpMethod::Get => RequestMethod::Get,
                HttpMethod::Post => RequestMethod::Post,
            },
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_bytes,
        }
    }

    pub fn page_size(&self) -> Result<PageSize> {
        Ok(PageSize::try_from(self.page_size)?)
    }

    pub fn filter_policy(&self) -> FilterPolicy {
        match self.empty_search {
            EmptySearch::Commit => FilterPolicy::CommitEmpty,
            EmptySearch::Retain => FilterPolicy::RetainOnEmpty,
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        match self.log_target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        engine_logging::parse_level(&self.log_level)
            .ok_or_else(|| anyhow!("unknown log level `{}`", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(
            DashboardConfig::from_ron("()").unwrap(),
            DashboardConfig::default()
        );
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let config = DashboardConfig::from_ron(
            r#"(
                endpoint: "http://localhost:9000/statewise",
                method: Get,
                page_size: 25,
                empty_search: Retain,
            )"#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "http://localhost:9000/statewise");
        assert_eq!(config.fetch_settings().method, RequestMethod::Get);
        assert_eq!(config.page_size().unwrap(), PageSize::TwentyFive);
        assert_eq!(config.filter_policy(), FilterPolicy::RetainOnEmpty);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(DashboardConfig::from_ron("(colour: \"red\")").is_err());
    }

    #[test]
    fn invalid_page_size_is_reported() {
        let config = DashboardConfig {
            page_size: 7,
            ..DashboardConfig::default()
        };
        assert!(config.page_size().is_err());
    }

    #[test]
    fn cli_flags_win_over_file() {
        let args = CliArgs::parse_from([
            "covid_dashboard",
            "--endpoint",
            "http://127.0.0.1:1/x",
            "--page-size",
            "10",
            "--log",
            "both",
            "--log-level",
            "debug",
        ]);
        let config = DashboardConfig::from_ron("(page_size: 25, log_target: File)")
            .unwrap()
            .apply_overrides(&args);

        assert_eq!(config.endpoint, "http://127.0.0.1:1/x");
        assert_eq!(config.page_size().unwrap(), PageSize::Ten);
        assert_eq!(config.log_destination(), LogDestination::Both);
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope.ron");
        assert!(DashboardConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_file_is_read() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("dash.ron");
        fs::write(&path, "(export_dir: \"out\")").unwrap();
        let config = DashboardConfig::load(Some(&path)).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("out"));
    }
}
