use std::path::PathBuf;

use clap::Parser;
use covid_core::{Msg, SortKey};

use super::config::{EmptySearch, HttpMethod, LogTarget};

#[derive(Parser, Debug, PartialEq)]
#[command(version, about = "Statewise COVID-19 case dashboard for India")]
pub struct CliArgs {
    /// RON config file (defaults to ./dashboard.ron when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Statewise API endpoint.
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long, value_enum)]
    pub method: Option<HttpMethod>,

    /// Rows per page: 5, 10 or 25.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// What a search without matches shows.
    #[arg(long, value_enum)]
    pub empty_search: Option<EmptySearch>,

    /// Initial sort column.
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Sort the initial column in descending order.
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Initial search text (case-sensitive).
    #[arg(long)]
    pub search: Option<String>,

    /// Initial page, starting at 1.
    #[arg(long, value_parser = parse_page)]
    pub page: Option<usize>,

    /// Write the current view as CSV to this file.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Directory for exports given without a directory.
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Render once and exit instead of reading commands from stdin.
    #[arg(long)]
    pub once: bool,

    #[arg(long, value_enum)]
    pub log: Option<LogTarget>,

    #[arg(long)]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Messages that put the table in the state the flags describe. They
    /// are meant to run once the snapshot has arrived.
    pub fn initial_messages(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        if let Some(text) = &self.search {
            msgs.push(Msg::SearchChanged(text.clone()));
        }
        if let Some(key) = self.sort {
            msgs.push(Msg::SortRequested(key));
            if self.desc {
                msgs.push(Msg::SortRequested(key));
            }
        }
        if let Some(page) = self.page {
            msgs.push(Msg::PageChanged(page - 1));
        }
        if let Some(path) = &self.export {
            msgs.push(Msg::ExportRequested {
                destination: Some(path.clone()),
            });
        }
        msgs
    }
}

fn parse_page(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("pages start at 1".to_string()),
        Ok(page) => Ok(page),
        Err(err) => Err(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_become_messages_in_order() {
        let args = CliArgs::parse_from([
            "covid_dashboard",
            "--search",
            "Pradesh",
            "--sort",
            "deaths",
            "--desc",
            "--page",
            "2",
            "--export",
            "out.csv",
        ]);

        assert_eq!(
            args.initial_messages(),
            vec![
                Msg::SearchChanged("Pradesh".into()),
                Msg::SortRequested(SortKey::Deaths),
                Msg::SortRequested(SortKey::Deaths),
                Msg::PageChanged(1),
                Msg::ExportRequested {
                    destination: Some(PathBuf::from("out.csv")),
                },
            ]
        );
    }

    #[test]
    fn desc_requires_sort() {
        assert!(CliArgs::try_parse_from(["covid_dashboard", "--desc"]).is_err());
    }

    #[test]
    fn page_zero_is_rejected() {
        assert!(CliArgs::try_parse_from(["covid_dashboard", "--page", "0"]).is_err());
    }

    #[test]
    fn unknown_sort_column_is_rejected() {
        assert!(CliArgs::try_parse_from(["covid_dashboard", "--sort", "calories"]).is_err());
    }
}
