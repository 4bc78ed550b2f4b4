use std::path::PathBuf;

use covid_core::{InvalidPageSize, Msg, PageSize, ParseSortKeyError, SortKey};

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Redraw,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help` for a list")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    SortKey(#[from] ParseSortKeyError),
    #[error(transparent)]
    PageSize(#[from] InvalidPageSize),
    #[error("`{0}` is not a page number (pages start at 1)")]
    Page(String),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    // `/text` and `/ text` both search for `text`.
    if let Some(text) = line.trim_start().strip_prefix('/') {
        let text = text.strip_prefix(' ').unwrap_or(text);
        return Ok(Command::Dispatch(Msg::SearchChanged(text.to_string())));
    }
    let (word, rest) = match line.trim_start().split_once(' ') {
        Some((word, rest)) => (word, Some(rest)),
        None => (line.trim(), None),
    };
    let arg = rest.map(str::trim).filter(|arg| !arg.is_empty());

    let msg = match word {
        "" => return Ok(Command::Redraw),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "q" | "exit" => return Ok(Command::Quit),
        "sort" => {
            let key: SortKey = arg.ok_or(CommandError::MissingArgument("sort"))?.parse()?;
            Msg::SortRequested(key)
        }
        // Search text is used verbatim, spaces included.
        "search" => Msg::SearchChanged(rest.unwrap_or_default().to_string()),
        "clear" => Msg::SearchChanged(String::new()),
        "page" => {
            let raw = arg.ok_or(CommandError::MissingArgument("page"))?;
            match raw.parse::<usize>() {
                Ok(page) if page > 0 => Msg::PageChanged(page - 1),
                _ => return Err(CommandError::Page(raw.to_string())),
            }
        }
        "next" | "n" => Msg::NextPage,
        "prev" | "p" => Msg::PreviousPage,
        "size" => {
            let raw = arg.ok_or(CommandError::MissingArgument("size"))?;
            let value = raw
                .parse::<usize>()
                .map_err(|_| CommandError::Unknown(format!("size {raw}")))?;
            Msg::PageSizeChanged(PageSize::try_from(value)?)
        }
        "export" => Msg::ExportRequested {
            destination: arg.map(PathBuf::from),
        },
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Command::Dispatch(msg))
}
