use std::time::Duration;

pub const TITLE: &str = "Covid Dashboard Of India";

/// How long the event loop waits for input before emitting a tick.
pub const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub const ASCENDING_MARK: &str = " ^";
pub const DESCENDING_MARK: &str = " v";

pub const PROMPT: &str = "> ";

pub const HELP_TEXT: &str = "\
Commands:
  sort <column>    sort by state|confirmed|recovered|deaths|active (again to reverse)
  search <text>    show states containing <text> (case-sensitive)
  clear            clear the search
  page <n>         go to page n
  next | prev      move one page
  size <5|10|25>   rows per page
  export [file]    write the current view as CSV
  help             this text
  quit             leave";
