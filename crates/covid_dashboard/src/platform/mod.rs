mod app;
mod cli;
mod commands;
mod config;
mod effects;
mod ui;

pub use app::run_app;
pub use cli::CliArgs;
