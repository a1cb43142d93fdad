//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to the orchestrator.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::{exit_code, map_error};
pub use parse::{BackupChoice, Cli, Commands, OutputFormat};
pub use presentation::{
    format_environments_json, format_environments_text, format_lines_json, format_lines_text,
    EnvironmentRow,
};
pub use route::RunContext;
