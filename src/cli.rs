//! CLI domain: parse, route, help, output, and presentation only.
//! No domain logic; a single route table dispatches to the catalog.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, output_format};
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{LoadOutcome, ValidateReport};
pub use route::RunContext;
