//! CLI help and command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name string for log events (e.g. "tree", "resolve").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Tree { .. } => "tree",
        Commands::Resolve { .. } => "resolve",
        Commands::Strata { .. } => "strata",
        Commands::Validate { .. } => "validate",
        Commands::Kinds { .. } => "kinds",
        Commands::Load { .. } => "load",
    }
}

/// Output format requested by the command.
pub fn output_format(command: &Commands) -> &str {
    match command {
        Commands::Tree { format, .. }
        | Commands::Resolve { format, .. }
        | Commands::Strata { format, .. }
        | Commands::Validate { format }
        | Commands::Kinds { format }
        | Commands::Load { format, .. } => format,
    }
}
