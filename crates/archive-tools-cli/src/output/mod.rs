//! Output formatting: human-readable text or JSON on stdout.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use crate::cli::Cli;
use human::HumanFormatter;
use json::JsonFormatter;

/// Picks the formatter selected by the global flags.
pub fn create_formatter(cli: &Cli) -> Box<dyn OutputFormatter> {
    if cli.json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter::new(cli.verbose, cli.quiet))
    }
}
