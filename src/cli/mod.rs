// Command-line and environment binding for the two run locations

mod args;

pub use args::CliArgs;

use clap::Parser;

/// Parse command-line arguments (and their environment fallbacks).
///
/// On `--help` or invalid input clap prints a message and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
