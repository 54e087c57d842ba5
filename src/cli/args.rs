use crate::config::{DEFAULT_OUTPUT_DIRECTORY, DEFAULT_QFX_DIRECTORY, RunConfig};
use clap::Parser;
use std::path::PathBuf;

/// Consolidate a folder of QFX exports into one CSV report
#[derive(Parser, Debug)]
#[command(name = "money-mapper")]
#[command(about = "Consolidate a folder of QFX exports into one CSV report", long_about = None)]
pub struct CliArgs {
    /// Directory scanned for .qfx/.ofx export files
    #[arg(
        long = "qfx-directory",
        env = "QFX_DIRECTORY",
        value_name = "DIR",
        default_value = DEFAULT_QFX_DIRECTORY
    )]
    pub qfx_directory: PathBuf,

    /// Directory that receives money_mapper_output.csv and the staging database
    #[arg(
        long = "output-directory",
        env = "OUTPUT_DIRECTORY",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIRECTORY
    )]
    pub output_directory: PathBuf,
}

impl CliArgs {
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig::new(&self.qfx_directory, &self.output_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::explicit(
        &["money-mapper", "--qfx-directory", "downloads", "--output-directory", "reports"],
        "downloads",
        "reports"
    )]
    #[case::equals_syntax(
        &["money-mapper", "--qfx-directory=in", "--output-directory=out"],
        "in",
        "out"
    )]
    fn test_directory_options(#[case] args: &[&str], #[case] input: &str, #[case] output: &str) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        let config = parsed.to_run_config();

        assert_eq!(config.input_dir, PathBuf::from(input));
        assert_eq!(config.output_dir, PathBuf::from(output));
    }

    #[rstest]
    #[case::unknown_flag(&["money-mapper", "--verbose"])]
    #[case::positional(&["money-mapper", "extra"])]
    #[case::missing_value(&["money-mapper", "--qfx-directory"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
