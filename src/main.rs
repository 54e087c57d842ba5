//! money-mapper
//!
//! Reads every `.qfx`/`.ofx` export in the input directory and writes
//! `money_mapper_output.csv` into the output directory.
//!
//! ```bash
//! money-mapper
//! money-mapper --qfx-directory ~/Downloads/exports --output-directory reports
//! QFX_DIRECTORY=exports OUTPUT_DIRECTORY=reports money-mapper
//! ```
//!
//! # Exit Codes
//!
//! - 0: report written (some files may have been skipped, see the log)
//! - 1: bad configuration, staging store failure or report write failure

use env_logger::Env;
use log::error;
use money_mapper::{cli, run};
use std::process;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = cli::parse_args();
    let config = args.to_run_config();

    match run(&config) {
        Ok(summary) => summary.log_summary(),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
