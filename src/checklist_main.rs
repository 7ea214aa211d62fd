use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use worklog::{
    checklist::{args::ChecklistArgs, run_checklist},
    utils::{
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CHECKLIST_PREFIX},
    },
};

fn main() -> ExitCode {
    match run(ChecklistArgs::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("Error running checklist {e:?}");
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the trade is permitted.
fn run(args: ChecklistArgs) -> Result<bool> {
    let app_dir = args
        .dir
        .clone()
        .map_or_else(create_application_default_path, ensure_dir)?;
    enable_logging(CHECKLIST_PREFIX, &app_dir, args.log, args.log_console)?;

    let verdict = run_checklist(&args)?;
    Ok(verdict.is_permitted())
}
