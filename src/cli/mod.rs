pub mod commands;
pub mod dates;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{init_config, process_store_command, StoreCommand};
use dates::{parse_user_date, DateArgs};
use tracing::level_filters::LevelFilter;

use crate::{
    utils::{
        clock::{Clock, LocalClock},
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, WORKLOG_PREFIX},
    },
    worklog::{config::WorklogConfig, storage::CsvWorklogStorage, store::WorklogStore},
};

pub const DATA_FILE_NAME: &str = "worklog.csv";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Parser, Debug)]
#[command(name = "Worklog", version, long_about = None)]
#[command(about = "Keeps track of hours worked and money earned", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        help = "Configuration file. By default config.json inside the application directory"
    )]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Write the default configuration so it can be edited")]
    Init {
        #[arg(long, help = "Overwrite an existing configuration")]
        force: bool,
    },
    #[command(about = "Print the configuration in use")]
    Config,
    #[command(about = "Log today's hours")]
    Today,
    #[command(about = "Log a missed day. Days that already have hours are left untouched")]
    Backfill {
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Remove an accidental log")]
    Remove {
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Show totals and the earned / to earn proportion")]
    Summary {
        #[arg(long, help = "Print as json")]
        json: bool,
    },
    #[command(about = "Show the detailed work log")]
    Table {
        #[arg(long, help = "Print as json")]
        json: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(WORKLOG_PREFIX, &app_dir, logging_level, args.log)?;

    let config_path = args
        .config
        .unwrap_or_else(|| app_dir.join(CONFIG_FILE_NAME));
    let clock = LocalClock;

    let command = match args.commands {
        Commands::Init { force } => {
            init_config(&config_path, force)?;
            println!("Wrote default configuration into {}", config_path.display());
            return Ok(());
        }
        Commands::Config => {
            let config = WorklogConfig::load_or_default(&config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        Commands::Today => StoreCommand::Today,
        Commands::Backfill { date } => {
            StoreCommand::Backfill(parse_user_date(&date.date, date.date_style, clock.today())?)
        }
        Commands::Remove { date } => {
            StoreCommand::Remove(parse_user_date(&date.date, date.date_style, clock.today())?)
        }
        Commands::Summary { json } => StoreCommand::Summary { json },
        Commands::Table { json } => StoreCommand::Table { json },
    };

    let config = WorklogConfig::load_or_default(&config_path)?;
    let storage = CsvWorklogStorage::new(app_dir.join(DATA_FILE_NAME))?;
    let mut store = WorklogStore::open(config, storage).await?;

    let output = process_store_command(command, &mut store, &clock).await?;
    print!("{output}");
    Ok(())
}
