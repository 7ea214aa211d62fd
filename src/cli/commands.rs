use std::path::Path;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::{
    utils::clock::Clock,
    worklog::{
        config::WorklogConfig, entities::DayRowEntity, storage::WorklogStorage,
        store::{LogMode, WorklogStore},
    },
};

use super::report::{
    render_chart, render_log_result, render_remove_result, render_table, render_totals,
    SummaryView, CHART_WIDTH,
};

/// Everything the cli can ask of an opened store. Dates are already resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreCommand {
    Today,
    Backfill(NaiveDate),
    Remove(NaiveDate),
    Summary { json: bool },
    Table { json: bool },
}

/// Runs one command against the store and returns what should be shown to the user.
pub async fn process_store_command<S: WorklogStorage>(
    command: StoreCommand,
    store: &mut WorklogStore<S>,
    clock: &impl Clock,
) -> Result<String> {
    let currency = store.config().currency.clone();
    let output = match command {
        StoreCommand::Today => log(store, clock.today(), LogMode::Today, &currency).await?,
        StoreCommand::Backfill(date) => log(store, date, LogMode::Backfill, &currency).await?,
        StoreCommand::Remove(date) => {
            let result = store.remove_log(date).await?;
            format!("{}\n", render_remove_result(date, &result))
        }
        StoreCommand::Summary { json: true } => {
            serde_json::to_string_pretty(&SummaryView::from(store.totals()))? + "\n"
        }
        StoreCommand::Summary { json: false } => {
            let totals = store.totals();
            render_totals(&totals, &currency) + "\n" + &render_chart(&totals, CHART_WIDTH)
        }
        StoreCommand::Table { json: true } => {
            let rows = store
                .records()
                .iter()
                .map(DayRowEntity::from)
                .collect::<Vec<_>>();
            serde_json::to_string_pretty(&rows)? + "\n"
        }
        StoreCommand::Table { json: false } => render_table(store.records(), &currency),
    };
    Ok(output)
}

async fn log<S: WorklogStorage>(
    store: &mut WorklogStore<S>,
    date: NaiveDate,
    mode: LogMode,
    currency: &str,
) -> Result<String> {
    let result = store.log_day(date, mode).await?;
    let rendered = store
        .record(date)
        .map(|record| render_log_result(record, &result, currency))
        .unwrap_or_default();
    let totals = store.totals();
    Ok(format!("{rendered}\n{}", render_totals(&totals, currency)))
}

/// Writes the default configuration so it can be edited by hand.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("Configuration already exists at {path:?}, pass --force to overwrite it");
    }
    WorklogConfig::default().save(path)?;
    info!("Wrote default configuration into {path:?}");
    Ok(())
}
