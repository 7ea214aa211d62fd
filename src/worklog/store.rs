use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::utils::time::date_range;

use super::{
    config::WorklogConfig, entities::DayRowEntity, error::WorklogError, record::DayRecord,
    storage::WorklogStorage,
};

/// Whether a day is logged as it happens or entered afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Logging the current day. Re-logging an already logged day simply assigns the quota
    /// again unless [WorklogConfig::strict_today] is set.
    Today,
    /// Entering a missed day. Never overwrites a logged day.
    Backfill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NonWorkingDay,
    AlreadyLogged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogResult {
    Logged { hours: f64, earned: f64 },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveResult {
    Removed,
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub earned: f64,
    pub to_earn: f64,
}

impl Totals {
    pub fn overall(&self) -> f64 {
        self.earned + self.to_earn
    }
}

/// Owns the ledger table. Every change goes through [WorklogStore::log_day] or
/// [WorklogStore::remove_log], which recompute the derived columns and then save the whole
/// table.
pub struct WorklogStore<S> {
    config: WorklogConfig,
    records: Vec<DayRecord>,
    storage: S,
}

impl<S> WorklogStore<S> {
    pub fn config(&self) -> &WorklogConfig {
        &self.config
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn record(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.index_of(date).ok().map(|index| &self.records[index])
    }

    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        (self.config.start_date, self.config.end_date)
    }

    pub fn totals(&self) -> Totals {
        self.records.iter().fold(
            Totals {
                earned: 0.,
                to_earn: 0.,
            },
            |totals, record| Totals {
                earned: totals.earned + record.earned(),
                to_earn: totals.to_earn + record.to_earn(),
            },
        )
    }

    /// Derives `to_earn` from the current `earned` column. Each record is handled on its own,
    /// so running this twice changes nothing. `hours_worked` and `earned` are left alone;
    /// mutations keep non-working days at zero.
    fn recompute(&mut self) {
        let quota_value = self.config.daily_quota_value();
        for record in &mut self.records {
            let to_earn = if self.config.is_working_day(record.weekday()) {
                (quota_value - record.earned()).max(0.)
            } else {
                0.
            };
            record.set_to_earn(to_earn);
        }
    }

    fn index_of(&self, date: NaiveDate) -> Result<usize, WorklogError> {
        if !self.config.contains(date) {
            return Err(WorklogError::OutOfRange {
                date,
                start: self.config.start_date,
                end: self.config.end_date,
            });
        }
        Ok((date - self.config.start_date).num_days() as usize)
    }
}

impl<S: WorklogStorage> WorklogStore<S> {
    /// Loads the persisted table, or builds an empty one over the configured range if nothing
    /// was saved yet. Doesn't write anything.
    #[instrument(skip_all)]
    pub async fn open(config: WorklogConfig, storage: S) -> Result<Self, WorklogError> {
        config.validate()?;

        let mut records = date_range(config.start_date, config.end_date)
            .map(|date| DayRecord::new(date, config.hourly_rate))
            .collect::<Vec<_>>();

        match storage.load().await? {
            Some(rows) => {
                debug!("Reconciling {} stored rows", rows.len());
                reconcile(&config, &mut records, rows)?;
            }
            None => debug!("No stored worklog, starting with an empty table"),
        }

        let mut store = Self {
            config,
            records,
            storage,
        };
        store.recompute();
        Ok(store)
    }

    /// Credits the standard quota of hours to `date`.
    #[instrument(skip(self))]
    pub async fn log_day(
        &mut self,
        date: NaiveDate,
        mode: LogMode,
    ) -> Result<LogResult, WorklogError> {
        let index = self.index_of(date)?;
        let record = &mut self.records[index];

        if !self.config.is_working_day(record.weekday()) {
            info!("{date} is a non-working day, nothing logged");
            return Ok(LogResult::Skipped(SkipReason::NonWorkingDay));
        }

        let guarded = match mode {
            LogMode::Backfill => true,
            LogMode::Today => self.config.strict_today,
        };
        if guarded && record.is_logged() {
            info!("{date} already has hours logged");
            return Ok(LogResult::Skipped(SkipReason::AlreadyLogged));
        }

        record.set_hours(self.config.standard_hours_per_workday);
        let result = LogResult::Logged {
            hours: record.hours_worked(),
            earned: record.earned(),
        };

        self.commit().await?;
        info!("Logged {date}");
        Ok(result)
    }

    /// Clears the hours of `date`. Works on any day, including non-working ones.
    #[instrument(skip(self))]
    pub async fn remove_log(&mut self, date: NaiveDate) -> Result<RemoveResult, WorklogError> {
        let index = self.index_of(date)?;
        let record = &mut self.records[index];

        if !record.is_logged() {
            info!("{date} has no hours to remove");
            return Ok(RemoveResult::NoOp);
        }

        record.set_hours(0.);

        self.commit().await?;
        info!("Removed log for {date}");
        Ok(RemoveResult::Removed)
    }

    /// Recomputes and then persists the whole table. The in-memory table is already
    /// consistent when saving fails.
    async fn commit(&mut self) -> Result<(), WorklogError> {
        self.recompute();
        let rows = self
            .records
            .iter()
            .map(DayRowEntity::from)
            .collect::<Vec<_>>();
        self.storage.save(&rows).await?;
        Ok(())
    }
}

/// Takes the hours out of stored rows. Derived columns on disk are ignored, the table is
/// always rebuilt from the configured range.
fn reconcile(
    config: &WorklogConfig,
    records: &mut [DayRecord],
    rows: Vec<DayRowEntity>,
) -> Result<(), WorklogError> {
    let mut seen = HashSet::new();
    let mut rate_mismatch = 0usize;

    for row in rows {
        if !row.hours_worked.is_finite() || row.hours_worked < 0. {
            return Err(WorklogError::Corrupt(format!(
                "{} has invalid hours {}",
                row.date, row.hours_worked
            )));
        }
        if !seen.insert(row.date) {
            return Err(WorklogError::Corrupt(format!(
                "{} is stored more than once",
                row.date
            )));
        }
        if !config.contains(row.date) {
            warn!("Dropping {} since it's outside of the tracked range", row.date);
            continue;
        }
        if row.hourly_rate != config.hourly_rate {
            rate_mismatch += 1;
        }

        let index = (row.date - config.start_date).num_days() as usize;
        let record = &mut records[index];
        if row.hours_worked > 0. && !config.is_working_day(record.weekday()) {
            warn!(
                "Dropping {} hours stored on non-working day {}",
                row.hours_worked, row.date
            );
            continue;
        }
        record.set_hours(row.hours_worked);
    }

    if rate_mismatch > 0 {
        warn!(
            "{rate_mismatch} stored rows use a different hourly rate, using {}",
            config.hourly_rate
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use chrono::{Datelike, NaiveDate, Weekday};
    use mockall::Sequence;

    use crate::{
        utils::logging::TEST_LOGGING,
        worklog::{
            config::WorklogConfig, entities::DayRowEntity, error::WorklogError,
            storage::MockWorklogStorage,
        },
    };

    use super::{LogMode, LogResult, RemoveResult, SkipReason, WorklogStore};

    const EPSILON: f64 = 1e-9;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
    }

    /// One week starting on Sunday 2025-09-14.
    fn week_config() -> WorklogConfig {
        WorklogConfig {
            start_date: date(14),
            end_date: date(20),
            ..Default::default()
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    fn empty_storage() -> MockWorklogStorage {
        let mut storage = MockWorklogStorage::new();
        storage.expect_load().returning(|| Ok(None));
        storage
    }

    /// Storage that keeps every saved table.
    fn recording_storage() -> (MockWorklogStorage, Arc<Mutex<Vec<Vec<DayRowEntity>>>>) {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let mut storage = empty_storage();
        let sink = saved.clone();
        storage.expect_save().returning(move |rows| {
            sink.lock().unwrap().push(rows.to_vec());
            Ok(())
        });
        (storage, saved)
    }

    fn assert_invariants<S>(store: &WorklogStore<S>) {
        let config = &store.config;
        let records = &store.records;
        let expected_len = (config.end_date - config.start_date).num_days() as usize + 1;
        assert_eq!(records.len(), expected_len);
        for (offset, record) in records.iter().enumerate() {
            assert_eq!(
                record.date(),
                config.start_date + chrono::Duration::days(offset as i64)
            );
            assert_eq!(record.weekday(), record.date().weekday());
            assert!(record.hours_worked() >= 0.);
            assert_close(record.earned(), record.hours_worked() * config.hourly_rate);
            if config.is_working_day(record.weekday()) {
                assert_close(
                    record.to_earn(),
                    (config.daily_quota_value() - record.earned()).max(0.),
                );
            } else {
                assert_eq!(record.hours_worked(), 0.);
                assert_eq!(record.earned(), 0.);
                assert_eq!(record.to_earn(), 0.);
            }
        }
    }

    fn assert_closed_system<S>(store: &WorklogStore<S>) {
        let working_days = store
            .records
            .iter()
            .filter(|record| store.config.is_working_day(record.weekday()))
            .count();
        assert_close(
            store.totals().overall(),
            working_days as f64 * store.config.daily_quota_value(),
        );
    }

    #[tokio::test]
    async fn test_fresh_week() -> anyhow::Result<()> {
        *TEST_LOGGING;
        let store = WorklogStore::open(week_config(), empty_storage()).await?;

        assert_eq!(store.records().len(), 7);
        assert_invariants(&store);
        for record in store.records() {
            assert_eq!(record.hours_worked(), 0.);
            match record.weekday() {
                Weekday::Sun | Weekday::Wed => assert_eq!(record.to_earn(), 0.),
                _ => assert_close(record.to_earn(), 49.92),
            }
        }
        assert_close(store.totals().earned, 0.);
        assert_close(store.totals().to_earn, 249.60);
        Ok(())
    }

    #[tokio::test]
    async fn test_log_monday() -> anyhow::Result<()> {
        let (storage, saved) = recording_storage();
        let mut store = WorklogStore::open(week_config(), storage).await?;

        let result = store.log_day(date(15), LogMode::Today).await?;

        assert_eq!(
            result,
            LogResult::Logged {
                hours: 4.,
                earned: 49.92
            }
        );
        let monday = store.record(date(15)).unwrap();
        assert_eq!(monday.hours_worked(), 4.);
        assert_close(monday.earned(), 49.92);
        assert_eq!(monday.to_earn(), 0.);
        assert_close(store.totals().earned, 49.92);
        assert_close(store.totals().to_earn, 199.68);
        assert_invariants(&store);
        assert_closed_system(&store);
        assert_eq!(saved.lock().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_happens_after_recompute() -> anyhow::Result<()> {
        let mut sequence = Sequence::new();
        let mut storage = MockWorklogStorage::new();
        storage
            .expect_load()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(None));
        storage
            .expect_save()
            .times(1)
            .in_sequence(&mut sequence)
            .withf(|rows: &[DayRowEntity]| {
                let monday = &rows[1];
                rows.len() == 7
                    && monday.date == NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
                    && monday.hours_worked == 4.
                    && monday.to_earn == 0.
            })
            .returning(|_| Ok(()));
        let mut store = WorklogStore::open(week_config(), storage).await?;

        store.log_day(date(15), LogMode::Backfill).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_log_non_working_day() -> anyhow::Result<()> {
        let mut storage = empty_storage();
        storage.expect_save().never();
        let mut store = WorklogStore::open(week_config(), storage).await?;
        let before = store.records().to_vec();

        for mode in [LogMode::Today, LogMode::Backfill] {
            let result = store.log_day(date(17), mode).await?;
            assert_eq!(result, LogResult::Skipped(SkipReason::NonWorkingDay));
        }

        assert_eq!(store.records(), before.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_backfill_already_logged() -> anyhow::Result<()> {
        let (storage, saved) = recording_storage();
        let mut store = WorklogStore::open(week_config(), storage).await?;
        store.log_day(date(16), LogMode::Backfill).await?;
        let before = store.records().to_vec();

        let result = store.log_day(date(16), LogMode::Backfill).await?;

        assert_eq!(result, LogResult::Skipped(SkipReason::AlreadyLogged));
        assert_eq!(store.records(), before.as_slice());
        assert_eq!(saved.lock().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_today_twice_reassigns_quota() -> anyhow::Result<()> {
        let (storage, saved) = recording_storage();
        let mut store = WorklogStore::open(week_config(), storage).await?;

        store.log_day(date(18), LogMode::Today).await?;
        let result = store.log_day(date(18), LogMode::Today).await?;

        assert!(matches!(result, LogResult::Logged { hours, .. } if hours == 4.));
        assert_eq!(store.record(date(18)).unwrap().hours_worked(), 4.);
        assert_eq!(saved.lock().unwrap().len(), 2);
        assert_invariants(&store);
        Ok(())
    }

    #[tokio::test]
    async fn test_strict_today_reports_already_logged() -> anyhow::Result<()> {
        let (storage, saved) = recording_storage();
        let config = WorklogConfig {
            strict_today: true,
            ..week_config()
        };
        let mut store = WorklogStore::open(config, storage).await?;

        store.log_day(date(18), LogMode::Today).await?;
        let result = store.log_day(date(18), LogMode::Today).await?;

        assert_eq!(result, LogResult::Skipped(SkipReason::AlreadyLogged));
        assert_eq!(saved.lock().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range() -> anyhow::Result<()> {
        let mut storage = empty_storage();
        storage.expect_save().never();
        let mut store = WorklogStore::open(week_config(), storage).await?;
        let before = store.records().to_vec();

        let logged = store.log_day(date(21), LogMode::Backfill).await;
        let removed = store.remove_log(date(13)).await;

        assert!(matches!(
            logged,
            Err(WorklogError::OutOfRange { date: d, .. }) if d == date(21)
        ));
        assert!(matches!(removed, Err(WorklogError::OutOfRange { .. })));
        assert_eq!(store.records(), before.as_slice());
        assert!(store.record(date(21)).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_unlogged_day() -> anyhow::Result<()> {
        let mut storage = empty_storage();
        storage.expect_save().never();
        let mut store = WorklogStore::open(week_config(), storage).await?;

        assert_eq!(store.remove_log(date(15)).await?, RemoveResult::NoOp);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_logged_day() -> anyhow::Result<()> {
        let (storage, saved) = recording_storage();
        let mut store = WorklogStore::open(week_config(), storage).await?;
        store.log_day(date(19), LogMode::Backfill).await?;

        let result = store.remove_log(date(19)).await?;

        assert_eq!(result, RemoveResult::Removed);
        let friday = store.record(date(19)).unwrap();
        assert_eq!(friday.hours_worked(), 0.);
        assert_eq!(friday.earned(), 0.);
        assert_close(friday.to_earn(), 49.92);
        assert_invariants(&store);
        assert_closed_system(&store);

        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1][5].hours_worked, 0.);
        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() -> anyhow::Result<()> {
        let (storage, _) = recording_storage();
        let mut store = WorklogStore::open(week_config(), storage).await?;
        store.log_day(date(15), LogMode::Backfill).await?;
        store.log_day(date(20), LogMode::Backfill).await?;

        store.recompute();
        let once = store.records().to_vec();
        store.recompute();

        assert_eq!(store.records(), once.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_closed_system_through_mutations() -> anyhow::Result<()> {
        let (storage, _) = recording_storage();
        let mut store = WorklogStore::open(WorklogConfig::default(), storage).await?;
        assert_closed_system(&store);

        for day in 14..=30 {
            store.log_day(date(day), LogMode::Backfill).await?;
            assert_closed_system(&store);
        }
        for day in (14..=30).step_by(3) {
            store.remove_log(date(day)).await?;
            assert_closed_system(&store);
            assert_invariants(&store);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_save_keeps_table_consistent() -> anyhow::Result<()> {
        let mut storage = empty_storage();
        storage
            .expect_save()
            .returning(|_| Err(anyhow!("disk is full")));
        let mut store = WorklogStore::open(week_config(), storage).await?;

        let result = store.log_day(date(15), LogMode::Today).await;

        assert!(matches!(result, Err(WorklogError::Storage(_))));
        assert_invariants(&store);
        assert_eq!(store.record(date(15)).unwrap().to_earn(), 0.);
        Ok(())
    }

    fn stored_row(day: u32, hours: f64, rate: f64) -> DayRowEntity {
        DayRowEntity {
            date: date(day),
            day: "whatever".into(),
            hours_worked: hours,
            hourly_rate: rate,
            earned: 999.,
            to_earn: 999.,
        }
    }

    fn storage_with(rows: Vec<DayRowEntity>) -> MockWorklogStorage {
        let mut storage = MockWorklogStorage::new();
        storage
            .expect_load()
            .returning(move || Ok(Some(rows.clone())));
        storage
    }

    #[tokio::test]
    async fn test_open_reconciles_stored_rows() -> anyhow::Result<()> {
        let rows = vec![
            stored_row(12, 4., 12.48),
            stored_row(15, 4., 12.48),
            stored_row(16, 2., 10.),
            // Sunday, hours get dropped.
            stored_row(14, 4., 12.48),
        ];
        let store = WorklogStore::open(week_config(), storage_with(rows)).await?;

        assert_invariants(&store);
        assert_eq!(store.record(date(15)).unwrap().hours_worked(), 4.);
        let tuesday = store.record(date(16)).unwrap();
        assert_eq!(tuesday.hours_worked(), 2.);
        assert_close(tuesday.earned(), 24.96);
        assert_close(tuesday.to_earn(), 24.96);
        assert_eq!(store.record(date(14)).unwrap().hours_worked(), 0.);
        // Missing days are filled in.
        assert_eq!(store.record(date(20)).unwrap().hours_worked(), 0.);
        assert_closed_system(&store);
        Ok(())
    }

    #[tokio::test]
    async fn test_open_rejects_duplicates_and_negative_hours() {
        let duplicates = vec![stored_row(15, 4., 12.48), stored_row(15, 0., 12.48)];
        let negative = vec![stored_row(15, -4., 12.48)];

        let duplicates = WorklogStore::open(week_config(), storage_with(duplicates)).await;
        let negative = WorklogStore::open(week_config(), storage_with(negative)).await;

        assert!(matches!(duplicates, Err(WorklogError::Corrupt(_))));
        assert!(matches!(negative, Err(WorklogError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_config() {
        let mut storage = MockWorklogStorage::new();
        storage.expect_load().never();
        let config = WorklogConfig {
            hourly_rate: -1.,
            ..week_config()
        };

        let result = WorklogStore::open(config, storage).await;

        assert!(matches!(result, Err(WorklogError::InvalidConfig(_))));
    }
}
