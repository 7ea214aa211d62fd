use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::fs::operations::{overwrite_locked, read_locked};

use super::entities::DayRowEntity;

/// Interface for abstracting storage of the ledger. The table is always read and written as a
/// whole; there is no appending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorklogStorage: Send + Sync {
    /// Returns every stored row, or `None` when nothing was ever saved.
    async fn load(&self) -> Result<Option<Vec<DayRowEntity>>>;

    /// Replaces everything stored with `rows`.
    async fn save(&self, rows: &[DayRowEntity]) -> Result<()>;
}

/// The main realization of [WorklogStorage], a single csv file.
pub struct CsvWorklogStorage {
    path: PathBuf,
}

impl CsvWorklogStorage {
    pub fn new(path: PathBuf) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WorklogStorage for CsvWorklogStorage {
    async fn load(&self) -> Result<Option<Vec<DayRowEntity>>> {
        debug!("Loading worklog from {:?}", self.path);
        let Some(contents) = read_locked(&self.path)
            .await
            .with_context(|| format!("Failed to read {:?}", self.path))?
        else {
            return Ok(None);
        };

        let rows = parse_rows(&contents).with_context(|| format!("Failed to parse {:?}", self.path))?;
        debug!("Loaded {} rows", rows.len());
        Ok(Some(rows))
    }

    async fn save(&self, rows: &[DayRowEntity]) -> Result<()> {
        let contents = serialize_rows(rows)?;
        overwrite_locked(&self.path, &contents)
            .await
            .with_context(|| format!("Failed to write {:?}", self.path))?;
        debug!("Saved {} rows into {:?}", rows.len(), self.path);
        Ok(())
    }
}

fn parse_rows(contents: &[u8]) -> Result<Vec<DayRowEntity>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents);

    let rows = reader
        .deserialize::<DayRowEntity>()
        .enumerate()
        // Line 1 is the header.
        .map(|(index, row)| row.with_context(|| format!("Illegal row on line {}", index + 2)))
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}

fn serialize_rows(rows: &[DayRowEntity]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush csv buffer {}", e.error()))
}
