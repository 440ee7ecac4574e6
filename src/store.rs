//! # Dataset Store Module
//!
//! Persists crawled records as a flat CSV dataset and reads it back for the
//! analysis pass. Records are deduplicated on write: two records are duplicates
//! when all five fields are equal, and only the first occurrence is kept.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::crawler::ProductRecord;
use crate::error::Error as CrateError;

/// Column headers of the persisted dataset, in order
pub const HEADERS: [&str; 5] = ["Product Name", "Price", "Supplier", "Location", "Category"];

/// Default dataset location
pub const DEFAULT_DATASET_PATH: &str = "data/raw_data.csv";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for CrateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => CrateError::Io(e),
            _ => CrateError::Store(err.to_string()),
        }
    }
}

type Result<T> = std::result::Result<T, StoreError>;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the CSV dataset
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATASET_PATH),
        }
    }
}

/// Reads and writes the flat product dataset
#[derive(Debug, Clone)]
pub struct RecordStore {
    config: StoreConfig,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// Create a store at the default dataset path
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
        }
    }

    /// Create a store with custom configuration
    pub fn with_config(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Path of the dataset
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Deduplicate `records` and write them, returning the number of rows written.
    ///
    /// Missing parent directories are created. An existing file is replaced.
    #[instrument(skip(self, records), fields(path = %self.config.path.display()))]
    pub fn persist(&self, records: &[ProductRecord]) -> Result<usize> {
        let path = &self.config.path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let unique = dedup_records(records);
        debug!(
            "Dropped {} duplicate records",
            records.len() - unique.len()
        );

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(HEADERS)?;
        for record in &unique {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("Saved {} records to {}", unique.len(), path.display());
        Ok(unique.len())
    }

    /// Load every row of the dataset
    #[instrument(skip(self), fields(path = %self.config.path.display()))]
    pub fn load(&self) -> Result<Vec<ProductRecord>> {
        let path = &self.config.path;
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(path.display().to_string()),
            _ => StoreError::Io(e),
        })?;

        let mut reader = csv::Reader::from_reader(file);
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<ProductRecord>, _>>()?;
        debug!("Loaded {} records", records.len());
        Ok(records)
    }
}

/// Keep the first occurrence of each distinct record, preserving order
pub fn dedup_records(records: &[ProductRecord]) -> Vec<&ProductRecord> {
    let mut seen = HashSet::new();
    records.iter().filter(|record| seen.insert(*record)).collect()
}

/// Persist `records` to `path` with a default-configured store
pub fn persist(records: &[ProductRecord], path: impl Into<PathBuf>) -> Result<usize> {
    RecordStore::with_config(StoreConfig { path: path.into() }).persist(records)
}
