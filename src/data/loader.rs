//! CSV Data Loader Module
//! Parses the population dataset and loads it on a background thread.

use crate::data::record::{parse_metric, PopulationRecord};
use polars::prelude::{CsvReadOptions, DataFrame, PolarsError, SerReader};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A failed read is retried once.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(250);

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),
}

impl LoaderError {
    fn is_retryable(&self) -> bool {
        matches!(self, LoaderError::Io { .. })
    }
}

/// Why a data row was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowErrorKind {
    #[error("expected at least {needed} columns, found {found}")]
    TooFewColumns { needed: usize, found: usize },
    #[error("{field} is missing")]
    MissingField { field: &'static str },
    #[error("{field} is not a finite number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// A skipped row, with its 1-based line number in the source text.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {kind}")]
pub struct RowError {
    pub line: usize,
    pub kind: RowErrorKind,
}

/// How data columns are located within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnLayout {
    /// `country, [code,] year, population, density, growthRate`, with the
    /// optional code column detected per row from the width of column 1.
    #[default]
    Positional,
    /// Columns resolved by header name.
    Header,
}

/// Output of a parse: accepted records plus the rows that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCsv {
    pub records: Vec<PopulationRecord>,
    pub skipped: Vec<RowError>,
}

/// Parse CSV text into population records.
pub fn parse_population_csv(text: &str, layout: ColumnLayout) -> Result<ParsedCsv, LoaderError> {
    let parsed = match layout {
        ColumnLayout::Positional => parse_positional(text),
        ColumnLayout::Header => parse_with_header(text)?,
    };

    for row in &parsed.skipped {
        warn!("Skipping malformed row: {}", row);
    }
    debug!(
        records = parsed.records.len(),
        skipped = parsed.skipped.len(),
        "Parsed population CSV"
    );
    Ok(parsed)
}

/// Read a CSV file from disk and parse it.
pub fn read_population_csv(path: &Path, layout: ColumnLayout) -> Result<ParsedCsv, LoaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_population_csv(&text, layout)
}

fn parse_positional(text: &str) -> ParsedCsv {
    // Header is line 1; data rows keep their file line numbers.
    let rows: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line))
        .collect();

    let results: Vec<Result<PopulationRecord, RowError>> = rows
        .par_iter()
        .map(|&(line, row)| parse_positional_row(line, row))
        .collect();

    let mut parsed = ParsedCsv::default();
    for result in results {
        match result {
            Ok(record) => parsed.records.push(record),
            Err(err) => parsed.skipped.push(err),
        }
    }
    parsed
}

fn parse_positional_row(line: usize, row: &str) -> Result<PopulationRecord, RowError> {
    let columns: Vec<&str> = row.split(',').collect();
    let too_few = |needed: usize| RowError {
        line,
        kind: RowErrorKind::TooFewColumns {
            needed,
            found: columns.len(),
        },
    };

    if columns.len() < 2 {
        return Err(too_few(5));
    }

    // A 4-character second column is the year; otherwise it is a code column.
    let offset = if columns[1].chars().count() == 4 { 1 } else { 2 };
    if columns.len() < offset + 4 {
        return Err(too_few(offset + 4));
    }

    build_record(
        line,
        columns[0],
        columns[offset],
        columns[offset + 1],
        columns[offset + 2],
        columns[offset + 3],
    )
}

fn build_record(
    line: usize,
    country: &str,
    year: &str,
    population: &str,
    density: &str,
    growth_rate: &str,
) -> Result<PopulationRecord, RowError> {
    for (field, value) in [
        ("population", population),
        ("density", density),
        ("growthRate", growth_rate),
    ] {
        if parse_metric(value).is_none() {
            return Err(RowError {
                line,
                kind: RowErrorKind::InvalidNumber {
                    field,
                    value: value.to_string(),
                },
            });
        }
    }

    Ok(PopulationRecord {
        country: country.to_string(),
        year: year.to_string(),
        population: population.to_string(),
        density: density.to_string(),
        growth_rate: growth_rate.to_string(),
    })
}

const HEADER_FIELDS: [&str; 5] = ["country", "year", "population", "density", "growthRate"];

fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_column(df: &DataFrame, wanted: &'static str) -> Result<String, LoaderError> {
    let target = normalize_header(wanted);
    df.get_column_names()
        .iter()
        .find(|name| normalize_header(name.as_str()) == target)
        .map(|name| name.to_string())
        .ok_or(LoaderError::MissingColumn(wanted))
}

fn parse_with_header(text: &str) -> Result<ParsedCsv, LoaderError> {
    // Schema inference disabled: every column is read as a string so that
    // metric text reaches the record unchanged.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()?;

    let mut names = Vec::with_capacity(HEADER_FIELDS.len());
    for field in HEADER_FIELDS {
        names.push(find_column(&df, field)?);
    }
    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        columns.push(df.column(name)?.as_materialized_series().str()?);
    }

    let mut parsed = ParsedCsv::default();
    for i in 0..df.height() {
        let line = i + 2;
        // Polars keeps blank lines as all-null rows.
        if columns
            .iter()
            .all(|column| column.get(i).map_or(true, str::is_empty))
        {
            continue;
        }

        let mut fields = [""; 5];
        let mut missing = None;
        for (slot, (column, field)) in fields.iter_mut().zip(columns.iter().zip(HEADER_FIELDS)) {
            match column.get(i) {
                Some(value) => *slot = value,
                None => {
                    missing = Some(field);
                    break;
                }
            }
        }

        if let Some(field) = missing {
            parsed.skipped.push(RowError {
                line,
                kind: RowErrorKind::MissingField { field },
            });
            continue;
        }

        match build_record(line, fields[0], fields[1], fields[2], fields[3], fields[4]) {
            Ok(record) => parsed.records.push(record),
            Err(err) => parsed.skipped.push(err),
        }
    }
    Ok(parsed)
}

/// Messages sent from the loader thread to the UI.
#[derive(Debug)]
pub enum LoadMessage {
    Retrying { attempt: u32, error: String },
    Complete(ParsedCsv),
    Failed(String),
}

/// Receiving end of a background load.
///
/// Dropping the handle cancels the load: the worker checks the flag before
/// every send and discards its result once cancelled.
pub struct LoadHandle {
    generation: u64,
    rx: Receiver<LoadMessage>,
    cancelled: Arc<AtomicBool>,
}

impl LoadHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Drain every message that has arrived so far without blocking.
    pub fn poll(&self) -> Vec<LoadMessage> {
        self.rx.try_iter().collect()
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadMessage> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawns background loads and numbers them.
pub struct DataLoader {
    layout: ColumnLayout,
    file_path: Option<PathBuf>,
    next_generation: u64,
}

impl DataLoader {
    pub fn new(layout: ColumnLayout) -> Self {
        Self {
            layout,
            file_path: None,
            next_generation: 0,
        }
    }

    /// Get file path of the most recent load.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Start loading `path` on a background thread.
    pub fn spawn(&mut self, path: PathBuf) -> LoadHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.file_path = Some(path.clone());

        let (tx, rx) = channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);
        let layout = self.layout;

        info!(generation, path = %path.display(), "Loading population CSV");
        thread::spawn(move || Self::run_load(&path, layout, &tx, &worker_cancelled));

        LoadHandle {
            generation,
            rx,
            cancelled,
        }
    }

    fn run_load(path: &Path, layout: ColumnLayout, tx: &Sender<LoadMessage>, cancelled: &AtomicBool) {
        let deliver = |message: LoadMessage| {
            if cancelled.load(Ordering::Acquire) {
                debug!("Load cancelled, dropping {:?}", message);
                return;
            }
            let _ = tx.send(message);
        };

        let mut attempt = 1;
        let result = loop {
            match read_population_csv(path, layout) {
                Ok(parsed) => break Ok(parsed),
                Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                    warn!(attempt, "Load failed, retrying: {}", err);
                    deliver(LoadMessage::Retrying {
                        attempt,
                        error: err.to_string(),
                    });
                    thread::sleep(RETRY_DELAY);
                    if cancelled.load(Ordering::Acquire) {
                        return;
                    }
                    attempt += 1;
                }
                Err(err) => break Err(err),
            }
        };

        match result {
            Ok(parsed) => {
                info!(
                    records = parsed.records.len(),
                    skipped = parsed.skipped.len(),
                    "Population CSV loaded"
                );
                deliver(LoadMessage::Complete(parsed));
            }
            Err(err) => {
                warn!("Load failed: {}", err);
                deliver(LoadMessage::Failed(err.to_string()));
            }
        }
    }
}
