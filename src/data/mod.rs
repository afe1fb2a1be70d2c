//! Data module - CSV loading and record helpers

mod loader;
mod record;

pub use loader::{
    ColumnLayout, DataLoader, LoadHandle, LoadMessage, ParsedCsv, RowError, RowErrorKind,
};
pub use record::{distinct_years, records_for_year, PopulationRecord};
