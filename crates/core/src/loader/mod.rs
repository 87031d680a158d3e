//! Turns the catalogue's CSV files into linked domain entities.

mod csv_reader;
mod types;

pub use csv_reader::CsvDataReader;
pub use types::*;
