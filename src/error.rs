//! Error type for the fallible edges of the pipeline (file reads, CSV and
//! GeoJSON parsing). Public pipeline operations recover from these locally.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file decoded fine but held no header row.
    #[error("table is empty")]
    EmptyTable,

    #[error("could not detect delimiter: {0}")]
    Delimiter(String),
}
