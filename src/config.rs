//! Runtime configuration, resolved from environment variables with compiled
//! defaults.

use crate::reports::current_year;
use std::path::PathBuf;
use tracing::warn;

pub const DATA_PATH_ENV: &str = "TERA_DATA_PATH";
pub const BOUNDARY_PATH_ENV: &str = "TERA_BOUNDARY_PATH";
pub const CURRENT_YEAR_ENV: &str = "TERA_CURRENT_YEAR";

const DEFAULT_DATA_PATH: &str = "data_pasar_tera.csv";
const DEFAULT_BOUNDARY_PATH: &str = "batas_kecamatan.geojson";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub boundary_path: PathBuf,
    /// Reference year for marker classes.
    pub current_year: i32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        let current_year = match lookup(CURRENT_YEAR_ENV) {
            Some(raw) => raw.trim().parse::<i32>().unwrap_or_else(|_| {
                warn!("Ignoring invalid {}={:?}", CURRENT_YEAR_ENV, raw);
                current_year()
            }),
            None => current_year(),
        };

        Config {
            data_path: path(DATA_PATH_ENV, DEFAULT_DATA_PATH),
            boundary_path: path(BOUNDARY_PATH_ENV, DEFAULT_BOUNDARY_PATH),
            current_year,
        }
    }
}
