//! Core of the market scale re-calibration ("tera ulang") dashboard.
//!
//! Loads a messy CSV export of markets and their weighing instruments
//! (UTTP), normalizes it into typed [`MarketRecord`]s, and derives the
//! filter options, totals, KPIs and map markers the dashboard shows.
//!
//! ```no_run
//! use pasar_tera::{aggregate, apply_filter, load_records, FilterSelection};
//!
//! let outcome = load_records("data_pasar_tera.csv");
//! if let Some(notice) = &outcome.diagnostic {
//!     eprintln!("{notice}");
//! }
//! let view = apply_filter(&outcome.records, &FilterSelection::all((2020, 2025)));
//! println!("{} UTTP", aggregate(&view).grand_total);
//! ```

pub mod boundary;
pub mod cleaner;
pub mod coerce;
pub mod config;
pub mod coords;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod reports;
pub mod sample;
pub mod schema;
pub mod types;
pub mod util;

pub use boundary::BoundaryOverlay;
pub use cleaner::{clean_categories, market_options, CategoryField};
pub use config::Config;
pub use coords::{coordinate_of, parse_coordinate};
pub use error::{Error, Result};
pub use filter::{apply_filter, default_year_range, year_bounds};
pub use loader::load_records;
pub use reports::{aggregate, kpis, market_info, marker_class, markers};
pub use types::{
    FilterMode, FilterSelection, FilteredView, InstrumentKind, Kpis, LoadOutcome, MarkerClass,
    MarketRecord, RecordSet, Selection, Totals,
};
