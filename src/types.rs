//! Data types shared across the pipeline, from the raw table through typed
//! market records to the rows shown on the dashboard.

use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// Breakdown text used when no instrument column holds a positive count.
pub const NO_DATA: &str = "Tidak ada data";

/// Prefix shared by the canonical instrument-count column names.
pub const INSTRUMENT_PREFIX: &str = "UTTP_";

/// Column-oriented view of a CSV export before coercion. Every row has
/// exactly `headers.len()` cells; an empty cell means "missing".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Index of `name`, appending an empty column when it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// The six weighing-instrument (UTTP) categories tracked per market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum InstrumentKind {
    Spring,
    Table,
    Electronic,
    Centesimal,
    SlidingWeight,
    Balance,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 6] = [
        InstrumentKind::Spring,
        InstrumentKind::Table,
        InstrumentKind::Electronic,
        InstrumentKind::Centesimal,
        InstrumentKind::SlidingWeight,
        InstrumentKind::Balance,
    ];

    /// Canonical column name after schema normalization.
    pub fn column(self) -> &'static str {
        match self {
            InstrumentKind::Spring => "UTTP_Timbangan Pegas",
            InstrumentKind::Table => "UTTP_Timbangan Meja",
            InstrumentKind::Electronic => "UTTP_Timbangan Elektronik",
            InstrumentKind::Centesimal => "UTTP_Timbangan Sentisimal",
            InstrumentKind::SlidingWeight => "UTTP_Dacin",
            InstrumentKind::Balance => "UTTP_Neraca",
        }
    }

    /// Display label: the column name without the instrument prefix.
    pub fn label(self) -> &'static str {
        let column = self.column();
        column.strip_prefix(INSTRUMENT_PREFIX).unwrap_or(column)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-category instrument counts of a single market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstrumentCounts([u64; 6]);

impl InstrumentCounts {
    pub fn get(&self, kind: InstrumentKind) -> u64 {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: InstrumentKind, count: u64) {
        self.0[kind.index()] = count;
    }

    pub fn sum(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// A validated geographic position. Only constructed through
/// [`Coordinate::new`], so latitude is always within ±90 and both parts
/// are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 {
            Some(Coordinate { lat, lon })
        } else {
            None
        }
    }
}

/// One market row after normalization and type coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRecord {
    pub market_name: String,
    pub sub_district: String,
    pub address: String,
    pub coordinates: Option<Coordinate>,
    /// 0 when the year is unknown.
    pub calibration_year: i32,
    pub instrument_total: u64,
    pub instrument_breakdown: String,
    pub instruments: InstrumentCounts,
    /// Source columns the schema does not know, keyed by header.
    pub extra: BTreeMap<String, String>,
}

/// Which canonical columns the source table actually carried. Features that
/// depend on an absent column degrade instead of guessing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPresence {
    pub market_name: bool,
    pub sub_district: bool,
    pub address: bool,
    pub calibration_year: bool,
    pub instrument_total: bool,
    pub coordinates: bool,
    pub breakdown: bool,
    pub instruments: Vec<InstrumentKind>,
}

impl ColumnPresence {
    pub fn has_instrument(&self, kind: InstrumentKind) -> bool {
        self.instruments.contains(&kind)
    }
}

/// The full, typed record set of one loaded file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub records: Vec<MarketRecord>,
    pub columns: ColumnPresence,
    /// Pass-through headers in source order.
    pub extra_columns: Vec<String>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unfiltered view over every record.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView {
            records: self.records.iter().collect(),
            columns: &self.columns,
        }
    }
}

/// Result of [`crate::loader::load_records`]. `diagnostic` is set whenever
/// the sample data was substituted for the requested file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub records: std::sync::Arc<RecordSet>,
    pub diagnostic: Option<String>,
}

/// One side of a filter: everything, or one exact stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// `"ALL"` and the UI label `"(Semua)"` both select everything.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "ALL" | "(Semua)" | "" => Selection::All,
            other => Selection::Only(other.to_string()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

/// How the operator picks a market: through its sub-district first, or
/// straight from the full market list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Cascade,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    /// Inclusive on both ends.
    pub year_range: (i32, i32),
    pub sub_district: Selection,
    pub market_name: Selection,
}

impl FilterSelection {
    pub fn all(year_range: (i32, i32)) -> Self {
        FilterSelection {
            year_range,
            sub_district: Selection::All,
            market_name: Selection::All,
        }
    }

    /// Build a selection for the given mode. Direct mode ignores the
    /// sub-district pick.
    pub fn for_mode(
        mode: FilterMode,
        year_range: (i32, i32),
        sub_district: Selection,
        market_name: Selection,
    ) -> Self {
        let sub_district = match mode {
            FilterMode::Cascade => sub_district,
            FilterMode::Direct => Selection::All,
        };
        FilterSelection {
            year_range,
            sub_district,
            market_name,
        }
    }
}

/// Records of a [`RecordSet`] that satisfy a [`FilterSelection`].
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub records: Vec<&'a MarketRecord>,
    pub columns: &'a ColumnPresence,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a MarketRecord> + '_ {
        self.records.iter().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub by_category: Vec<(InstrumentKind, u64)>,
    pub grand_total: u64,
}

impl Totals {
    pub fn get(&self, kind: InstrumentKind) -> u64 {
        self.by_category
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub sub_district_count: usize,
    pub market_count: usize,
    pub latest_year: Option<i32>,
    pub instrument_total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerClass {
    Unknown,
    Current,
    DueSoon,
    Overdue,
}

impl MarkerClass {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerClass::Unknown => "unknown",
            MarkerClass::Current => "current",
            MarkerClass::DueSoon => "due-soon",
            MarkerClass::Overdue => "overdue",
        }
    }

    /// Marker color handed to the map renderer.
    pub fn color(self) -> &'static str {
        match self {
            MarkerClass::Unknown => "gray",
            MarkerClass::Current => "green",
            MarkerClass::DueSoon => "orange",
            MarkerClass::Overdue => "red",
        }
    }
}

/// Everything the map renderer needs for one pin and its popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub market_name: String,
    pub sub_district: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub calibration_year: i32,
    pub instrument_breakdown: String,
    pub class: MarkerClass,
    pub color: &'static str,
}

/// Info card for the market currently selected by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketInfo {
    pub market_name: String,
    pub sub_district: String,
    pub address: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryTotalRow {
    #[serde(rename = "JenisUTTP")]
    #[tabled(rename = "Jenis UTTP")]
    pub label: String,
    #[serde(rename = "Jumlah")]
    #[tabled(rename = "Jumlah")]
    pub total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MarkerRow {
    #[serde(rename = "NamaPasar")]
    #[tabled(rename = "Nama Pasar")]
    pub market_name: String,
    #[serde(rename = "Kecamatan")]
    #[tabled(rename = "Kecamatan")]
    pub sub_district: String,
    #[serde(rename = "TahunTera")]
    #[tabled(rename = "Tahun Tera")]
    pub calibration_year: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Koordinat")]
    #[tabled(rename = "Koordinat")]
    pub coordinates: String,
}
