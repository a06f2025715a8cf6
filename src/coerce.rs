//! The one place where loosely typed cells become typed record fields.
//!
//! Runs once, right after schema normalization. Every field gets a defined
//! default, so nothing downstream has to handle missing values itself.

use crate::schema::{
    COL_ADDRESS, COL_BREAKDOWN, COL_COORDINATE, COL_LATITUDE, COL_LONGITUDE, COL_MARKET,
    COL_SUB_DISTRICT, COL_TOTAL, COL_YEAR,
};
use crate::types::{
    ColumnPresence, Coordinate, InstrumentCounts, InstrumentKind, MarketRecord, RawTable,
    RecordSet, NO_DATA,
};
use crate::util::{is_sentinel, parse_count, parse_f64_safe, parse_i64_safe};
use std::collections::{BTreeMap, HashSet};

/// Convert a normalized table into typed records.
///
/// - year and total: integers, 0 when missing or unparseable
/// - text fields: empty string when missing or a sentinel token
/// - instrument breakdown: the no-data text when no instrument columns exist
/// - coordinates: present only when both parts parse and form a valid pair
/// - instrument counts: non-negative integers, 0 otherwise
pub fn coerce(table: &RawTable) -> RecordSet {
    let col = |name: &str| table.column_index(name);
    let market = col(COL_MARKET);
    let sub_district = col(COL_SUB_DISTRICT);
    let address = col(COL_ADDRESS);
    let year = col(COL_YEAR);
    let total = col(COL_TOTAL);
    let breakdown = col(COL_BREAKDOWN);
    let lat = col(COL_LATITUDE);
    let lon = col(COL_LONGITUDE);
    let instruments: Vec<(InstrumentKind, usize)> = InstrumentKind::ALL
        .iter()
        .filter_map(|k| col(k.column()).map(|idx| (*k, idx)))
        .collect();

    let mut known: HashSet<usize> = [market, sub_district, address, year, total, breakdown, lat, lon]
        .into_iter()
        .flatten()
        .chain(instruments.iter().map(|(_, idx)| *idx))
        .collect();
    if let Some(idx) = col(COL_COORDINATE) {
        // Already expanded into latitude/longitude.
        known.insert(idx);
    }

    let mut seen = HashSet::new();
    let extra_columns: Vec<(usize, String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !known.contains(i) && seen.insert(h.as_str()))
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let records = (0..table.rows.len())
        .map(|r| {
            let cell = |idx: Option<usize>| idx.and_then(|c| table.cell(r, c));

            let coordinates = match (parse_f64_safe(cell(lat)), parse_f64_safe(cell(lon))) {
                (Some(la), Some(lo)) => Coordinate::new(la, lo),
                _ => None,
            };

            let mut counts = InstrumentCounts::default();
            for (kind, idx) in &instruments {
                counts.set(*kind, parse_count(cell(Some(*idx))));
            }

            let extra: BTreeMap<String, String> = extra_columns
                .iter()
                .map(|(idx, name)| (name.clone(), cell(Some(*idx)).unwrap_or_default().to_string()))
                .collect();

            MarketRecord {
                market_name: text(cell(market)),
                sub_district: text(cell(sub_district)),
                address: text(cell(address)),
                coordinates,
                calibration_year: parse_i64_safe(cell(year))
                    .and_then(|y| i32::try_from(y).ok())
                    .unwrap_or(0),
                instrument_total: parse_count(cell(total)),
                instrument_breakdown: match breakdown {
                    Some(_) => text(cell(breakdown)),
                    None => NO_DATA.to_string(),
                },
                instruments: counts,
                extra,
            }
        })
        .collect();

    RecordSet {
        records,
        columns: ColumnPresence {
            market_name: market.is_some(),
            sub_district: sub_district.is_some(),
            address: address.is_some(),
            calibration_year: year.is_some(),
            instrument_total: total.is_some(),
            coordinates: lat.is_some() && lon.is_some(),
            breakdown: breakdown.is_some(),
            instruments: instruments.iter().map(|(k, _)| *k).collect(),
        },
        extra_columns: extra_columns.into_iter().map(|(_, h)| h).collect(),
    }
}

fn text(cell: Option<&str>) -> String {
    match cell {
        Some(s) if !is_sentinel(s) => s.to_string(),
        _ => String::new(),
    }
}

/// Render a record set back into canonical columns. Only columns the source
/// carried are emitted, so `coerce(&to_table(&coerce(t)))` equals
/// `coerce(t)`.
pub fn to_table(set: &RecordSet) -> RawTable {
    rows_to_table(&set.records, &set.columns, &set.extra_columns)
}

/// Like [`to_table`] for any subset of a record set's rows, such as a
/// filtered view.
pub fn rows_to_table<'a>(
    records: impl IntoIterator<Item = &'a MarketRecord>,
    c: &ColumnPresence,
    extra_columns: &[String],
) -> RawTable {
    let mut headers: Vec<String> = Vec::new();
    let mut push = |on: bool, name: &str| {
        if on {
            headers.push(name.to_string());
        }
    };
    push(c.market_name, COL_MARKET);
    push(c.sub_district, COL_SUB_DISTRICT);
    push(c.address, COL_ADDRESS);
    push(c.coordinates, COL_LATITUDE);
    push(c.coordinates, COL_LONGITUDE);
    push(c.calibration_year, COL_YEAR);
    push(c.instrument_total, COL_TOTAL);
    push(c.breakdown, COL_BREAKDOWN);
    for kind in &InstrumentKind::ALL {
        push(c.has_instrument(*kind), kind.column());
    }
    headers.extend(extra_columns.iter().cloned());

    let rows = records
        .into_iter()
        .map(|rec| {
            let mut row = Vec::with_capacity(headers.len());
            if c.market_name {
                row.push(rec.market_name.clone());
            }
            if c.sub_district {
                row.push(rec.sub_district.clone());
            }
            if c.address {
                row.push(rec.address.clone());
            }
            if c.coordinates {
                match rec.coordinates {
                    Some(coord) => {
                        row.push(coord.lat.to_string());
                        row.push(coord.lon.to_string());
                    }
                    None => {
                        row.push(String::new());
                        row.push(String::new());
                    }
                }
            }
            if c.calibration_year {
                row.push(rec.calibration_year.to_string());
            }
            if c.instrument_total {
                row.push(rec.instrument_total.to_string());
            }
            if c.breakdown {
                row.push(rec.instrument_breakdown.clone());
            }
            for kind in &InstrumentKind::ALL {
                if c.has_instrument(*kind) {
                    row.push(rec.instruments.get(*kind).to_string());
                }
            }
            for name in extra_columns {
                row.push(rec.extra.get(name).cloned().unwrap_or_default());
            }
            row
        })
        .collect();

    RawTable { headers, rows }
}
