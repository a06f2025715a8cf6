//! Header normalization for market exports.
//!
//! Exports reach us from several spreadsheet templates, each naming the same
//! fields differently. This module maps them onto one canonical header set in
//! a single pass and derives the coordinate and instrument-summary columns.
//! Later stages only ever look at canonical names.

use crate::coords::parse_coordinate;
use crate::types::{InstrumentKind, RawTable, NO_DATA};
use crate::util::parse_f64_safe;
use tracing::debug;

pub const COL_MARKET: &str = "nama_pasar";
pub const COL_SUB_DISTRICT: &str = "kecamatan";
pub const COL_ADDRESS: &str = "alamat";
pub const COL_COORDINATE: &str = "koordinat";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_YEAR: &str = "tahun_tera";
pub const COL_TOTAL: &str = "total_uttp";
pub const COL_BREAKDOWN: &str = "jenis_uttp";

/// Canonical name followed by the source headers known to mean it, in
/// priority order. Matching is case-insensitive on trimmed headers. The
/// canonical name always comes first so an already-normalized file is left
/// alone.
static COLUMN_ALIASES: &[(&str, &[&str])] = &[
    (COL_MARKET, &["nama_pasar", "Nama Pasar", "Pasar", "Nama Pasar Rakyat", "Market"]),
    (COL_SUB_DISTRICT, &["kecamatan", "Kecamatan Pasar", "Nama Kecamatan", "Kec", "Kec."]),
    (COL_ADDRESS, &["alamat", "Alamat Pasar", "Alamat Lengkap", "Lokasi"]),
    (COL_COORDINATE, &["koordinat", "Titik Koordinat", "Koordinat Pasar", "Lat Long", "LatLong"]),
    (COL_LATITUDE, &["latitude", "Lat", "Lintang"]),
    (COL_LONGITUDE, &["longitude", "Lon", "Long", "Lng", "Bujur"]),
    (COL_YEAR, &["tahun_tera", "Tahun Tera", "Tahun Tera Ulang", "Tahun Sidang Tera", "Tahun"]),
    (COL_TOTAL, &["total_uttp", "Jumlah UTTP", "Total UTTP", "Jumlah Timbangan"]),
    (COL_BREAKDOWN, &["jenis_uttp", "Jenis UTTP", "Rincian UTTP"]),
    ("UTTP_Timbangan Pegas", &["UTTP_Timbangan Pegas", "Timbangan Pegas", "TP"]),
    ("UTTP_Timbangan Meja", &["UTTP_Timbangan Meja", "Timbangan Meja", "TM"]),
    ("UTTP_Timbangan Elektronik", &["UTTP_Timbangan Elektronik", "Timbangan Elektronik", "TE"]),
    ("UTTP_Timbangan Sentisimal", &["UTTP_Timbangan Sentisimal", "Timbangan Sentisimal", "TS"]),
    ("UTTP_Dacin", &["UTTP_Dacin", "Dacin", "Dacin Logam", "UTTP_Dacin Logam"]),
    ("UTTP_Neraca", &["UTTP_Neraca", "Neraca", "Neraca Sama Lengan"]),
];

/// Run the full normalization pass: rename, then derive coordinates and the
/// instrument breakdown.
pub fn normalize(mut table: RawTable) -> RawTable {
    rename_columns(&mut table);
    derive_coordinates(&mut table);
    derive_breakdown(&mut table);
    table
}

/// Rename known headers to their canonical names. For each canonical field
/// only the first alias present is renamed; later aliases of the same field
/// and unknown headers are kept as they are.
pub fn rename_columns(table: &mut RawTable) {
    let mut renamed = vec![false; table.headers.len()];
    for (canonical, aliases) in COLUMN_ALIASES {
        let hit = aliases.iter().find_map(|alias| {
            table
                .headers
                .iter()
                .enumerate()
                .find(|(i, h)| !renamed[*i] && h.trim().eq_ignore_ascii_case(alias))
                .map(|(i, _)| i)
        });
        if let Some(idx) = hit {
            if table.headers[idx] != *canonical {
                debug!("renaming column {:?} -> {}", table.headers[idx], canonical);
            }
            table.headers[idx] = canonical.to_string();
            renamed[idx] = true;
        }
    }
}

/// Fill `latitude`/`longitude` from the `koordinat` column, if any. Rows
/// whose coordinate cell cannot be parsed get empty cells.
fn derive_coordinates(table: &mut RawTable) {
    let Some(src) = table.column_index(COL_COORDINATE) else {
        return;
    };
    let lat_idx = table.ensure_column(COL_LATITUDE);
    let lon_idx = table.ensure_column(COL_LONGITUDE);

    let mut failed = 0usize;
    for (line, row) in table.rows.iter_mut().enumerate() {
        let raw = row[src].clone();
        match parse_coordinate(Some(&raw)) {
            Some(c) => {
                row[lat_idx] = c.lat.to_string();
                row[lon_idx] = c.lon.to_string();
            }
            None => {
                if !raw.trim().is_empty() {
                    debug!("row {}: unparseable coordinate {:?}", line + 1, raw);
                    failed += 1;
                }
                row[lat_idx].clear();
                row[lon_idx].clear();
            }
        }
    }
    if failed > 0 {
        debug!("{} coordinate cells could not be parsed", failed);
    }
}

/// Build the `"Label: n; Label: n"` summary from whichever instrument
/// columns exist. Tables without any instrument column get no breakdown
/// column here; coercion supplies the no-data text for them.
fn derive_breakdown(table: &mut RawTable) {
    let present: Vec<(InstrumentKind, usize)> = InstrumentKind::ALL
        .iter()
        .filter_map(|k| table.column_index(k.column()).map(|idx| (*k, idx)))
        .collect();
    if present.is_empty() {
        return;
    }
    let out_idx = table.ensure_column(COL_BREAKDOWN);
    for row in &mut table.rows {
        let text = breakdown_text(present.iter().map(|(k, idx)| (*k, row[*idx].as_str())));
        row[out_idx] = text;
    }
}

/// Summary text for a set of `(kind, raw cell)` pairs. Cells that are not
/// positive numbers are left out.
pub fn breakdown_text<'a>(cells: impl IntoIterator<Item = (InstrumentKind, &'a str)>) -> String {
    let entries: Vec<String> = cells
        .into_iter()
        .filter_map(|(kind, cell)| {
            let v = parse_f64_safe(Some(cell))?;
            (v > 0.0).then(|| format!("{}: {}", kind.label(), v.trunc() as i64))
        })
        .collect();
    if entries.is_empty() {
        NO_DATA.to_string()
    } else {
        entries.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn legacy_headers_are_renamed_and_unknown_kept() {
        let mut t = table(&["Nama Pasar", "KECAMATAN", "Tahun Tera", "Catatan"], &[]);
        rename_columns(&mut t);
        assert_eq!(t.headers, vec!["nama_pasar", "kecamatan", "tahun_tera", "Catatan"]);
    }

    #[test]
    fn first_alias_wins_when_several_are_present() {
        let mut t = table(&["Pasar", "Nama Pasar"], &[]);
        rename_columns(&mut t);
        assert_eq!(t.headers, vec!["Pasar", "nama_pasar"]);
    }

    #[test]
    fn coordinates_are_derived_per_row() {
        let t = normalize(table(
            &["Titik Koordinat"],
            &[&["-6.26435, 106.42592"], &["106.42592, -6.26435"], &["rusak"]],
        ));
        let lat = t.column_index(COL_LATITUDE).unwrap();
        let lon = t.column_index(COL_LONGITUDE).unwrap();
        assert_eq!(t.rows[0][lat], "-6.26435");
        assert_eq!(t.rows[0][lon], "106.42592");
        assert_eq!(t.rows[1][lat], "-6.26435");
        assert_eq!(t.rows[1][lon], "106.42592");
        assert_eq!(t.rows[2][lat], "");
        assert_eq!(t.rows[2][lon], "");
    }

    #[test]
    fn breakdown_lists_positive_counts_only() {
        let t = normalize(table(
            &["Timbangan Pegas", "Timbangan Meja", "Dacin"],
            &[&["3", "0", "x"], &["", "abc", "-1"], &["2.0", "5", "1"]],
        ));
        let idx = t.column_index(COL_BREAKDOWN).unwrap();
        assert_eq!(t.rows[0][idx], "Timbangan Pegas: 3");
        assert_eq!(t.rows[1][idx], NO_DATA);
        assert_eq!(t.rows[2][idx], "Timbangan Pegas: 2; Timbangan Meja: 5; Dacin: 1");
    }

    #[test]
    fn no_instrument_columns_reads_as_no_data() {
        let t = normalize(table(&["nama_pasar"], &[&["Pasar Cikupa"]]));
        assert!(!t.has_column(COL_BREAKDOWN));
        let set = crate::coerce::coerce(&t);
        assert_eq!(set.records[0].instrument_breakdown, NO_DATA);
    }
}
