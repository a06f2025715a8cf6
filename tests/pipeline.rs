use pasar_tera::loader::{invalidate, load_uncached};
use pasar_tera::util::is_sentinel;
use pasar_tera::{
    aggregate, apply_filter, clean_categories, default_year_range, load_records, marker_class,
    CategoryField, FilterSelection, InstrumentKind, MarkerClass, Selection,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn write_csv(content: &[u8]) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(content).unwrap();
    f.flush().unwrap();
    f
}

const EXPORT: &str = "\u{feff}Nama Pasar;Kecamatan;Alamat;Koordinat;Tahun Tera;Timbangan Pegas;Timbangan Elektronik\n\
Pasar Cikupa;Cikupa;Jl. Raya Serang;-6.26435, 106.42592;2024;10;5\n\
Pasar Bitung;Cikupa;Jl. Bitung Jaya;106.42592, -6.26435;2023;3;\n\
Pasar Curug;Curug;;rusak;;x;7\n\
Pasar Lama;N/A;-;;2022.0;;\n";

#[test]
fn missing_file_falls_back_to_sample() {
    let outcome = load_records("/nonexistent/dir/data_pasar_tera.csv");
    assert_eq!(outcome.records.len(), 5);
    assert!(outcome.diagnostic.is_some());
}

#[test]
fn semicolon_export_is_normalized() {
    let f = write_csv(EXPORT.as_bytes());
    let outcome = load_uncached(f.path());
    assert!(outcome.diagnostic.is_none());
    let set = &outcome.records;
    assert_eq!(set.len(), 4);

    let cikupa = &set.records[0];
    let c = cikupa.coordinates.unwrap();
    assert_eq!((c.lat, c.lon), (-6.26435, 106.42592));
    assert_eq!(cikupa.calibration_year, 2024);
    assert_eq!(cikupa.instrument_breakdown, "Timbangan Pegas: 10; Timbangan Elektronik: 5");

    let bitung = set.records[1].coordinates.unwrap();
    assert_eq!((bitung.lat, bitung.lon), (-6.26435, 106.42592));

    let curug = &set.records[2];
    assert_eq!(curug.coordinates, None);
    assert_eq!(curug.calibration_year, 0);
    assert_eq!(curug.address, "");

    let lama = &set.records[3];
    assert_eq!(lama.sub_district, "");
    assert_eq!(lama.address, "");
    assert_eq!(lama.calibration_year, 2022);
    assert_eq!(lama.instrument_breakdown, "Tidak ada data");
}

#[test]
fn quote_wrapped_export_is_repaired() {
    let content = "\"nama_pasar,kecamatan,koordinat,tahun_tera\"\n\
\"Pasar Cikupa,Cikupa,\"\"-6.2265, 106.5071\"\",2024\"\n\
\"Pasar Curug,Curug,\"\"-6.2650, 106.5560\"\",2023\"\n";
    let f = write_csv(content.as_bytes());
    let outcome = load_uncached(f.path());
    assert!(outcome.diagnostic.is_none());
    assert_eq!(outcome.records.len(), 2);
    let c = outcome.records.records[1].coordinates.unwrap();
    assert_eq!((c.lat, c.lon), (-6.2650, 106.5560));
    assert_eq!(outcome.records.records[1].sub_district, "Curug");
}

#[test]
fn invalid_utf8_is_dropped_not_fatal() {
    let mut bytes = b"nama_pasar,kecamatan\nPasar Cik".to_vec();
    bytes.push(0xff);
    bytes.extend_from_slice(b"upa,Cikupa\n");
    let f = write_csv(&bytes);
    let outcome = load_uncached(f.path());
    assert!(outcome.diagnostic.is_none());
    assert_eq!(outcome.records.records[0].market_name, "Pasar Cikupa");
}

#[test]
fn loads_are_memoized_per_path() {
    let f = write_csv(EXPORT.as_bytes());
    let first = load_records(f.path());
    let second = load_records(f.path());
    assert!(Arc::ptr_eq(&first.records, &second.records));

    assert!(invalidate(f.path()));
    let third = load_records(f.path());
    assert!(!Arc::ptr_eq(&first.records, &third.records));
    assert_eq!(first.records, third.records);
}

#[test]
fn sub_district_filter_matches_stored_value() {
    let f = write_csv(EXPORT.as_bytes());
    let outcome = load_uncached(f.path());
    let selection = FilterSelection {
        year_range: (0, 3000),
        sub_district: Selection::parse("Cikupa"),
        market_name: Selection::parse("ALL"),
    };
    let view = apply_filter(&outcome.records, &selection);
    let names: Vec<&str> = view.iter().map(|r| r.market_name.as_str()).collect();
    assert_eq!(names, vec!["Pasar Cikupa", "Pasar Bitung"]);

    let totals = aggregate(&view);
    assert_eq!(totals.get(InstrumentKind::Spring), 13);
    assert_eq!(totals.get(InstrumentKind::Electronic), 5);
    assert_eq!(totals.get(InstrumentKind::Balance), 0);
    // No total column in this export.
    assert_eq!(totals.grand_total, 18);
}

#[test]
fn cleaned_categories_hold_no_sentinels() {
    let f = write_csv(EXPORT.as_bytes());
    let outcome = load_uncached(f.path());
    let subs = clean_categories(&outcome.records.records, CategoryField::SubDistrict);
    assert_eq!(subs, vec!["Cikupa", "Curug"]);
    assert!(subs.iter().all(|s| !is_sentinel(s)));
}

#[test]
fn calibration_two_years_back_is_overdue() {
    assert_eq!(marker_class(2023, 2025), MarkerClass::Overdue);
}

#[test]
fn header_only_file_is_empty_not_fallback() {
    let f = write_csv(b"nama_pasar,kecamatan\n");
    let outcome = load_uncached(Path::new(f.path()));
    assert!(outcome.diagnostic.is_none());
    assert!(outcome.records.is_empty());
}

#[test]
fn export_without_instrument_columns_reads_as_no_data() {
    let f = write_csv(b"nama_pasar,kecamatan\nPasar Cikupa,Cikupa\n");
    let outcome = load_uncached(f.path());
    assert!(outcome.diagnostic.is_none());
    assert_eq!(outcome.records.records[0].instrument_breakdown, "Tidak ada data");
}

#[test]
fn default_selection_keeps_unknown_years() {
    let f = write_csv(EXPORT.as_bytes());
    let outcome = load_uncached(f.path());
    let selection = FilterSelection::all(default_year_range(&outcome.records));
    let view = apply_filter(&outcome.records, &selection);
    assert_eq!(view.len(), 4);
    assert!(view.iter().any(|r| r.market_name == "Pasar Curug" && r.calibration_year == 0));
}
