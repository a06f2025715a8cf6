use crate::coerce::rows_to_table;
use crate::error::Result;
use crate::types::{CategoryTotalRow, FilteredView, Marker, MarkerRow, Totals};
use crate::util::format_int;
use serde::Serialize;
use serde_json::{json, Value};
use tabled::{settings::Style, Table, Tabled};

/// Write the records of a view as CSV with canonical headers.
pub fn write_view_csv(path: &str, view: &FilteredView<'_>, extra_columns: &[String]) -> Result<()> {
    let table = rows_to_table(view.iter(), view.columns, extra_columns);
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markers as a GeoJSON FeatureCollection of points (`[lon, lat]` order).
pub fn markers_geojson(markers: &[Marker]) -> Value {
    let features: Vec<Value> = markers
        .iter()
        .map(|m| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [m.lon, m.lat] },
                "properties": {
                    "nama_pasar": m.market_name,
                    "kecamatan": m.sub_district,
                    "alamat": m.address,
                    "tahun_tera": m.calibration_year,
                    "jenis_uttp": m.instrument_breakdown,
                    "status": m.class,
                    "color": m.color,
                },
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

pub fn category_rows(totals: &Totals) -> Vec<CategoryTotalRow> {
    totals
        .by_category
        .iter()
        .map(|(kind, total)| CategoryTotalRow {
            label: kind.label().to_string(),
            total: format_int(*total),
        })
        .chain(std::iter::once(CategoryTotalRow {
            label: "Total".to_string(),
            total: format_int(totals.grand_total),
        }))
        .collect()
}

pub fn marker_rows(markers: &[Marker]) -> Vec<MarkerRow> {
    markers
        .iter()
        .map(|m| MarkerRow {
            market_name: m.market_name.clone(),
            sub_district: m.sub_district.clone(),
            calibration_year: if m.calibration_year == 0 {
                "-".to_string()
            } else {
                m.calibration_year.to_string()
            },
            status: m.class.as_str().to_string(),
            coordinates: format!("{:.5}, {:.5}", m.lat, m.lon),
        })
        .collect()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{aggregate, markers};
    use crate::sample::sample_records;

    #[test]
    fn geojson_points_are_lon_lat() {
        let set = sample_records();
        let m = markers(&set.view(), 2025);
        let doc = markers_geojson(&m);
        assert_eq!(doc["features"].as_array().unwrap().len(), 5);
        let first = &doc["features"][0];
        assert_eq!(first["geometry"]["coordinates"][0].as_f64(), Some(106.5071));
        assert_eq!(first["geometry"]["coordinates"][1].as_f64(), Some(-6.2265));
        assert_eq!(first["properties"]["status"], "due-soon");
    }

    #[test]
    fn category_rows_end_with_total() {
        let set = sample_records();
        let rows = category_rows(&aggregate(&set.view()));
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].label, "Timbangan Pegas");
        assert_eq!(rows[6].label, "Total");
        assert_eq!(rows[6].total, "116");
    }

    #[test]
    fn view_csv_round_trips_through_loader() {
        let set = sample_records();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let path = path.to_str().unwrap();
        write_view_csv(path, &set.view(), &set.extra_columns).unwrap();
        let reloaded = crate::loader::load_uncached(std::path::Path::new(path));
        assert!(reloaded.diagnostic.is_none());
        assert_eq!(*reloaded.records, set);
    }
}
