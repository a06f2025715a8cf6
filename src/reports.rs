//! Dashboard figures over a filtered view: instrument totals, KPI cards,
//! map markers and the selected market's info card.

use crate::cleaner::{clean_categories, CategoryField};
use crate::types::{
    FilteredView, InstrumentKind, Kpis, Marker, MarkerClass, MarketInfo, RecordSet, Selection,
    Totals,
};
use chrono::Datelike;

const ADDRESS_UNAVAILABLE: &str = "Alamat tidak tersedia";
const SUB_DISTRICT_UNAVAILABLE: &str = "–";

/// Per-category instrument sums over a view, plus the grand total.
///
/// Categories whose column the source lacked stay at 0. The grand total uses
/// the precomputed per-market total when the source carried one, otherwise
/// the sum of the six categories.
pub fn aggregate(view: &FilteredView<'_>) -> Totals {
    let by_category: Vec<(InstrumentKind, u64)> = InstrumentKind::ALL
        .iter()
        .map(|kind| {
            let sum: u64 = if view.columns.has_instrument(*kind) {
                view.iter().map(|r| r.instruments.get(*kind)).sum()
            } else {
                0
            };
            (*kind, sum)
        })
        .collect();

    let grand_total: u64 = if view.columns.instrument_total {
        view.iter().map(|r| r.instrument_total).sum()
    } else {
        by_category.iter().map(|(_, v)| *v).sum()
    };

    Totals {
        by_category,
        grand_total,
    }
}

/// KPI cards: distinct sub-districts and markets are counted over the whole
/// record set, the latest year and instrument count over the filtered view.
pub fn kpis(full: &RecordSet, view: &FilteredView<'_>) -> Kpis {
    Kpis {
        sub_district_count: clean_categories(&full.records, CategoryField::SubDistrict).len(),
        market_count: clean_categories(&full.records, CategoryField::MarketName).len(),
        latest_year: view
            .iter()
            .map(|r| r.calibration_year)
            .filter(|y| *y != 0)
            .max(),
        instrument_total: aggregate(view).grand_total,
    }
}

/// Calibration recency relative to `current_year`.
pub fn marker_class(year: i32, current_year: i32) -> MarkerClass {
    if year == 0 {
        MarkerClass::Unknown
    } else if year >= current_year {
        MarkerClass::Current
    } else if year == current_year.saturating_sub(1) {
        MarkerClass::DueSoon
    } else {
        MarkerClass::Overdue
    }
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// One marker per record that has a position; records without one are left
/// off the map.
pub fn markers(view: &FilteredView<'_>, current_year: i32) -> Vec<Marker> {
    view.iter()
        .filter_map(|r| {
            let c = r.coordinates?;
            let class = marker_class(r.calibration_year, current_year);
            Some(Marker {
                market_name: r.market_name.clone(),
                sub_district: r.sub_district.clone(),
                address: r.address.clone(),
                lat: c.lat,
                lon: c.lon,
                calibration_year: r.calibration_year,
                instrument_breakdown: r.instrument_breakdown.clone(),
                class,
                color: class.color(),
            })
        })
        .collect()
}

/// Info card for the selected market: the first record with exactly that
/// name. Nothing is shown while every market is selected.
pub fn market_info(set: &RecordSet, market: &Selection) -> Option<MarketInfo> {
    let Selection::Only(name) = market else {
        return None;
    };
    if !set.columns.market_name {
        return None;
    }
    let record = set.records.iter().find(|r| &r.market_name == name)?;
    Some(MarketInfo {
        market_name: record.market_name.clone(),
        sub_district: if set.columns.sub_district {
            record.sub_district.clone()
        } else {
            SUB_DISTRICT_UNAVAILABLE.to_string()
        },
        address: if set.columns.address {
            record.address.clone()
        } else {
            ADDRESS_UNAVAILABLE.to_string()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::apply_filter;
    use crate::sample::sample_records;
    use crate::types::FilterSelection;

    #[test]
    fn totals_use_dedicated_total_column() {
        let mut set = sample_records();
        set.records[0].instrument_total = 100;
        let totals = aggregate(&set.view());
        assert_eq!(totals.get(InstrumentKind::Spring), 12 + 6 + 4 + 9 + 5);
        assert_eq!(totals.grand_total, 100 + 21 + 17 + 26 + 14);
    }

    #[test]
    fn grand_total_is_category_sum_without_total_column() {
        let mut set = sample_records();
        set.columns.instrument_total = false;
        set.records[0].instrument_total = 100;
        let totals = aggregate(&set.view());
        let sum: u64 = totals.by_category.iter().map(|(_, v)| v).sum();
        assert_eq!(totals.grand_total, sum);
        assert_eq!(sum, 38 + 21 + 17 + 26 + 14);
    }

    #[test]
    fn absent_category_columns_total_zero() {
        let mut set = sample_records();
        set.columns.instruments.retain(|k| *k != InstrumentKind::Electronic);
        let totals = aggregate(&set.view());
        assert_eq!(totals.get(InstrumentKind::Electronic), 0);
        assert_eq!(totals.by_category.len(), 6);
    }

    #[test]
    fn kpis_mix_full_and_filtered_scopes() {
        let set = sample_records();
        let view = apply_filter(&set, &FilterSelection::all((2022, 2023)));
        let k = kpis(&set, &view);
        assert_eq!(k.sub_district_count, 5);
        assert_eq!(k.market_count, 5);
        assert_eq!(k.latest_year, Some(2023));
        assert_eq!(k.instrument_total, 21 + 26);

        let empty = apply_filter(&set, &FilterSelection::all((1990, 1991)));
        assert_eq!(kpis(&set, &empty).latest_year, None);
    }

    #[test]
    fn marker_classes_follow_recency() {
        assert_eq!(marker_class(2023, 2025), MarkerClass::Overdue);
        assert_eq!(marker_class(2024, 2025), MarkerClass::DueSoon);
        assert_eq!(marker_class(2025, 2025), MarkerClass::Current);
        assert_eq!(marker_class(2026, 2025), MarkerClass::Current);
        assert_eq!(marker_class(0, 2025), MarkerClass::Unknown);
    }

    #[test]
    fn marker_class_at_extreme_current_year() {
        assert_eq!(marker_class(i32::MIN, i32::MIN), MarkerClass::Current);
        assert_eq!(marker_class(-5, i32::MIN), MarkerClass::Current);
        assert_eq!(marker_class(i32::MAX - 1, i32::MAX), MarkerClass::DueSoon);
    }

    #[test]
    fn markers_skip_records_without_position() {
        let mut set = sample_records();
        set.records[0].coordinates = None;
        let m = markers(&set.view(), 2025);
        assert_eq!(m.len(), 4);
        let tigaraksa = m.iter().find(|m| m.market_name == "Pasar Tigaraksa").unwrap();
        assert_eq!((tigaraksa.lat, tigaraksa.lon), (-6.26435, 106.42592));
        assert_eq!(tigaraksa.class, MarkerClass::Current);
        assert_eq!(tigaraksa.color, "green");
    }

    #[test]
    fn market_info_falls_back_for_missing_columns() {
        let mut set = sample_records();
        let pick = Selection::Only("Pasar Curug".to_string());
        let info = market_info(&set, &pick).unwrap();
        assert_eq!(info.sub_district, "Curug");

        set.columns.address = false;
        set.columns.sub_district = false;
        let info = market_info(&set, &pick).unwrap();
        assert_eq!(info.address, ADDRESS_UNAVAILABLE);
        assert_eq!(info.sub_district, SUB_DISTRICT_UNAVAILABLE);

        assert_eq!(market_info(&set, &Selection::All), None);
        assert_eq!(market_info(&set, &Selection::Only("Pasar Lama".into())), None);
    }
}
