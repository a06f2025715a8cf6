//! Narrowing the full record set to the operator's current selection.

use crate::types::{FilterSelection, FilteredView, RecordSet};
use tracing::debug;

/// Apply `selection` to `set`.
///
/// Steps run in a fixed order (year range, then sub-district, then market)
/// and each logs how many rows survive. The year step is skipped when the
/// source had no calibration-year column. Sub-district and market compare
/// against the stored values exactly.
pub fn apply_filter<'a>(set: &'a RecordSet, selection: &FilterSelection) -> FilteredView<'a> {
    let mut records: Vec<_> = set.records.iter().collect();

    if set.columns.calibration_year {
        let (min, max) = selection.year_range;
        records.retain(|r| (min..=max).contains(&r.calibration_year));
        debug!("year {}..={}: {} rows", min, max, records.len());
    }

    records.retain(|r| selection.sub_district.matches(&r.sub_district));
    debug!("sub-district {:?}: {} rows", selection.sub_district, records.len());

    records.retain(|r| selection.market_name.matches(&r.market_name));
    debug!("market {:?}: {} rows", selection.market_name, records.len());

    FilteredView {
        records,
        columns: &set.columns,
    }
}

/// Smallest and largest known calibration year, ignoring unknown (0) years.
/// Used to seed the year-range control.
pub fn year_bounds(set: &RecordSet) -> Option<(i32, i32)> {
    let mut years = set
        .records
        .iter()
        .map(|r| r.calibration_year)
        .filter(|y| *y != 0);
    let first = years.next()?;
    Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
}

/// Year range the filter starts from after a load. It spans every known
/// year and reaches down to 0 when some record's year is unknown, so the
/// initial view holds the whole set.
pub fn default_year_range(set: &RecordSet) -> (i32, i32) {
    let has_unknown = set.records.iter().any(|r| r.calibration_year == 0);
    match year_bounds(set) {
        Some((lo, hi)) if has_unknown => (lo.min(0), hi),
        Some(bounds) => bounds,
        None => (0, 0),
    }
}
