//! Parsing of free-form `"lat, lon"` coordinate cells.

use crate::types::{Coordinate, MarketRecord};
use crate::util::parse_f64_safe;

/// Parse a raw coordinate cell into a [`Coordinate`].
///
/// Only the first two comma-separated parts are read. When the first part
/// cannot be a latitude (|v| > 90) but the second can, the pair was written
/// as `lon, lat` and is swapped. No other reordering is attempted: a
/// reversed pair whose values are both within ±90 is taken as written.
pub fn parse_coordinate(raw: Option<&str>) -> Option<Coordinate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut parts = raw.split(',');
    let first = parse_f64_safe(parts.next())?;
    let second = parse_f64_safe(parts.next())?;

    if first.abs() > 90.0 && second.abs() <= 90.0 {
        Coordinate::new(second, first)
    } else {
        Coordinate::new(first, second)
    }
}

/// Position of a record for the map, if it has one.
pub fn coordinate_of(record: &MarketRecord) -> Option<(f64, f64)> {
    record.coordinates.map(|c| (c.lat, c.lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(raw: &str) -> Option<(f64, f64)> {
        parse_coordinate(Some(raw)).map(|c| (c.lat, c.lon))
    }

    #[test]
    fn lat_lon_order_is_kept() {
        assert_eq!(pair("-6.26435, 106.42592"), Some((-6.26435, 106.42592)));
        assert_eq!(pair("45.5,-12.25"), Some((45.5, -12.25)));
        assert_eq!(pair("90,180"), Some((90.0, 180.0)));
    }

    #[test]
    fn lon_lat_order_is_swapped() {
        assert_eq!(pair("106.42592, -6.26435"), Some((-6.26435, 106.42592)));
        assert_eq!(pair("-120.5,33"), Some((33.0, -120.5)));
    }

    #[test]
    fn reversed_pair_within_90_is_not_corrected() {
        // Longitude 45 written first is indistinguishable from a latitude.
        assert_eq!(pair("45.0, -6.2"), Some((45.0, -6.2)));
    }

    #[test]
    fn extra_parts_are_ignored() {
        assert_eq!(pair("-6.2, 106.4, 12"), Some((-6.2, 106.4)));
    }

    #[test]
    fn malformed_input_is_absent() {
        for raw in ["", "   ", "-6.2", "-6.2 106.4", "abc, def", "-6.2, x", ",", "nan, 1"] {
            assert_eq!(pair(raw), None, "{raw:?}");
        }
        assert_eq!(parse_coordinate(None), None);
    }

    #[test]
    fn record_position() {
        let set = crate::sample::sample_records();
        assert_eq!(coordinate_of(&set.records[2]), Some((-6.26435, 106.42592)));
        let mut r = set.records[0].clone();
        r.coordinates = None;
        assert_eq!(coordinate_of(&r), None);
    }

    #[test]
    fn both_out_of_range_is_absent() {
        assert_eq!(pair("120, 150"), None);
    }
}
