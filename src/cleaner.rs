//! Presentable category lists for the sub-district and market selectors.

use crate::types::{FilterMode, MarketRecord, Selection};
use crate::util::{is_sentinel, title_case};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    SubDistrict,
    MarketName,
}

impl CategoryField {
    pub fn value(self, record: &MarketRecord) -> &str {
        match self {
            CategoryField::SubDistrict => &record.sub_district,
            CategoryField::MarketName => &record.market_name,
        }
    }
}

/// Trim, title-case, drop sentinel tokens, de-duplicate and sort.
pub fn clean_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !is_sentinel(v))
        .map(title_case)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn clean_categories<'a>(
    records: impl IntoIterator<Item = &'a MarketRecord>,
    field: CategoryField,
) -> Vec<String> {
    clean_values(records.into_iter().map(|r| field.value(r)))
}

/// Market choices for the market selector. In cascade mode the list is
/// narrowed to the chosen sub-district; direct mode always lists every
/// market.
pub fn market_options<'a>(
    records: impl IntoIterator<Item = &'a MarketRecord>,
    mode: FilterMode,
    sub_district: &Selection,
) -> Vec<String> {
    let records = records.into_iter();
    match mode {
        FilterMode::Direct => clean_categories(records, CategoryField::MarketName),
        FilterMode::Cascade => clean_categories(
            records.filter(|r| sub_district.matches(&r.sub_district)),
            CategoryField::MarketName,
        ),
    }
}
