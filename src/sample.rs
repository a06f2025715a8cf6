//! Built-in demo data shown when the configured export cannot be loaded.

use crate::coerce::coerce;
use crate::schema::normalize;
use crate::types::{RawTable, RecordSet};

const SAMPLE_HEADERS: &[&str] = &[
    "Nama Pasar",
    "Kecamatan",
    "Alamat",
    "Koordinat",
    "Tahun Tera",
    "Jumlah UTTP",
    "Timbangan Pegas",
    "Timbangan Meja",
    "Timbangan Elektronik",
    "Timbangan Sentisimal",
    "Dacin",
    "Neraca",
];

const SAMPLE_ROWS: &[[&str; 12]] = &[
    [
        "Pasar Cikupa",
        "Cikupa",
        "Jl. Raya Serang Km. 14, Cikupa",
        "-6.2265, 106.5071",
        "2024",
        "38",
        "12", "8", "15", "2", "1", "0",
    ],
    [
        "Pasar Curug",
        "Curug",
        "Jl. Raya Curug, Curug Wetan",
        "-6.2650, 106.5560",
        "2023",
        "21",
        "6", "5", "9", "0", "0", "1",
    ],
    [
        "Pasar Tigaraksa",
        "Tigaraksa",
        "Jl. Aria Jaya Santika, Tigaraksa",
        "-6.26435, 106.42592",
        "2025",
        "17",
        "4", "3", "10", "0", "0", "0",
    ],
    [
        "Pasar Balaraja",
        "Balaraja",
        "Jl. Raya Serang Km. 24, Balaraja",
        "-6.2008, 106.4447",
        "2022",
        "26",
        "9", "6", "7", "3", "1", "0",
    ],
    [
        "Pasar Kutabumi",
        "Pasar Kemis",
        "Jl. Raya Kutabumi, Pasar Kemis",
        "-6.1664, 106.5332",
        "2024",
        "14",
        "5", "2", "7", "0", "0", "0",
    ],
];

/// Five illustrative markets run through the regular normalization and
/// coercion stages.
pub fn sample_records() -> RecordSet {
    let table = RawTable {
        headers: SAMPLE_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: SAMPLE_ROWS
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    };
    coerce(&normalize(table))
}
