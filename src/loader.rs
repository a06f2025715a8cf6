//! Reading market exports from disk.
//!
//! Bytes are decoded permissively and quote-wrapped exports repaired before
//! the delimiter is sniffed. Any failure falls back to the built-in sample
//! set with a diagnostic. Results are cached per path until the file's
//! modification time changes.

use crate::coerce::coerce;
use crate::error::{Error, Result};
use crate::sample::sample_records;
use crate::schema::normalize;
use crate::types::{LoadOutcome, RawTable};
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Share of data lines that must be wrapped in quotes before the whole file
/// is treated as quote-wrapped.
const WRAPPED_LINE_RATIO: f64 = 0.8;

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Decode UTF-8, silently dropping invalid byte sequences and a leading BOM.
pub fn decode_permissive(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    match out.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => out,
    }
}

/// Undo exports where every line was wrapped in one pair of quotes with the
/// inner quotes doubled, e.g. `"Pasar A,""-6.2, 106.4"",2024"`.
///
/// Only applies when at least 80% of the non-empty data lines look wrapped;
/// every wrapped line, header included, is then unwrapped. Lines with an
/// undoubled quote between the outer pair are not treated as wrapped, so
/// such an export is returned unchanged.
pub fn repair_quoting(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let body: Vec<&str> = lines
        .iter()
        .skip(1)
        .copied()
        .filter(|l| !l.trim().is_empty())
        .collect();
    if body.is_empty() {
        return text.to_string();
    }
    let wrapped = body.iter().filter(|l| is_wrapped(l)).count();
    if (wrapped as f64) < WRAPPED_LINE_RATIO * body.len() as f64 {
        return text.to_string();
    }
    debug!("unwrapping {} quote-wrapped lines", wrapped);
    lines
        .iter()
        .map(|l| if is_wrapped(l) { unwrap_line(l) } else { l.to_string() })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A wrapped line starts and ends with `"` and holds only doubled quotes
/// between that outer pair. This is narrower than "starts and ends with a
/// quote": a line with lone inner quotes such as `"Pasar A,"x",2024"` is not
/// counted, so ordinary quoted CSV like `"a","b"` is never unwrapped.
fn is_wrapped(line: &str) -> bool {
    let t = line.trim();
    if t.len() < 2 || !t.starts_with('"') || !t.ends_with('"') {
        return false;
    }
    !t[1..t.len() - 1].replace("\"\"", "").contains('"')
}

fn unwrap_line(line: &str) -> String {
    let t = line.trim();
    t[1..t.len() - 1].replace("\"\"", "\"")
}

/// Pick the delimiter used in a header line: the candidate that occurs most
/// often outside quotes. Fails when none occurs at all.
pub fn sniff_delimiter(header: &str) -> Result<u8> {
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;
    for b in header.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if let Some(i) = DELIMITER_CANDIDATES.iter().position(|d| *d == b) {
                counts[i] += 1;
            }
        }
    }
    let (best, count) = counts
        .iter()
        .enumerate()
        .fold((0, 0), |acc, (i, c)| if *c > acc.1 { (i, *c) } else { acc });
    if count == 0 {
        return Err(Error::Delimiter(format!("no candidate delimiter in {:?}", header)));
    }
    Ok(DELIMITER_CANDIDATES[best])
}

/// Parse delimited text with a header row. Rows shorter than the header are
/// padded with empty cells; surplus cells are dropped.
pub fn parse_table(text: &str, delimiter: u8) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::EmptyTable);
    }

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        if record.len() > headers.len() {
            debug!("row {}: {} surplus cells dropped", line + 1, record.len() - headers.len());
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

/// Read and parse a file into a raw table, without normalization.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path)?;
    let text = repair_quoting(&decode_permissive(&bytes));
    let header = text.lines().next().unwrap_or("");
    let delimiter = sniff_delimiter(header).unwrap_or_else(|e| {
        debug!("{}; using comma", e);
        b','
    });
    parse_table(&text, delimiter)
}

/// Load a file through the whole pipeline, bypassing the cache. Never fails:
/// on any error the sample data is returned with a diagnostic.
pub fn load_uncached(path: &Path) -> LoadOutcome {
    match read_table(path) {
        Ok(table) => {
            let records = coerce(&normalize(table));
            info!("Loaded {} market rows from {}", records.len(), path.display());
            LoadOutcome {
                records: Arc::new(records),
                diagnostic: None,
            }
        }
        Err(e) => {
            warn!("Failed to load {}: {}; using sample data", path.display(), e);
            LoadOutcome {
                records: Arc::new(sample_records()),
                diagnostic: Some(format!(
                    "Could not read {} ({}). Showing sample data instead.",
                    path.display(),
                    e
                )),
            }
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    modified: Option<SystemTime>,
    outcome: LoadOutcome,
}

/// Load results keyed by path. An entry is reused while the file's
/// modification time stays the same.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> LoadOutcome {
        let modified = modified_time(path);
        if let Some(entry) = self.entries.get(path) {
            if entry.modified == modified {
                debug!("cache hit for {}", path.display());
                return entry.outcome.clone();
            }
            info!("{} changed on disk, reloading", path.display());
        }
        let outcome = load_uncached(path);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                outcome: outcome.clone(),
            },
        );
        outcome
    }

    /// Forget one path. Returns whether it was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

// Process-wide cache so repeated loads of the same export during a session
// share one record set.
static LOAD_CACHE: Lazy<Mutex<LoadCache>> = Lazy::new(|| Mutex::new(LoadCache::new()));

/// Load market records from `path`, memoized per path for the session.
pub fn load_records(path: impl AsRef<Path>) -> LoadOutcome {
    let mut cache = LOAD_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.get_or_load(path.as_ref())
}

/// Drop the cached result for `path` so the next load re-reads it.
pub fn invalidate(path: impl AsRef<Path>) -> bool {
    let mut cache = LOAD_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.invalidate(path.as_ref())
}
