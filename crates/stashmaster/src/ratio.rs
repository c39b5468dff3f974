//! Packing-ratio database.
//!
//! One record per line: `1_SS_III high low`, where the key is the model
//! number, zero-padded section and zero-padded item. The ratios are
//! percentages of the unpacked field size observed in earlier runs.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use datasz_common::{DataszError, DataszResult, PackingRatio, PackingRatioLookup, StashCode};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct RatioTable {
    ratios: BTreeMap<StashCode, PackingRatio>,
}

impl RatioTable {
    /// Read the database. A missing file yields an empty table: every lookup
    /// then falls back to the unpacked default.
    pub fn from_path<P: AsRef<Path>>(path: P) -> DataszResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let table = Self::parse(&text);
                info!(path = %path.display(), ratios = table.len(), "Loaded packing ratio database");
                Ok(table)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Packing ratio database not found, assuming unpacked sizes");
                Ok(Self::default())
            }
            Err(e) => Err(DataszError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut ratios = BTreeMap::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some((code, ratio)) => {
                    ratios.insert(code, ratio);
                }
                None => warn!(line = index + 1, content = %line, "Skipping malformed ratio line"),
            }
        }
        Self { ratios }
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }
}

impl PackingRatioLookup for RatioTable {
    fn lookup_ratio(&self, code: StashCode) -> Option<PackingRatio> {
        self.ratios.get(&code).copied()
    }
}

fn parse_line(line: &str) -> Option<(StashCode, PackingRatio)> {
    let mut tokens = line.split_whitespace();
    let code = StashCode::from_ratio_key(tokens.next()?)?;
    let high: f64 = tokens.next()?.parse().ok()?;
    let low: f64 = tokens.next()?.parse().ok()?;
    Some((code, PackingRatio::from_bounds(high, low)))
}
