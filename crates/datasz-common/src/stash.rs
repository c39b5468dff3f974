//! STASH field metadata and packing-ratio lookups.
//!
//! The estimator only talks to metadata through the two lookup traits
//! defined here; parsing of the backing files lives in the `stashmaster`
//! crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Packing code meaning "this field is never packed".
pub const NO_PACKING_CODE: &str = "-99";

/// Ratio used when a field is stored unpacked.
pub const UNPACKED_PERCENT: f64 = 100.0;

/// A (section, item) pair identifying one atmosphere diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StashCode {
    pub section: u16,
    pub item: u16,
}

impl StashCode {
    pub fn new(section: u16, item: u16) -> Self {
        Self { section, item }
    }

    /// Key used by the packing-ratio database, e.g. `1_05_216`.
    pub fn ratio_key(&self) -> String {
        format!("1_{:02}_{:03}", self.section, self.item)
    }

    /// Parse a ratio database key back into a code. The model prefix must be `1`.
    pub fn from_ratio_key(key: &str) -> Option<Self> {
        let mut parts = key.split('_');
        let model = parts.next()?;
        let section = parts.next()?.parse().ok()?;
        let item = parts.next()?.parse().ok()?;
        if model != "1" || parts.next().is_some() {
            return None;
        }
        Some(Self::new(section, item))
    }
}

impl fmt::Display for StashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m01s{:02}i{:03}", self.section, self.item)
    }
}

/// The subset of a STASHmaster record the estimator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StashRecord {
    pub code: StashCode,
    pub name: String,
    /// Grid type code (e.g. "1" theta points, "23" river routing).
    pub grid_code: String,
    /// Packing code for climate-mean output (e.g. "-3", "-99").
    pub packing_code: String,
}

impl StashRecord {
    pub fn is_unpackable(&self) -> bool {
        self.packing_code == NO_PACKING_CODE
    }

    /// Packing code as an integer for display; non-numeric codes read as 0.
    pub fn packing_code_value(&self) -> i32 {
        self.packing_code.trim().parse().unwrap_or(0)
    }
}

/// Historical compression of a field, as a percentage of its unpacked size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackingRatio {
    pub high: f64,
    pub low: f64,
    pub average: f64,
}

impl PackingRatio {
    pub fn from_bounds(high: f64, low: f64) -> Self {
        Self {
            high,
            low,
            average: (high + low) / 2.0,
        }
    }

    pub fn unpacked() -> Self {
        Self {
            high: UNPACKED_PERCENT,
            low: UNPACKED_PERCENT,
            average: UNPACKED_PERCENT,
        }
    }
}

/// Resolves a STASH code to its grid and packing codes.
pub trait StashMetadataLookup {
    fn lookup(&self, code: StashCode) -> Option<&StashRecord>;
}

/// Resolves a STASH code to its historical packing ratio, if one was recorded.
pub trait PackingRatioLookup {
    fn lookup_ratio(&self, code: StashCode) -> Option<PackingRatio>;
}

impl StashMetadataLookup for BTreeMap<StashCode, StashRecord> {
    fn lookup(&self, code: StashCode) -> Option<&StashRecord> {
        self.get(&code)
    }
}

impl PackingRatioLookup for BTreeMap<StashCode, PackingRatio> {
    fn lookup_ratio(&self, code: StashCode) -> Option<PackingRatio> {
        self.get(&code).copied()
    }
}
