//! STASHmaster parser.
//!
//! A STASHmaster record is five `|`-separated lines numbered `1|` to `5|`:
//!
//! ```text
//! 1| model | sectn | item | name |
//! 2| space | point | time | grid | levelt | levelf | levell | pseudt | pseudf | pseudl | levcom |
//! 3| option_codes | version_mask | halo |
//! 4| datat | dumpp | pc1-a |
//! 5| rotate | ppfc | user | lbvc | blev | tlev | rblevv | cfll | cfff |
//! ```
//!
//! Lines not starting with a digit (headers, comments) are skipped. Only the
//! fields the estimator uses are kept.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use datasz_common::{DataszError, DataszResult, StashCode, StashMetadataLookup, StashRecord};
use tracing::{debug, info};

/// File name of the atmosphere STASHmaster inside a metadata directory.
pub const STASHMASTER_FILE: &str = "STASHmaster_A";

/// Index of the climate-meaning packing code within the `pc1-a` field.
const MEANING_PACKING_INDEX: usize = 4;

#[derive(Debug, Default)]
struct PendingRecord {
    first_line: usize,
    section: String,
    item: String,
    name: String,
    grid: Option<String>,
    packing_codes: Option<String>,
}

/// In-memory STASHmaster keyed by (section, item).
#[derive(Debug, Clone, Default)]
pub struct StashMaster {
    records: BTreeMap<StashCode, StashRecord>,
}

impl StashMaster {
    /// Read `STASHmaster_A` from a metadata directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> DataszResult<Self> {
        let path = dir.as_ref().join(STASHMASTER_FILE);
        let text = fs::read_to_string(&path).map_err(|e| {
            DataszError::Metadata(format!("cannot open {}: {}", path.display(), e))
        })?;
        let master = Self::parse(&text)?;
        info!(path = %path.display(), records = master.len(), "Loaded STASHmaster");
        Ok(master)
    }

    pub fn parse(text: &str) -> DataszResult<Self> {
        let mut records = BTreeMap::new();
        let mut pending: Option<PendingRecord> = None;

        for (index, line) in text.lines().enumerate() {
            let Some(line_kind) = line.chars().next().and_then(|c| c.to_digit(10)) else {
                continue;
            };
            let fields: Vec<&str> = line.split('|').skip(1).map(str::trim).collect();

            match line_kind {
                1 => {
                    if let Some(done) = pending.take() {
                        finish_record(done, &mut records)?;
                    }
                    pending = Some(PendingRecord {
                        first_line: index + 1,
                        section: field(&fields, 1),
                        item: field(&fields, 2),
                        name: field(&fields, 3),
                        ..Default::default()
                    });
                }
                2 => {
                    if let Some(record) = pending.as_mut() {
                        record.grid = Some(field(&fields, 3));
                    }
                }
                4 => {
                    if let Some(record) = pending.as_mut() {
                        record.packing_codes = Some(field(&fields, 2));
                    }
                }
                _ => {}
            }
        }
        if let Some(done) = pending.take() {
            finish_record(done, &mut records)?;
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StashMetadataLookup for StashMaster {
    fn lookup(&self, code: StashCode) -> Option<&StashRecord> {
        self.records.get(&code)
    }
}

fn field(fields: &[&str], index: usize) -> String {
    fields.get(index).copied().unwrap_or_default().to_string()
}

fn finish_record(
    pending: PendingRecord,
    records: &mut BTreeMap<StashCode, StashRecord>,
) -> DataszResult<()> {
    // The end-of-file mark uses section/item -1
    let (Ok(section), Ok(item)) = (pending.section.parse::<u16>(), pending.item.parse::<u16>())
    else {
        debug!(
            line = pending.first_line,
            section = %pending.section,
            item = %pending.item,
            "Skipping STASHmaster record without a valid code"
        );
        return Ok(());
    };
    let code = StashCode::new(section, item);

    let grid_code = pending.grid.ok_or_else(|| {
        DataszError::Metadata(format!(
            "record {} at line {} has no grid line",
            code, pending.first_line
        ))
    })?;
    let packing_code = pending
        .packing_codes
        .as_deref()
        .and_then(|codes| codes.split_whitespace().nth(MEANING_PACKING_INDEX))
        .ok_or_else(|| {
            DataszError::Metadata(format!(
                "record {} at line {} has fewer than {} packing codes",
                code,
                pending.first_line,
                MEANING_PACKING_INDEX + 1
            ))
        })?
        .to_string();

    records.insert(
        code,
        StashRecord {
            code,
            name: pending.name,
            grid_code,
            packing_code,
        },
    );
    Ok(())
}
