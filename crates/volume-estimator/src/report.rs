//! Output report types.
//!
//! Word counts are 8-byte words. The native fields-file format stores 8-byte
//! words after a page-aligned header; the exportable PP format stores 4-byte
//! words with a 68-word lookup entry per field.

use datasz_common::{Period, PeriodValues, RequestKey};
use serde::Serialize;

use crate::usage::{ReinitUnit, UsageProfile};
use crate::volume::{PackingFlag, RequestEstimate};

/// Lookup-table words written per field in the exportable format.
pub const EXPORT_LOOKUP_WORDS: f64 = 68.0;

pub const BYTES_PER_NATIVE_WORD: f64 = 8.0;
pub const BYTES_PER_EXPORT_WORD: f64 = 4.0;

pub const BYTES_PER_MIB: f64 = 1_048_576.0;
pub const BYTES_PER_TIB: f64 = 1_099_511_627_776.0;

/// Header geometry of a fields file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileGeometry {
    pub reserved_headers: u64,
    pub header_words_no_data: u64,
    pub data_start_words: u64,
}

impl From<&UsageProfile> for FileGeometry {
    fn from(profile: &UsageProfile) -> Self {
        Self {
            reserved_headers: profile.reserved_headers,
            header_words_no_data: profile.header_words_no_data,
            data_start_words: profile.data_start_words,
        }
    }
}

/// One row of a stream or mean-file listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingEntry {
    pub key: RequestKey,
    pub grid_code: String,
    pub packing_code: i32,
    pub ignored: bool,
    pub nx: u64,
    pub ny: u64,
    pub levels: u32,
    pub active_years: u32,
    pub words: PeriodValues<f64>,
    pub ratio: f64,
    pub flags: Vec<PackingFlag>,
}

impl From<&RequestEstimate> for ListingEntry {
    fn from(estimate: &RequestEstimate) -> Self {
        match estimate {
            RequestEstimate::Measured(volume) => Self {
                key: volume.key.clone(),
                grid_code: volume.grid_code.clone(),
                packing_code: volume.packing_code,
                ignored: false,
                nx: volume.nx,
                ny: volume.ny,
                levels: volume.levels,
                active_years: volume.active_years,
                words: volume.words,
                ratio: volume.ratio,
                flags: volume.flags.clone(),
            },
            RequestEstimate::Ignored(ignored) => Self {
                key: ignored.key.clone(),
                grid_code: ignored.grid_code.clone(),
                packing_code: ignored.packing_code,
                ignored: true,
                nx: 0,
                ny: 0,
                levels: 0,
                active_years: 0,
                words: PeriodValues::zero(),
                ratio: 0.0,
                flags: Vec::new(),
            },
        }
    }
}

/// Totals for one stream or mean file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSummary {
    pub data_words: PeriodValues<f64>,
    pub unpacked_year_words: f64,
    /// Fields written per period, summed over the bucket's requests.
    pub fields: PeriodValues<f64>,
    pub fields_per_year: f64,
    pub fields_per_file: PeriodValues<u64>,
    pub native_file_bytes: PeriodValues<f64>,
    pub export_file_bytes: PeriodValues<f64>,
    pub export_file_mib: PeriodValues<f64>,
    /// Packed size as a percentage of unpacked size.
    pub compression_percent: Option<f64>,
    pub cost_per_year: f64,
}

impl VolumeSummary {
    /// Derive file sizes and cost from summed request volumes.
    ///
    /// A period with no data is charged the empty-file header in the native
    /// format and nothing in the exportable format.
    pub fn from_totals(
        data_words: PeriodValues<f64>,
        unpacked_year_words: f64,
        fields: PeriodValues<f64>,
        geometry: &FileGeometry,
        files_per_day: f64,
        price_per_tib: f64,
    ) -> Self {
        let fields_per_year = fields.year;
        let whole_fields = fields_per_year.floor();

        let native_file_bytes = data_words.map(|_, words| {
            let header = if words == 0.0 {
                geometry.header_words_no_data
            } else {
                geometry.data_start_words
            };
            (header as f64 * files_per_day + words) * BYTES_PER_NATIVE_WORD
        });
        let fields_per_file = data_words.map(|period, words| {
            if words == 0.0 {
                return 0;
            }
            (fields_per_year / (files_per_day * f64::from(period.per_year()))).floor() as u64
        });
        let export_file_bytes = data_words.map(|period, words| {
            if words == 0.0 {
                return 0.0;
            }
            let lookup = (EXPORT_LOOKUP_WORDS * whole_fields / f64::from(period.per_year())).floor();
            (words + lookup) * BYTES_PER_EXPORT_WORD
        });
        let export_file_mib = export_file_bytes.map(|_, bytes| bytes / BYTES_PER_MIB);
        let compression_percent = (unpacked_year_words > 0.0)
            .then(|| data_words.year * 100.0 / unpacked_year_words);
        let cost_per_year = export_file_bytes.get(Period::Year) / BYTES_PER_TIB * price_per_tib;

        Self {
            data_words,
            unpacked_year_words,
            fields,
            fields_per_year,
            fields_per_file,
            native_file_bytes,
            export_file_bytes,
            export_file_mib,
            compression_percent,
            cost_per_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamReport {
    pub stream_number: u32,
    pub file_id: String,
    pub reinit_interval: i64,
    pub reinit_unit: ReinitUnit,
    /// Files holding data per day for hourly-reinitialised streams, otherwise 1.
    pub files_per_day: f64,
    pub geometry: FileGeometry,
    pub entries: Vec<ListingEntry>,
    pub summary: VolumeSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanFileReport {
    pub meaning_tag: u32,
    pub meaning_periods: [u64; 4],
    pub file_bases: Vec<String>,
    pub geometry: FileGeometry,
    pub entries: Vec<ListingEntry>,
    pub summary: VolumeSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeReport {
    pub price_per_tib: f64,
    pub streams: Vec<StreamReport>,
    pub mean_files: Vec<MeanFileReport>,
    pub total_cost_per_year: f64,
    pub run_length_days: u64,
    /// Yearly cost scaled to the run length.
    pub run_cost: f64,
}

impl VolumeReport {
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty() && self.mean_files.is_empty()
    }

    pub fn stream(&self, stream_number: u32) -> Option<&StreamReport> {
        self.streams.iter().find(|s| s.stream_number == stream_number)
    }

    pub fn mean_file(&self, meaning_tag: u32) -> Option<&MeanFileReport> {
        self.mean_files.iter().find(|m| m.meaning_tag == meaning_tag)
    }
}
