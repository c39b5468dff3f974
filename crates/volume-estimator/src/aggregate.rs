//! Per-stream and per-meaning-file totals.

use std::collections::BTreeMap;

use datasz_common::PeriodValues;
use tracing::{info, warn};

use crate::common::CommonParameters;
use crate::report::{
    FileGeometry, ListingEntry, MeanFileReport, StreamReport, VolumeReport, VolumeSummary,
};
use crate::usage::{Destination, UsageCatalog, UsageProfile};
use crate::volume::RequestEstimate;

#[derive(Debug)]
struct Accumulator<'a> {
    profile: &'a UsageProfile,
    entries: Vec<ListingEntry>,
    data_words: PeriodValues<f64>,
    unpacked_year_words: f64,
    fields: PeriodValues<f64>,
    files_per_day: Option<f64>,
}

impl<'a> Accumulator<'a> {
    fn new(profile: &'a UsageProfile) -> Self {
        Self {
            profile,
            entries: Vec::new(),
            data_words: PeriodValues::zero(),
            unpacked_year_words: 0.0,
            fields: PeriodValues::zero(),
            files_per_day: None,
        }
    }

    fn add(&mut self, estimate: &RequestEstimate, profile: &UsageProfile) {
        self.entries.push(ListingEntry::from(estimate));
        let Some(volume) = estimate.volume() else {
            return;
        };
        self.data_words += volume.words;
        self.unpacked_year_words += volume.unpacked_year_words;
        self.fields += volume.fields;

        // Requests output less often than files are opened leave some files empty
        if let Some(cap) = profile.files_per_day_cap() {
            let with_data = volume.output_freq_per_day.min(cap);
            self.files_per_day = Some(self.files_per_day.map_or(with_data, |f| f.max(with_data)));
        }
    }

    fn files_per_day(&self) -> f64 {
        self.files_per_day.filter(|files| *files > 0.0).unwrap_or(1.0)
    }

    fn summary(&self, files_per_day: f64, price_per_tib: f64) -> VolumeSummary {
        VolumeSummary::from_totals(
            self.data_words,
            self.unpacked_year_words,
            self.fields,
            &FileGeometry::from(self.profile),
            files_per_day,
            price_per_tib,
        )
    }

    fn sorted_entries(mut self) -> Vec<ListingEntry> {
        self.entries.sort_by(|a, b| a.key.cmp(&b.key));
        self.entries
    }
}

/// Sum request estimates into stream and mean-file reports.
///
/// Every stream or meaning tag with at least one listed request is reported,
/// including those whose requests are all ignored or zero-sized.
pub fn aggregate(
    common: &CommonParameters,
    usage: &UsageCatalog,
    estimates: &[RequestEstimate],
    price_per_tib: f64,
) -> VolumeReport {
    let mut streams: BTreeMap<u32, Accumulator> = BTreeMap::new();
    let mut mean_files: BTreeMap<u32, Accumulator> = BTreeMap::new();

    for estimate in estimates {
        let key = estimate.key();
        let Some(profile) = usage.get(&key.usage) else {
            warn!(request = %key, "Request has no usage profile, leaving it out of the totals");
            continue;
        };
        let bucket = match &profile.destination {
            Destination::Stream { stream_number, .. } => streams
                .entry(*stream_number)
                .or_insert_with(|| Accumulator::new(profile)),
            Destination::MeanFile { meaning_tag } => mean_files
                .entry(*meaning_tag)
                .or_insert_with(|| Accumulator::new(profile)),
        };
        bucket.add(estimate, profile);
    }

    let stream_reports: Vec<StreamReport> = streams
        .into_iter()
        .filter_map(|(stream_number, bucket)| {
            let profile = bucket.profile;
            let Destination::Stream {
                file_id,
                reinit_interval,
                reinit_unit,
                ..
            } = &profile.destination
            else {
                return None;
            };
            let files_per_day = bucket.files_per_day();
            Some(StreamReport {
                stream_number,
                file_id: file_id.clone(),
                reinit_interval: *reinit_interval,
                reinit_unit: *reinit_unit,
                files_per_day,
                geometry: FileGeometry::from(profile),
                summary: bucket.summary(files_per_day, price_per_tib),
                entries: bucket.sorted_entries(),
            })
        })
        .collect();

    let file_bases: Vec<String> = common.meaning.file_bases.iter().flatten().cloned().collect();
    let mean_reports: Vec<MeanFileReport> = mean_files
        .into_iter()
        .map(|(meaning_tag, bucket)| {
            MeanFileReport {
                meaning_tag,
                meaning_periods: common.meaning.periods,
                file_bases: file_bases.clone(),
                geometry: FileGeometry::from(bucket.profile),
                summary: bucket.summary(1.0, price_per_tib),
                entries: bucket.sorted_entries(),
            }
        })
        .collect();

    let total_cost_per_year: f64 = stream_reports
        .iter()
        .map(|s| s.summary.cost_per_year)
        .chain(mean_reports.iter().map(|m| m.summary.cost_per_year))
        .sum();
    let run_cost = total_cost_per_year * (common.run_length_days as f64 / 360.0);

    info!(
        streams = stream_reports.len(),
        mean_files = mean_reports.len(),
        total_cost_per_year,
        "Aggregated volumes"
    );

    VolumeReport {
        price_per_tib,
        streams: stream_reports,
        mean_files: mean_reports,
        total_cost_per_year,
        run_length_days: common.run_length_days,
        run_cost,
    }
}
