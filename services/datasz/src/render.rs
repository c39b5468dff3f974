//! Text and JSON rendering of a [`VolumeReport`].

use std::fmt;

use datasz_common::{Period, PeriodValues};
use volume_estimator::{
    FileGeometry, ListingEntry, MeanFileReport, PackingFlag, StreamReport, VolumeReport,
    VolumeSummary,
};

pub const NO_STREAMS_MESSAGE: &str = "No requests to fields-file streams found";

const RULE_WIDTH: usize = 132;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Plain-text report, one block per stream and per climate-meaning file.
pub struct TextReport<'a> {
    pub report: &'a VolumeReport,
    pub currency: &'a str,
}

impl<'a> TextReport<'a> {
    pub fn new(report: &'a VolumeReport, currency: &'a str) -> Self {
        Self { report, currency }
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(
            f,
            "Storage price: {:.2} {} per TiB per year",
            report.price_per_tib, self.currency
        )?;

        if report.is_empty() {
            return writeln!(f, "{}", NO_STREAMS_MESSAGE);
        }

        for stream in &report.streams {
            writeln!(f)?;
            write_stream(f, stream, self.currency)?;
        }
        for mean_file in &report.mean_files {
            writeln!(f)?;
            write_mean_file(f, mean_file, self.currency)?;
        }

        writeln!(f)?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            f,
            "{:<40} {:>14.2} {}",
            "Total storage cost per year:", report.total_cost_per_year, self.currency
        )?;
        writeln!(
            f,
            "{:<40} {:>14.2} {} ({} days)",
            "Storage cost for the run:", report.run_cost, self.currency, report.run_length_days
        )
    }
}

fn write_stream(f: &mut fmt::Formatter<'_>, stream: &StreamReport, currency: &str) -> fmt::Result {
    let title = format!(
        "Stream {:2} ({}) reinitialised every {} {}(s)",
        stream.stream_number,
        stream.file_id,
        stream.reinit_interval,
        stream.reinit_unit.label()
    );
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(title.len()))?;
    write_header_line(f, "Files per day:", &format!("{}", stream.files_per_day))?;
    write_geometry(f, &stream.geometry, stream.summary.fields_per_year)?;
    write_listing(f, &stream.entries)?;
    write_summary(f, &stream.summary, currency)
}

fn write_mean_file(
    f: &mut fmt::Formatter<'_>,
    mean_file: &MeanFileReport,
    currency: &str,
) -> fmt::Result {
    let periods = mean_file
        .meaning_periods
        .iter()
        .filter(|p| **p > 0)
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let title = format!(
        "Climate-meaning file {} for meaning periods [{}] (files: {})",
        mean_file.meaning_tag,
        periods,
        mean_file.file_bases.join(", ")
    );
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(title.len()))?;
    write_geometry(f, &mean_file.geometry, mean_file.summary.fields_per_year)?;
    write_listing(f, &mean_file.entries)?;
    write_summary(f, &mean_file.summary, currency)
}

fn write_header_line(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    writeln!(f, "{:<30} {:>14}", label, value)
}

fn write_geometry(f: &mut fmt::Formatter<'_>, geometry: &FileGeometry, fields: f64) -> fmt::Result {
    write_header_line(f, "Reserved headers:", &geometry.reserved_headers.to_string())?;
    write_header_line(f, "Header words (no data):", &geometry.header_words_no_data.to_string())?;
    write_header_line(f, "Data start position:", &geometry.data_start_words.to_string())?;
    write_header_line(f, "Fields per year:", &format!("{}", fields.floor() as u64))
}

fn write_listing(f: &mut fmt::Formatter<'_>, entries: &[ListingEntry]) -> fmt::Result {
    writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(
        f,
        "{:<32} {:>5} {:>4} {:>5} {:>5} {:>4} {:>3} {:>12} {:>12} {:>12} {:>14} {:>8}",
        "Request", "Grid", "Pack", "NX", "NY", "Lev", "Yrs", "Day", "Month", "Quarter", "Year", "Ratio"
    )?;
    writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;

    for entry in entries {
        let key = entry.key.to_string();
        if entry.ignored {
            writeln!(
                f,
                "{:<32} {:>5} {:>4} {:^60} {:>14}",
                key, entry.grid_code, entry.packing_code, "** ignored **", ""
            )?;
            continue;
        }
        writeln!(
            f,
            "{:<32} {:>5} {:>4} {:>5} {:>5} {:>4} {:>3} {:>12} {:>12} {:>12} {:>14} {:>8.2}{}",
            key,
            entry.grid_code,
            entry.packing_code,
            entry.nx,
            entry.ny,
            entry.levels,
            entry.active_years,
            entry.words.day.round() as u64,
            entry.words.month.round() as u64,
            entry.words.quarter.round() as u64,
            entry.words.year.round() as u64,
            entry.ratio,
            flag_suffix(&entry.flags)
        )?;
    }
    writeln!(f, "{}", "-".repeat(RULE_WIDTH))
}

/// `_#` marks an assumed-unpacked field, `_s` a single-column field.
fn flag_suffix(flags: &[PackingFlag]) -> String {
    flags
        .iter()
        .map(|flag| match flag {
            PackingFlag::NoHistoricalRatio => "_#",
            PackingFlag::SingleColumnUnpacked => "_s",
        })
        .collect()
}

fn write_periods(f: &mut fmt::Formatter<'_>, label: &str, values: &PeriodValues<f64>) -> fmt::Result {
    write!(f, "{:<45}", label)?;
    for period in Period::ALL {
        write!(f, " {:>14.0}", values.get(period))?;
    }
    writeln!(f)
}

fn write_summary(f: &mut fmt::Formatter<'_>, summary: &VolumeSummary, currency: &str) -> fmt::Result {
    write!(f, "{:<45}", "")?;
    for period in Period::ALL {
        write!(f, " {:>14}", period.label())?;
    }
    writeln!(f)?;

    write_periods(f, "Total data words:", &summary.data_words)?;
    match summary.compression_percent {
        Some(percent) => writeln!(f, "{:<45} {:>14.2}%", "Packed / unpacked (year):", percent)?,
        None => writeln!(f, "{:<45} {:>14}", "Packed / unpacked (year):", "n/a")?,
    }
    write_periods(
        f,
        "Fields per file:",
        &summary.fields_per_file.map(|_, n| n as f64),
    )?;
    write_periods(f, "Native file size (bytes):", &summary.native_file_bytes)?;
    write_periods(f, "Exportable file size (bytes):", &summary.export_file_bytes)?;

    write!(f, "{:<45}", "Exportable file size (MiB):")?;
    for period in Period::ALL {
        write!(f, " {:>14.2}", summary.export_file_mib.get(period))?;
    }
    writeln!(f)?;

    writeln!(
        f,
        "{:<45} {:>14.2} {}",
        "Storage cost per year:", summary.cost_per_year, currency
    )
}

pub fn render_json(report: &VolumeReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
