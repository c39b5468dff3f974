//! Run-wide parameters shared by every request.

use datasz_common::{DataszError, DataszResult};
use rose_config::ConfigFacts;
use serde::Serialize;
use tracing::{debug, info};

pub const SECONDS_PER_DAY: u64 = 86_400;
pub const SECONDS_PER_HOUR: u64 = 3_600;

/// River-routing grid size is fixed by the model.
pub const RIVER_ROW_LENGTH: u64 = 360;
pub const RIVER_ROWS: u64 = 180;

/// Storage block granularity in words when `io_field_padding` is not set.
pub const DEFAULT_SECTOR_SIZE: u64 = 512;

/// Run length when `run_target_end` is not set: ten 360-day years.
pub const DEFAULT_RUN_TARGET_END: [i64; 6] = [10, 0, 0, 0, 0, 0];

const NLSTCGEN: &str = "namelist:nlstcgen";
const NLSIZES: &str = "namelist:nlsizes";
const RUN_DYN: &str = "namelist:run_dyn";
const NLSTCALL: &str = "namelist:nlstcall";
const IO_CONTROL: &str = "namelist:io_control";

/// Unit of `dumpfreqim`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DumpFrequencyUnit {
    Hours,
    Days,
    Timesteps,
}

impl DumpFrequencyUnit {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Hours),
            2 => Some(Self::Days),
            3 => Some(Self::Timesteps),
            _ => None,
        }
    }
}

/// Climate-meaning settings. All periods are zero when meaning is off.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeaningSettings {
    pub enabled: bool,
    pub select: [u64; 4],
    pub frequency: [u64; 4],
    /// Nested meaning periods in days, e.g. 30/90/360 for monthly, seasonal
    /// and annual means built from 10-day dumps.
    pub periods: [u64; 4],
    pub file_bases: [Option<String>; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonParameters {
    pub steps_per_period: u64,
    pub seconds_per_period: u64,
    pub steps_per_day: f64,
    pub dump_freq_steps: f64,
    pub meaning: MeaningSettings,
    pub global_row_length: u64,
    pub global_rows: u64,
    pub river_row_length: u64,
    pub river_rows: u64,
    pub uses_endgame_grid: bool,
    /// Words per storage block.
    pub sector_size: u64,
    pub run_length_days: u64,
}

impl CommonParameters {
    pub fn derive<C: ConfigFacts + ?Sized>(config: &C) -> DataszResult<Self> {
        let steps_per_period = positive(config, NLSTCGEN, "steps_per_periodim")?;
        let seconds_per_period = positive(config, NLSTCGEN, "secs_per_periodim")?;
        let steps_per_day =
            (steps_per_period * SECONDS_PER_DAY) as f64 / seconds_per_period as f64;

        let dump_freq = config.integer(NLSTCGEN, "dumpfreqim")?;
        let unit_code = config.integer(NLSTCGEN, "dump_frequency_units")?;
        let unit = DumpFrequencyUnit::from_code(unit_code).ok_or_else(|| {
            DataszError::invalid(
                NLSTCGEN,
                "dump_frequency_units",
                &unit_code.to_string(),
                "expected 1 (hours), 2 (days) or 3 (timesteps)",
            )
        })?;
        let dump_freq_steps = dump_steps(dump_freq, unit, steps_per_period, seconds_per_period)?;

        let meaning = derive_meaning(config, dump_freq_steps, steps_per_period)?;

        let sector_size = match config.opt_integer(IO_CONTROL, "io_field_padding")? {
            Some(value) if value > 0 => value as u64,
            Some(value) => {
                return Err(DataszError::invalid(
                    IO_CONTROL,
                    "io_field_padding",
                    &value.to_string(),
                    "must be positive",
                ))
            }
            None => DEFAULT_SECTOR_SIZE,
        };

        let params = Self {
            steps_per_period,
            seconds_per_period,
            steps_per_day,
            dump_freq_steps,
            meaning,
            global_row_length: non_negative(config, NLSIZES, "global_row_length")?,
            global_rows: non_negative(config, NLSIZES, "global_rows")?,
            river_row_length: RIVER_ROW_LENGTH,
            river_rows: RIVER_ROWS,
            uses_endgame_grid: config.logical(RUN_DYN, "l_endgame")?,
            sector_size,
            run_length_days: run_length_days(config)?,
        };

        info!(
            steps_per_day = params.steps_per_day,
            dump_freq_steps = params.dump_freq_steps,
            meaning = params.meaning.enabled,
            grid = %format!("{}x{}", params.global_row_length, params.global_rows),
            "Derived common parameters"
        );
        Ok(params)
    }

    /// The period climate-mean output frequencies are divided by: the first
    /// non-zero meaning period.
    pub fn first_meaning_period(&self) -> Option<u64> {
        self.meaning.periods.iter().copied().find(|p| *p > 0)
    }

    /// Dumps per day, the unit of dump-period based output.
    pub fn dumps_per_day(&self) -> f64 {
        if self.dump_freq_steps <= 0.0 {
            return 0.0;
        }
        (SECONDS_PER_DAY * self.steps_per_period) as f64
            / (self.dump_freq_steps * self.seconds_per_period as f64)
    }
}

/// Dump frequency expressed in timesteps whatever unit it was given in.
fn dump_steps(
    dump_freq: i64,
    unit: DumpFrequencyUnit,
    steps_per_period: u64,
    seconds_per_period: u64,
) -> DataszResult<f64> {
    let seconds_per_unit = match unit {
        DumpFrequencyUnit::Timesteps => return Ok(dump_freq as f64),
        DumpFrequencyUnit::Days => SECONDS_PER_DAY,
        DumpFrequencyUnit::Hours => SECONDS_PER_HOUR,
    };
    // Integer numerator keeps whole-step results exact
    let numerator = i64::try_from(steps_per_period)
        .ok()
        .and_then(|steps| steps.checked_mul(dump_freq))
        .and_then(|n| n.checked_mul(seconds_per_unit as i64))
        .ok_or_else(|| {
            DataszError::invalid(NLSTCGEN, "dumpfreqim", &dump_freq.to_string(), "dump period too long")
        })?;
    Ok(numerator as f64 / seconds_per_period as f64)
}

fn derive_meaning<C: ConfigFacts + ?Sized>(
    config: &C,
    dump_freq_steps: f64,
    steps_per_period: u64,
) -> DataszResult<MeaningSettings> {
    let enabled = config.logical(NLSTCGEN, "l_meaning_sequence")?;
    if !enabled {
        return Ok(MeaningSettings {
            enabled,
            select: [0; 4],
            frequency: [0; 4],
            periods: [0; 4],
            file_bases: Default::default(),
        });
    }

    let select = four_counts(config, "ppselectim")?;
    let frequency = four_counts(config, "meanfreqim")?;

    let mut file_bases: [Option<String>; 4] = Default::default();
    for (index, base) in file_bases.iter_mut().enumerate() {
        if select[index] > 0 {
            let option = format!("mean_{}_filename_base", index + 1);
            *base = Some(config.character(NLSTCGEN, &option)?);
        }
    }

    let dumps_per_period = (dump_freq_steps / steps_per_period as f64).floor() as u64;
    let mut periods = [0u64; 4];
    let mut current = dumps_per_period;
    for (index, period) in periods.iter_mut().enumerate() {
        current = select[index]
            .checked_mul(frequency[index])
            .and_then(|factor| current.checked_mul(factor))
            .ok_or_else(|| {
                DataszError::invalid(
                    NLSTCGEN,
                    "meanfreqim",
                    config.value(NLSTCGEN, "meanfreqim").unwrap_or_default(),
                    "meaning period too long",
                )
            })?;
        *period = current;
    }
    debug!(?periods, "Derived meaning periods");

    Ok(MeaningSettings {
        enabled,
        select,
        frequency,
        periods,
        file_bases,
    })
}

fn four_counts<C: ConfigFacts + ?Sized>(config: &C, option: &str) -> DataszResult<[u64; 4]> {
    let values = config.integer_array(NLSTCGEN, option)?;
    let raw = config.require(NLSTCGEN, option)?;
    if values.len() < 4 {
        return Err(DataszError::invalid(NLSTCGEN, option, raw, "expected four entries"));
    }
    let mut counts = [0u64; 4];
    for (count, value) in counts.iter_mut().zip(&values) {
        *count = u64::try_from(*value)
            .map_err(|_| DataszError::invalid(NLSTCGEN, option, raw, "entries must not be negative"))?;
    }
    Ok(counts)
}

fn run_length_days<C: ConfigFacts + ?Sized>(config: &C) -> DataszResult<u64> {
    let target = config
        .opt_integer_array(NLSTCALL, "run_target_end")?
        .unwrap_or_else(|| DEFAULT_RUN_TARGET_END.to_vec());
    match target.as_slice() {
        [years, months, days, ..] => Ok((years * 360 + months * 30 + days).max(0) as u64),
        _ => Err(DataszError::invalid(
            NLSTCALL,
            "run_target_end",
            config.value(NLSTCALL, "run_target_end").unwrap_or_default(),
            "expected at least years, months and days",
        )),
    }
}

fn positive<C: ConfigFacts + ?Sized>(config: &C, section: &str, option: &str) -> DataszResult<u64> {
    let value = config.integer(section, option)?;
    if value <= 0 {
        return Err(DataszError::invalid(section, option, &value.to_string(), "must be positive"));
    }
    Ok(value as u64)
}

fn non_negative<C: ConfigFacts + ?Sized>(
    config: &C,
    section: &str,
    option: &str,
) -> DataszResult<u64> {
    let value = config.integer(section, option)?;
    u64::try_from(value)
        .map_err(|_| DataszError::invalid(section, option, &value.to_string(), "must not be negative"))
}
