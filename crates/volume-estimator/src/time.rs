//! Time profiles: how often a request is output and for how long.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use datasz_common::{DataszError, DataszResult};
use rose_config::ConfigFacts;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::common::CommonParameters;

const TIME_PREFIX: &str = "namelist:time(";

/// When output happens (`iopt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputTiming {
    Regular,
    /// Regular output between two dates.
    RegularBounded { start: NaiveDate, end: NaiveDate },
    /// Lists of times and anything else; not estimated.
    Other { code: i64 },
}

impl OutputTiming {
    pub fn is_regular(&self) -> bool {
        !matches!(self, Self::Other { .. })
    }
}

/// Unit of the output interval (`unt3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Timestep,
    Hour,
    Day,
    DumpPeriod,
    Unrecognised(i64),
}

impl IntervalUnit {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Timestep,
            2 => Self::Hour,
            3 => Self::Day,
            4 => Self::DumpPeriod,
            other => Self::Unrecognised(other),
        }
    }

    /// Units whose frequency is `1 / ifre` of the unit; only these read `ifre`.
    pub fn divides_by_count(self) -> bool {
        matches!(self, Self::Hour | Self::Day)
    }
}

/// STASH time processing (`ityp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeProcessing {
    Replace,
    Accumulate,
    Mean,
    AppendTimeSeries,
    Maximum,
    Minimum,
    Trajectory,
    UserDefined,
    Other(i64),
}

impl TimeProcessing {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Replace,
            2 => Self::Accumulate,
            3 => Self::Mean,
            4 => Self::AppendTimeSeries,
            5 => Self::Maximum,
            6 => Self::Minimum,
            7 => Self::Trajectory,
            8 => Self::UserDefined,
            other => Self::Other(other),
        }
    }

    /// Time series and user processing write to files this estimator does not size.
    pub fn is_estimated(self) -> bool {
        !matches!(self, Self::AppendTimeSeries | Self::UserDefined)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeProfile {
    pub name: String,
    pub timing: OutputTiming,
    pub processing: TimeProcessing,
    /// Present for regular output only.
    pub interval: Option<(IntervalUnit, i64)>,
}

/// What a request inherits from its time profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeAttributes {
    pub occurrences_per_day: f64,
    /// Whole years between the bounds of bounded output, otherwise 0.
    pub active_years: u32,
    pub ignored: bool,
}

impl TimeProfile {
    pub fn from_config<C: ConfigFacts + ?Sized>(config: &C, section: &str) -> DataszResult<Self> {
        let name = config.character(section, "tim_name")?;
        let processing = TimeProcessing::from_code(config.integer(section, "ityp")?);

        let iopt = config.integer(section, "iopt")?;
        let timing = match iopt {
            1 => OutputTiming::Regular,
            3 => OutputTiming::RegularBounded {
                start: read_date(config, section, "isdt")?,
                end: read_date(config, section, "iedt")?,
            },
            code => OutputTiming::Other { code },
        };

        let interval = if timing.is_regular() {
            let unit = IntervalUnit::from_code(config.integer(section, "unt3")?);
            let count = if unit.divides_by_count() {
                let count = config.integer(section, "ifre")?;
                if count <= 0 {
                    return Err(DataszError::invalid(section, "ifre", &count.to_string(), "must be positive"));
                }
                count
            } else {
                config.opt_integer(section, "ifre")?.unwrap_or(1)
            };
            Some((unit, count))
        } else {
            None
        };

        Ok(Self {
            name,
            timing,
            processing,
            interval,
        })
    }

    pub fn occurrences_per_day(&self, common: &CommonParameters) -> f64 {
        let Some((unit, count)) = self.interval else {
            return 0.0;
        };
        match unit {
            IntervalUnit::Timestep => common.steps_per_day,
            IntervalUnit::Hour => 24.0 / count as f64,
            IntervalUnit::Day => 1.0 / count as f64,
            IntervalUnit::DumpPeriod => common.dumps_per_day(),
            IntervalUnit::Unrecognised(code) => {
                warn!(time = %self.name, code, "Unrecognised interval unit, no output");
                0.0
            }
        }
    }

    pub fn active_years(&self) -> u32 {
        match self.timing {
            OutputTiming::RegularBounded { start, end } => {
                let days = (end - start).num_days().max(0);
                (days / 365) as u32
            }
            _ => 0,
        }
    }

    pub fn ignored(&self) -> bool {
        !self.timing.is_regular() || !self.processing.is_estimated()
    }

    pub fn attributes(&self, common: &CommonParameters) -> TimeAttributes {
        let ignored = self.ignored();
        if ignored {
            warn!(time = %self.name, timing = ?self.timing, processing = ?self.processing, "Requests using this time profile are ignored");
        }
        TimeAttributes {
            occurrences_per_day: if self.timing.is_regular() {
                self.occurrences_per_day(common)
            } else {
                0.0
            },
            active_years: self.active_years(),
            ignored,
        }
    }
}

/// Read a `year,month,day,...` date array.
fn read_date<C: ConfigFacts + ?Sized>(config: &C, section: &str, option: &str) -> DataszResult<NaiveDate> {
    let values = config.integer_array(section, option)?;
    let raw = config.require(section, option)?;
    let [year, month, day, ..] = values.as_slice() else {
        return Err(DataszError::invalid(section, option, raw, "expected year, month and day"));
    };
    let date = i32::try_from(*year).ok().and_then(|year| {
        NaiveDate::from_ymd_opt(year, u32::try_from(*month).ok()?, u32::try_from(*day).ok()?)
    });
    date.ok_or_else(|| DataszError::invalid(section, option, raw, "not a calendar date"))
}

/// Attributes of every active time profile named in `wanted`.
pub fn resolve_times<C: ConfigFacts + ?Sized>(
    config: &C,
    wanted: &BTreeSet<&str>,
    common: &CommonParameters,
) -> DataszResult<BTreeMap<String, TimeAttributes>> {
    let mut resolved = BTreeMap::new();
    for section in config.sections_with_prefix(TIME_PREFIX) {
        let name = config.character(section, "tim_name")?;
        if !wanted.contains(name.as_str()) {
            continue;
        }
        let profile = TimeProfile::from_config(config, section)?;
        let attributes = profile.attributes(common);
        debug!(
            time = %profile.name,
            per_day = attributes.occurrences_per_day,
            ignored = attributes.ignored,
            "Resolved time profile"
        );
        resolved.insert(name, attributes);
    }
    info!(times = resolved.len(), "Resolved time profiles");
    Ok(resolved)
}
