//! Per-request volume estimation.
//!
//! All volumes are in 64-bit words of a 360-day calendar year. A request's
//! yearly output frequency decides which calendar periods it contributes to:
//!
//! | fields per year | day | month | quarter | year |
//! |-----------------|-----|-------|---------|------|
//! | >= 360          | 1   | 1     | 1       | 1    |
//! | 12 to 359       | 0   | 1     | 1       | 1    |
//! | 4               | 0   | 0     | 1       | 1    |
//! | 1               | 0   | 0     | 0       | 1    |
//! | anything else   | 0   | 0     | 0       | 0    |
//!
//! Frequencies outside these bands contribute nothing at any granularity;
//! such requests stay in the listings with zero size.

use datasz_common::{
    DataszError, DataszResult, PackingRatio, PackingRatioLookup, Period, PeriodValues,
    RequestKey, StashMetadataLookup, UNPACKED_PERCENT,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::common::CommonParameters;
use crate::domain::MeanAxis;
use crate::pipeline::Request;
use crate::usage::Destination;

/// Monthly means retained alongside seasonal and annual means.
const RETAINED_MONTHLY_MEANS: f64 = 5.0;

const RIVER_GRID: &str = "23";
const THETA_GRIDS: [&str; 2] = ["11", "19"];
const ZONAL_THETA_GRID: &str = "14";

/// 1 for every period a frequency contributes to, 0 otherwise.
pub fn calendar_factors(freq_per_year: f64) -> PeriodValues<f64> {
    let (day, month, quarter, year) = if freq_per_year >= 360.0 {
        (1.0, 1.0, 1.0, 1.0)
    } else if freq_per_year >= 12.0 {
        (0.0, 1.0, 1.0, 1.0)
    } else if freq_per_year == 4.0 {
        (0.0, 0.0, 1.0, 1.0)
    } else if freq_per_year == 1.0 {
        (0.0, 0.0, 0.0, 1.0)
    } else {
        (0.0, 0.0, 0.0, 0.0)
    };
    PeriodValues::new(day, month, quarter, year)
}

/// Points of one output field and its size rounded up to whole sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridDimensions {
    pub nx: u64,
    pub ny: u64,
    pub block_words: u64,
}

pub fn grid_dimensions(
    grid_code: &str,
    div_x: u64,
    div_y: u64,
    mean_axis: MeanAxis,
    common: &CommonParameters,
) -> GridDimensions {
    let grid_code = grid_code.trim();
    let (mut nx, mut ny) = if grid_code == RIVER_GRID {
        (common.river_row_length, common.river_rows)
    } else if common.uses_endgame_grid && THETA_GRIDS.contains(&grid_code) {
        (common.global_row_length, common.global_rows + 1)
    } else if common.uses_endgame_grid && grid_code == ZONAL_THETA_GRID {
        (1, common.global_rows + 1)
    } else {
        (common.global_row_length, common.global_rows)
    };

    // Partial areas keep their boundary row
    if div_y > 1 {
        ny = ny / div_y + 1;
    }
    if div_x > 1 {
        nx /= div_x;
    }
    if mean_axis.collapses_x() {
        nx = 1;
    }
    if mean_axis.collapses_y() {
        ny = 1;
    }

    let sector = common.sector_size.max(1);
    GridDimensions {
        nx,
        ny,
        block_words: (nx * ny).div_ceil(sector) * sector,
    }
}

/// Why a listed ratio differs from the one applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingFlag {
    /// Packable field with no historical ratio; assumed unpacked.
    NoHistoricalRatio,
    /// Single-column field; its ratio was not applied.
    SingleColumnUnpacked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestVolume {
    pub key: RequestKey,
    pub grid_code: String,
    pub packing_code: i32,
    pub nx: u64,
    pub ny: u64,
    pub levels: u32,
    pub active_years: u32,
    pub output_freq_per_day: f64,
    pub freq_per_year: f64,
    /// Average ratio found for the field, in percent.
    pub ratio: f64,
    pub flags: Vec<PackingFlag>,
    /// Stored words per period, packing applied.
    pub words: PeriodValues<f64>,
    pub unpacked_year_words: f64,
    pub fields: PeriodValues<f64>,
}

/// A request that is listed but not sized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IgnoredRequest {
    pub key: RequestKey,
    pub grid_code: String,
    pub packing_code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestEstimate {
    Measured(RequestVolume),
    Ignored(IgnoredRequest),
}

impl RequestEstimate {
    pub fn key(&self) -> &RequestKey {
        match self {
            Self::Measured(volume) => &volume.key,
            Self::Ignored(ignored) => &ignored.key,
        }
    }

    pub fn volume(&self) -> Option<&RequestVolume> {
        match self {
            Self::Measured(volume) => Some(volume),
            Self::Ignored(_) => None,
        }
    }
}

/// Sizes requests against field metadata and historical packing ratios.
pub struct VolumeEstimator<'a, S: ?Sized, R: ?Sized> {
    common: &'a CommonParameters,
    stash: &'a S,
    ratios: &'a R,
}

impl<'a, S, R> VolumeEstimator<'a, S, R>
where
    S: StashMetadataLookup + ?Sized,
    R: PackingRatioLookup + ?Sized,
{
    pub fn new(common: &'a CommonParameters, stash: &'a S, ratios: &'a R) -> Self {
        Self {
            common,
            stash,
            ratios,
        }
    }

    pub fn estimate(&self, request: &Request) -> DataszResult<RequestEstimate> {
        let code = request.key.code;
        let record = self.stash.lookup(code).ok_or_else(|| {
            DataszError::Metadata(format!("no record for {} requested by {}", code, request.key))
        })?;
        let packing_code = record.packing_code_value();

        if request.ignored {
            return Ok(RequestEstimate::Ignored(IgnoredRequest {
                key: request.key.clone(),
                grid_code: record.grid_code.clone(),
                packing_code,
            }));
        }

        let mut flags = Vec::new();
        let ratio = if record.is_unpackable() {
            PackingRatio::unpacked()
        } else if let Some(ratio) = self.ratios.lookup_ratio(code) {
            ratio
        } else {
            warn!(request = %request.key, "No historical packing ratio, assuming unpacked");
            flags.push(PackingFlag::NoHistoricalRatio);
            PackingRatio::unpacked()
        };

        let dims = grid_dimensions(
            &record.grid_code,
            request.div_x,
            request.div_y,
            request.mean_axis,
            self.common,
        );
        let applied_percent = if dims.nx > 1 {
            ratio.average
        } else {
            if ratio.average != UNPACKED_PERCENT {
                flags.push(PackingFlag::SingleColumnUnpacked);
            }
            UNPACKED_PERCENT
        };

        let is_mean = matches!(request.destination, Destination::MeanFile { .. });
        let mut freq_per_year = (request.output_freq_per_day * 360.0).round();
        if is_mean {
            if let Some(period) = self.common.first_meaning_period() {
                freq_per_year /= period as f64;
            }
        }
        let factors = calendar_factors(freq_per_year);

        let levels = f64::from(request.vertical_levels);
        let fields_year = levels * freq_per_year * factors.year;
        let unpacked_year = fields_year * dims.block_words as f64;
        let packed_year = unpacked_year * applied_percent / UNPACKED_PERCENT;

        let mut words = factors.map(|period, factor| {
            factor * packed_year / f64::from(period.per_year())
        });
        let fields = factors.map(|period, factor| {
            factor * fields_year / f64::from(period.per_year())
        });
        let mut unpacked_year_words = unpacked_year;
        if is_mean {
            let month = words.get(Period::Month);
            words.year += RETAINED_MONTHLY_MEANS * month;
            words.quarter += RETAINED_MONTHLY_MEANS * month;
            unpacked_year_words +=
                RETAINED_MONTHLY_MEANS * factors.month * unpacked_year / 12.0;
        }

        debug!(
            request = %request.key,
            nx = dims.nx,
            ny = dims.ny,
            levels = request.vertical_levels,
            freq_per_year,
            year_words = words.year,
            "Estimated request volume"
        );

        Ok(RequestEstimate::Measured(RequestVolume {
            key: request.key.clone(),
            grid_code: record.grid_code.clone(),
            packing_code,
            nx: dims.nx,
            ny: dims.ny,
            levels: request.vertical_levels,
            active_years: request.active_years,
            output_freq_per_day: request.output_freq_per_day,
            freq_per_year,
            ratio: ratio.average,
            flags,
            words,
            unpacked_year_words,
            fields,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::ReinitUnit;
    use datasz_common::{StashCode, StashRecord};
    use std::collections::BTreeMap;

    fn common(meaning_periods: [u64; 4]) -> CommonParameters {
        CommonParameters {
            steps_per_period: 72,
            seconds_per_period: 86_400,
            steps_per_day: 72.0,
            dump_freq_steps: 720.0,
            meaning: crate::common::MeaningSettings {
                enabled: meaning_periods[0] > 0,
                select: [1, 1, 1, 0],
                frequency: [3, 3, 4, 10],
                periods: meaning_periods,
                file_bases: Default::default(),
            },
            global_row_length: 96,
            global_rows: 73,
            river_row_length: 360,
            river_rows: 180,
            uses_endgame_grid: true,
            sector_size: 512,
            run_length_days: 360,
        }
    }

    fn stash() -> BTreeMap<StashCode, StashRecord> {
        [
            (0, 24, "1", "-1"),
            (0, 2, "18", "-14"),
            (0, 3, "19", "-99"),
            (26, 4, "23", "-6"),
            (0, 30, "14", "-3"),
        ]
        .into_iter()
        .map(|(section, item, grid, packing)| {
            let code = StashCode::new(section, item);
            let record = StashRecord {
                code,
                name: String::new(),
                grid_code: grid.to_string(),
                packing_code: packing.to_string(),
            };
            (code, record)
        })
        .collect()
    }

    fn ratios() -> BTreeMap<StashCode, PackingRatio> {
        BTreeMap::from([
            (StashCode::new(0, 24), PackingRatio::from_bounds(35.0, 25.0)),
            (StashCode::new(0, 3), PackingRatio::from_bounds(50.0, 50.0)),
        ])
    }

    fn stream_request(section: u16, item: u16, per_day: f64) -> Request {
        Request {
            key: RequestKey::new(StashCode::new(section, item), "DIAG", "T", "UPA"),
            destination: Destination::Stream {
                stream_number: 4,
                file_id: "pp4".into(),
                reinit_interval: 0,
                reinit_unit: ReinitUnit::None,
            },
            vertical_levels: 1,
            div_x: 1,
            div_y: 1,
            mean_axis: MeanAxis::None,
            output_freq_per_day: per_day,
            active_years: 0,
            ignored: false,
        }
    }

    fn measured(estimate: RequestEstimate) -> RequestVolume {
        match estimate {
            RequestEstimate::Measured(volume) => volume,
            other => panic!("expected a measured request, got {:?}", other),
        }
    }

    #[test]
    fn test_calendar_factor_cascade() {
        for freq in [360.0, 361.0, 1440.0, 8640.0] {
            assert_eq!(calendar_factors(freq), PeriodValues::splat(1.0), "freq {}", freq);
        }
        for freq in [12.0, 36.0, 359.0] {
            assert_eq!(calendar_factors(freq), PeriodValues::new(0.0, 1.0, 1.0, 1.0));
        }
        assert_eq!(calendar_factors(4.0), PeriodValues::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(calendar_factors(1.0), PeriodValues::new(0.0, 0.0, 0.0, 1.0));
        // Between the breakpoints nothing is counted
        for freq in [0.0, 0.4, 2.0, 3.0, 5.0, 6.0, 11.0, 11.9] {
            assert!(calendar_factors(freq).is_zero(), "freq {}", freq);
        }
    }

    #[test]
    fn test_grid_dimensions_by_grid_code() {
        let common = common([0; 4]);
        let global = grid_dimensions("1", 1, 1, MeanAxis::None, &common);
        assert_eq!((global.nx, global.ny, global.block_words), (96, 73, 7168));

        let river = grid_dimensions("23", 1, 1, MeanAxis::None, &common);
        assert_eq!((river.nx, river.ny, river.block_words), (360, 180, 65_024));

        let theta = grid_dimensions("19", 1, 1, MeanAxis::None, &common);
        assert_eq!((theta.nx, theta.ny), (96, 74));

        let zonal = grid_dimensions("14", 1, 1, MeanAxis::None, &common);
        assert_eq!((zonal.nx, zonal.ny, zonal.block_words), (1, 74, 512));

        let mut nd = common.clone();
        nd.uses_endgame_grid = false;
        let theta_nd = grid_dimensions("19", 1, 1, MeanAxis::None, &nd);
        assert_eq!((theta_nd.nx, theta_nd.ny), (96, 73));
    }

    #[test]
    fn test_grid_dimensions_area_and_mean() {
        let common = common([0; 4]);
        let hemisphere = grid_dimensions("1", 1, 2, MeanAxis::None, &common);
        assert_eq!((hemisphere.nx, hemisphere.ny), (96, 37));

        let sixth = grid_dimensions("1", 1, 6, MeanAxis::None, &common);
        assert_eq!(sixth.ny, 13);

        let zonal_mean = grid_dimensions("1", 1, 1, MeanAxis::Zonal, &common);
        assert_eq!((zonal_mean.nx, zonal_mean.ny), (1, 73));

        let meridional_mean = grid_dimensions("1", 1, 1, MeanAxis::Meridional, &common);
        assert_eq!((meridional_mean.nx, meridional_mean.ny), (96, 1));
    }

    #[test]
    fn test_block_words_are_whole_sectors() {
        let common = common([0; 4]);
        for div_y in [1, 2, 3, 6] {
            let dims = grid_dimensions("1", 1, div_y, MeanAxis::None, &common);
            assert_eq!(dims.block_words % common.sector_size, 0);
            assert!(dims.block_words >= dims.nx * dims.ny);
        }
    }

    #[test]
    fn test_daily_packed_field() {
        let common = common([0; 4]);
        let (stash, ratios) = (stash(), ratios());
        let estimator = VolumeEstimator::new(&common, &stash, &ratios);

        let request = stream_request(0, 24, 1.0);
        let volume = measured(estimator.estimate(&request).unwrap());

        // 96x73 = 7008 points in 7168 words, 360 fields, 30% packing
        assert_eq!(volume.words.year, 774_144.0);
        assert_eq!(volume.words.day, 2_150.4);
        assert_eq!(volume.unpacked_year_words, 2_580_480.0);
        assert_eq!(volume.fields.year, 360.0);
        assert!(volume.flags.is_empty());
    }

    #[test]
    fn test_unsupported_frequency_is_listed_with_zero_size() {
        let common = common([0; 4]);
        let (stash, ratios) = (stash(), ratios());
        let estimator = VolumeEstimator::new(&common, &stash, &ratios);

        // Every 180 days: twice a year
        let volume = measured(estimator.estimate(&stream_request(0, 24, 1.0 / 180.0)).unwrap());
        assert_eq!(volume.freq_per_year, 2.0);
        assert!(volume.words.is_zero());
        assert!(volume.fields.is_zero());
        assert_eq!(volume.nx, 96);
    }

    #[test]
    fn test_unpackable_code_ignores_historical_ratio() {
        let common = common([0; 4]);
        let (stash, ratios) = (stash(), ratios());
        let estimator = VolumeEstimator::new(&common, &stash, &ratios);

        let volume = measured(estimator.estimate(&stream_request(0, 3, 1.0)).unwrap());
        assert_eq!(volume.ratio, 100.0);
        assert_eq!(volume.words.year, volume.unpacked_year_words);
        assert!(volume.flags.is_empty());
    }

    #[test]
    fn test_missing_ratio_defaults_to_unpacked() {
        let common = common([0; 4]);
        let (stash, ratios) = (stash(), ratios());
        let estimator = VolumeEstimator::new(&common, &stash, &ratios);

        let volume = measured(estimator.estimate(&stream_request(0, 2, 1.0)).unwrap());
        assert_eq!(volume.ratio, 100.0);
        assert_eq!(volume.flags, vec![PackingFlag::NoHistoricalRatio]);
        assert_eq!(volume.words.year, volume.unpacked_year_words);
    }

    #[test]
    fn test_single_column_is_never_packed() {
        let common = common([0; 4]);
        let (stash, ratios) = (stash(), ratios());
        let estimator = VolumeEstimator::new(&common, &stash, &ratios);

        let mut request = stream_request(0, 24, 1.0);
        request.mean_axis = MeanAxis::Zonal;
        let volume = measured(estimator.estimate(&request).unwrap());
        assert_eq!(volume.nx, 1);
        assert_eq!(volume.ratio, 30.0);
        assert_eq!(volume.flags, vec![PackingFlag::SingleColumnUnpacked]);
        assert_eq!(volume.words.year, 512.0 * 360.0);
    }

    #[test]
    fn test_zero_levels_contribute_nothing() {
        let common = common([0; 4]);
        let (stash, ratios) = (stash(), ratios());
        let estimator = VolumeEstimator::new(&common, &stash, &ratios);

        let mut request = stream_request(0, 24, 1.0);
        request.vertical_levels = 0;
        let volume = measured(estimator.estimate(&request).unwrap());
        assert!(volume.words.is_zero());
        assert_eq!(volume.unpacked_year_words, 0.0);
    }

    #[test]
    fn test_mean_request_frequency_and_retained_months() {
        let common = common([30, 90, 360, 0]);
        let (stash, ratios) = (stash(), ratios());
        let estimator = VolumeEstimator::new(&common, &stash, &ratios);

        let mut request = stream_request(0, 3, 1.0);
        request.destination = Destination::MeanFile { meaning_tag: 1 };
        let volume = measured(estimator.estimate(&request).unwrap());

        // 360 per year over 30-day meaning: 12 fields of 7168 words, unpacked
        assert_eq!(volume.freq_per_year, 12.0);
        let month = 7168.0;
        assert_eq!(volume.words.month, month);
        assert_eq!(volume.words.day, 0.0);
        assert_eq!(volume.words.quarter, 3.0 * month + 5.0 * month);
        assert_eq!(volume.words.year, 12.0 * month + 5.0 * month);
        assert_eq!(volume.unpacked_year_words, 17.0 * month);
    }

    #[test]
    fn test_ignored_request_is_not_sized() {
        let common = common([0; 4]);
        let (stash, ratios) = (stash(), ratios());
        let estimator = VolumeEstimator::new(&common, &stash, &ratios);

        let mut request = stream_request(26, 4, 1.0);
        request.ignored = true;
        let estimate = estimator.estimate(&request).unwrap();
        assert_eq!(
            estimate,
            RequestEstimate::Ignored(IgnoredRequest {
                key: request.key.clone(),
                grid_code: "23".into(),
                packing_code: -6,
            })
        );
        assert!(estimate.volume().is_none());
    }

    #[test]
    fn test_unknown_code_is_a_metadata_error() {
        let common = common([0; 4]);
        let (stash, ratios) = (stash(), ratios());
        let estimator = VolumeEstimator::new(&common, &stash, &ratios);

        let err = estimator.estimate(&stream_request(99, 999, 1.0)).unwrap_err();
        assert!(matches!(err, DataszError::Metadata(_)));
    }
}
