//! Domain profiles: vertical levels, horizontal area and spatial meaning.

use std::collections::{BTreeMap, BTreeSet};

use datasz_common::{DataszError, DataszResult};
use rose_config::ConfigFacts;
use serde::Serialize;
use tracing::{debug, info, warn};

const DOMAIN_PREFIX: &str = "namelist:domain(";

/// How a domain selects its vertical levels (`iopl`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSelection {
    /// Single or unspecified level, optionally with pseudo levels.
    Unspecified,
    /// Model rho or theta levels.
    ModelLevels,
    /// Pressure, height, theta, PV or cloud-threshold levels from a real list.
    RealLevels,
    DeepSoil,
    Unrecognised(Option<i64>),
}

impl LevelSelection {
    /// Classify `iopl`, honouring the conditions attached to codes 2, 9 and 6.
    ///
    /// Code 2 only selects model levels when `imn` is active, code 9 only
    /// selects real levels when `rlevlst` is active, and code 6 only selects
    /// deep soil levels when `levt` is active. Code 1 selects model levels
    /// unconditionally.
    pub fn classify(
        iopl: Option<i64>,
        imn_active: bool,
        rlevlst_active: bool,
        levt_active: bool,
    ) -> Self {
        match iopl {
            Some(5) => Self::Unspecified,
            Some(1) => Self::ModelLevels,
            Some(2) if imn_active => Self::ModelLevels,
            Some(3 | 4 | 7 | 8) => Self::RealLevels,
            Some(9) if rlevlst_active => Self::RealLevels,
            Some(6) if levt_active => Self::DeepSoil,
            other => Self::Unrecognised(other),
        }
    }
}

/// Horizontal area of a domain (`iopa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaSelection {
    Global,
    /// Northern or southern hemisphere.
    Hemisphere,
    /// 90N-30N, 30S-90S or 30S-30N.
    LatitudeThird,
    /// 30N-0 or 0-30S.
    LatitudeSixth,
    /// Specified area; sized as the full grid.
    LimitedArea,
    Unrecognised(i64),
}

impl AreaSelection {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Global,
            2 | 3 => Self::Hemisphere,
            4 | 5 | 8 => Self::LatitudeThird,
            6 | 7 => Self::LatitudeSixth,
            9 | 10 => Self::LimitedArea,
            other => Self::Unrecognised(other),
        }
    }

    /// Divisors applied to (row length, rows).
    pub fn divisors(self) -> (u64, u64) {
        match self {
            Self::Global | Self::LimitedArea | Self::Unrecognised(_) => (1, 1),
            Self::Hemisphere => (1, 2),
            Self::LatitudeThird => (1, 3),
            Self::LatitudeSixth => (1, 6),
        }
    }
}

/// Spatial meaning applied to a domain (`imn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanAxis {
    None,
    Vertical,
    /// Zonal mean: the longitude axis collapses to one point.
    Zonal,
    /// Meridional mean: the latitude axis collapses to one point.
    Meridional,
    Other(i64),
}

impl MeanAxis {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            None | Some(0) => Self::None,
            Some(1) => Self::Vertical,
            Some(2) => Self::Zonal,
            Some(3) => Self::Meridional,
            Some(other) => Self::Other(other),
        }
    }

    pub fn collapses_x(self) -> bool {
        self == Self::Zonal
    }

    pub fn collapses_y(self) -> bool {
        self == Self::Meridional
    }
}

/// A `namelist:domain(*)` section as far as output volume is concerned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainProfile {
    pub name: String,
    pub level_selection: LevelSelection,
    pub level_bottom: Option<i64>,
    pub level_top: Option<i64>,
    pub level_list: Option<Vec<i64>>,
    pub real_level_list: Option<Vec<f64>>,
    pub pseudo_level_list: Option<Vec<i64>>,
    pub area: AreaSelection,
    pub mean_axis: MeanAxis,
}

/// What a request inherits from its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomainAttributes {
    pub vertical_levels: u32,
    pub div_x: u64,
    pub div_y: u64,
    pub mean_axis: MeanAxis,
}

impl DomainProfile {
    pub fn from_config<C: ConfigFacts + ?Sized>(config: &C, section: &str) -> DataszResult<Self> {
        let iopl = config.opt_integer(section, "iopl")?;
        let level_selection = LevelSelection::classify(
            iopl,
            config.is_active(section, "imn"),
            config.is_active(section, "rlevlst"),
            config.is_active(section, "levt"),
        );

        let profile = Self {
            name: config.character(section, "dom_name")?,
            level_selection,
            level_bottom: config.opt_integer(section, "levb")?,
            level_top: config.opt_integer(section, "levt")?,
            level_list: config.opt_integer_array(section, "levlst")?,
            real_level_list: config.opt_real_array(section, "rlevlst")?,
            pseudo_level_list: config.opt_integer_array(section, "pslist")?,
            area: AreaSelection::from_code(config.integer(section, "iopa")?),
            mean_axis: MeanAxis::from_code(config.opt_integer(section, "imn")?),
        };

        if matches!(profile.level_selection, LevelSelection::ModelLevels)
            && profile.level_list.is_none()
            && profile.mean_axis != MeanAxis::Vertical
        {
            // Level range is mandatory here
            if profile.level_top.is_none() {
                return Err(DataszError::missing(section, "levt"));
            }
            if profile.level_bottom.is_none() {
                return Err(DataszError::missing(section, "levb"));
            }
        }
        Ok(profile)
    }

    pub fn vertical_levels(&self) -> u32 {
        let levels = match self.level_selection {
            LevelSelection::Unspecified => self.pseudo_level_list.as_deref().map_or(1, list_length),
            LevelSelection::ModelLevels => match (&self.level_list, self.mean_axis) {
                (Some(list), _) => list_length(list),
                (None, MeanAxis::Vertical) => 1,
                (None, _) => {
                    let top = self.level_top.unwrap_or(0);
                    let bottom = self.level_bottom.unwrap_or(0);
                    (top - bottom + 1).max(0) as usize
                }
            },
            LevelSelection::RealLevels => {
                self.real_level_list.as_deref().map_or(1, list_length)
            }
            LevelSelection::DeepSoil => self.level_top.unwrap_or(0).max(0) as usize,
            LevelSelection::Unrecognised(code) => {
                warn!(domain = %self.name, ?code, "Unrecognised level selection, no levels");
                0
            }
        };
        u32::try_from(levels).unwrap_or(u32::MAX)
    }

    pub fn attributes(&self) -> DomainAttributes {
        if let AreaSelection::Unrecognised(code) = self.area {
            warn!(domain = %self.name, code, "Unrecognised area selection, using the full grid");
        }
        let (div_x, div_y) = self.area.divisors();
        DomainAttributes {
            vertical_levels: self.vertical_levels(),
            div_x,
            div_y,
            mean_axis: self.mean_axis,
        }
    }
}

/// An empty list still counts as one level.
fn list_length<T>(list: &[T]) -> usize {
    list.len().max(1)
}

/// Attributes of every active domain profile named in `wanted`.
pub fn resolve_domains<C: ConfigFacts + ?Sized>(
    config: &C,
    wanted: &BTreeSet<&str>,
) -> DataszResult<BTreeMap<String, DomainAttributes>> {
    let mut resolved = BTreeMap::new();
    for section in config.sections_with_prefix(DOMAIN_PREFIX) {
        let name = config.character(section, "dom_name")?;
        if !wanted.contains(name.as_str()) {
            continue;
        }
        let profile = DomainProfile::from_config(config, section)?;
        let attributes = profile.attributes();
        debug!(
            domain = %profile.name,
            levels = attributes.vertical_levels,
            div_y = attributes.div_y,
            mean = ?attributes.mean_axis,
            "Resolved domain profile"
        );
        resolved.insert(name, attributes);
    }
    info!(domains = resolved.len(), "Resolved domain profiles");
    Ok(resolved)
}
