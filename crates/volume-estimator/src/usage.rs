//! Usage profiles: where a request's output goes and what the file header costs.

use std::collections::BTreeMap;

use datasz_common::{DataszError, DataszResult};
use rose_config::ConfigFacts;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Fields-file pages are 512 KiB; data starts on a page boundary.
pub const PAGE_SIZE_BYTES: u64 = 524_288;

/// Words in the fixed-length header of a fields file.
pub const FIXED_HEADER_WORDS: u64 = 1_028;

/// Words in one lookup-table entry.
pub const LOOKUP_ENTRY_WORDS: u64 = 64;

/// Smallest lookup table the model writes, whatever the profile declares.
pub const MIN_RESERVED_HEADERS: u64 = 4_096;

const USE_PREFIX: &str = "namelist:use(";

/// Destination codes of `namelist:use(*)/locn` this estimator handles.
const LOCN_MEAN_FILE: i64 = 2;
const LOCN_STREAM: i64 = 3;

/// Unit of a stream's reinitialisation interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReinitUnit {
    None,
    Hour,
    Day,
    Timestep,
    RealMonth,
}

impl ReinitUnit {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Hour),
            2 => Some(Self::Day),
            3 => Some(Self::Timestep),
            4 => Some(Self::RealMonth),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Timestep => "time step",
            Self::RealMonth => "real month",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// A numbered fields-file stream, e.g. `pp5`.
    Stream {
        stream_number: u32,
        file_id: String,
        reinit_interval: i64,
        reinit_unit: ReinitUnit,
    },
    /// A climate-meaning file identified by its meaning tag.
    MeanFile { meaning_tag: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageProfile {
    pub name: String,
    pub section: String,
    pub destination: Destination,
    pub reserved_headers: u64,
    /// Word offset of the first data field.
    pub data_start_words: u64,
    /// Header words of a file holding no fields.
    pub header_words_no_data: u64,
}

impl UsageProfile {
    pub fn new(
        name: impl Into<String>,
        section: impl Into<String>,
        destination: Destination,
        declared_headers: u64,
    ) -> Self {
        let reserved_headers = declared_headers.max(MIN_RESERVED_HEADERS);
        let header_words_no_data = FIXED_HEADER_WORDS + reserved_headers * LOOKUP_ENTRY_WORDS;
        let pages = (header_words_no_data * 8).div_ceil(PAGE_SIZE_BYTES);
        let data_start_words = (pages * PAGE_SIZE_BYTES / 8).max(PAGE_SIZE_BYTES / 8);

        Self {
            name: name.into(),
            section: section.into(),
            destination,
            reserved_headers,
            data_start_words,
            header_words_no_data,
        }
    }

    pub fn is_mean_file(&self) -> bool {
        matches!(self.destination, Destination::MeanFile { .. })
    }

    /// Number of files a stream opens per day, when it is reinitialised
    /// every `n <= 24` hours.
    pub fn files_per_day_cap(&self) -> Option<f64> {
        match &self.destination {
            Destination::Stream {
                reinit_interval,
                reinit_unit: ReinitUnit::Hour,
                ..
            } if (1..=24).contains(reinit_interval) => Some(24.0 / *reinit_interval as f64),
            _ => None,
        }
    }
}

/// Active usage profiles that target a stream or a mean file, by `use_name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageCatalog {
    profiles: BTreeMap<String, UsageProfile>,
}

impl UsageCatalog {
    pub fn build<C: ConfigFacts + ?Sized>(config: &C) -> DataszResult<Self> {
        let mut profiles = BTreeMap::new();

        for section in config.sections_with_prefix(USE_PREFIX) {
            let locn = config.integer(section, "locn")?;
            let destination = match locn {
                LOCN_STREAM => stream_destination(config, section)?,
                LOCN_MEAN_FILE => {
                    let tag = config.integer(section, "macrotag")?;
                    let meaning_tag = u32::try_from(tag).map_err(|_| {
                        DataszError::invalid(section, "macrotag", &tag.to_string(), "must not be negative")
                    })?;
                    Destination::MeanFile { meaning_tag }
                }
                other => {
                    debug!(section, locn = other, "Skipping usage profile with unhandled destination");
                    continue;
                }
            };

            let declared_headers = match &destination {
                Destination::Stream { file_id, .. } => {
                    let stream_section = stream_section(file_id);
                    let value = config.integer(&stream_section, "reserved_headers")?;
                    value.max(0) as u64
                }
                Destination::MeanFile { .. } => 0,
            };

            let name = config.character(section, "use_name")?;
            let profile = UsageProfile::new(name.clone(), section, destination, declared_headers);
            debug!(
                usage = %profile.name,
                data_start = profile.data_start_words,
                header_no_data = profile.header_words_no_data,
                "Classified usage profile"
            );
            if profiles.insert(name.clone(), profile).is_some() {
                warn!(usage = %name, section, "Duplicate use_name, keeping the last profile");
            }
        }

        info!(profiles = profiles.len(), "Built usage catalog");
        Ok(Self { profiles })
    }

    pub fn get(&self, name: &str) -> Option<&UsageProfile> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<UsageProfile> for UsageCatalog {
    fn from_iter<I: IntoIterator<Item = UsageProfile>>(iter: I) -> Self {
        Self {
            profiles: iter
                .into_iter()
                .map(|profile| (profile.name.clone(), profile))
                .collect(),
        }
    }
}

fn stream_section(file_id: &str) -> String {
    format!("namelist:nlstcall_pp({})", file_id)
}

fn stream_destination<C: ConfigFacts + ?Sized>(
    config: &C,
    section: &str,
) -> DataszResult<Destination> {
    let file_id = config.character(section, "file_id")?;
    let stream_number = file_id
        .trim_start_matches("pp")
        .parse::<u32>()
        .map_err(|_| DataszError::invalid(section, "file_id", &file_id, "expected ppN"))?;

    let stream_section = stream_section(&file_id);
    let reinit_interval = config.integer(&stream_section, "reinit_step")?;
    let unit_code = config.integer(&stream_section, "reinit_unit")?;
    let reinit_unit = ReinitUnit::from_code(unit_code).ok_or_else(|| {
        DataszError::invalid(&stream_section, "reinit_unit", &unit_code.to_string(), "expected 0 to 4")
    })?;

    Ok(Destination::Stream {
        stream_number,
        file_id,
        reinit_interval,
        reinit_unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rose_config::RoseConfig;

    fn stream(number: u32, interval: i64, unit: ReinitUnit) -> Destination {
        Destination::Stream {
            stream_number: number,
            file_id: format!("pp{}", number),
            reinit_interval: interval,
            reinit_unit: unit,
        }
    }

    #[test]
    fn test_header_geometry_minimum_headers() {
        let profile = UsageProfile::new("UPM", "s", stream(5, 1, ReinitUnit::RealMonth), 0);
        assert_eq!(profile.reserved_headers, 4096);
        assert_eq!(profile.header_words_no_data, 263_172);
        assert_eq!(profile.data_start_words, 327_680);
    }

    #[test]
    fn test_header_geometry_large_lookup() {
        let profile = UsageProfile::new("UP6", "s", stream(6, 6, ReinitUnit::Hour), 8000);
        assert_eq!(profile.header_words_no_data, 513_028);
        assert_eq!(profile.data_start_words, 524_288);
        assert!(profile.data_start_words >= profile.reserved_headers);
    }

    #[test]
    fn test_files_per_day_cap() {
        let six_hourly = UsageProfile::new("a", "s", stream(6, 6, ReinitUnit::Hour), 0);
        assert_eq!(six_hourly.files_per_day_cap(), Some(4.0));

        let two_daily = UsageProfile::new("b", "s", stream(7, 48, ReinitUnit::Hour), 0);
        assert_eq!(two_daily.files_per_day_cap(), None);

        let daily = UsageProfile::new("c", "s", stream(8, 1, ReinitUnit::Day), 0);
        assert_eq!(daily.files_per_day_cap(), None);

        let mean = UsageProfile::new("d", "s", Destination::MeanFile { meaning_tag: 1 }, 0);
        assert_eq!(mean.files_per_day_cap(), None);
        assert!(mean.is_mean_file());
    }

    #[test]
    fn test_build_classifies_destinations() {
        let config = RoseConfig::parse(
            "[namelist:use(a)]\nfile_id='pp7'\nlocn=3\nuse_name='UPA'\n\n\
             [namelist:nlstcall_pp(pp7)]\nfile_id='pp7'\nreinit_step=10\nreinit_unit=2\nreserved_headers=5000\n\n\
             [namelist:use(b)]\nlocn=2\nmacrotag=3\nuse_name='UPMEAN'\n\n\
             [namelist:use(c)]\nlocn=1\nuse_name='UPDUMP'\n\n\
             [!namelist:use(d)]\nlocn=3\nfile_id='pp9'\nuse_name='UPOFF'\n",
        )
        .unwrap();
        let catalog = UsageCatalog::build(&config).unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(!catalog.contains("UPDUMP"));
        assert!(!catalog.contains("UPOFF"));

        let upa = catalog.get("UPA").unwrap();
        assert_eq!(upa.destination, stream(7, 10, ReinitUnit::Day));
        assert_eq!(upa.reserved_headers, 5000);

        let mean = catalog.get("UPMEAN").unwrap();
        assert_eq!(mean.destination, Destination::MeanFile { meaning_tag: 3 });
        assert_eq!(mean.reserved_headers, MIN_RESERVED_HEADERS);
    }

    #[test]
    fn test_build_requires_stream_settings() {
        let config = RoseConfig::parse(
            "[namelist:use(a)]\nfile_id='pp7'\nlocn=3\nuse_name='UPA'\n",
        )
        .unwrap();
        let err = UsageCatalog::build(&config).unwrap_err();
        assert_eq!(err, DataszError::missing("namelist:nlstcall_pp(pp7)", "reinit_step"));
    }

    #[test]
    fn test_build_rejects_bad_file_id() {
        let config = RoseConfig::parse(
            "[namelist:use(a)]\nfile_id='stream'\nlocn=3\nuse_name='UPA'\n",
        )
        .unwrap();
        let err = UsageCatalog::build(&config).unwrap_err();
        assert!(matches!(err, DataszError::InvalidConfig { .. }));
    }
}
