//! Diagnostic requests bound to a catalogued usage profile.

use std::collections::{BTreeMap, BTreeSet};

use datasz_common::{DataszError, DataszResult, RequestKey, StashCode};
use rose_config::ConfigFacts;
use tracing::{debug, info};

use crate::usage::UsageCatalog;

const STREQ_PREFIX: &str = "namelist:streq(";

/// Every active request whose usage profile is in the [`UsageCatalog`],
/// keyed by (section, item, domain, time, usage) and ordered by that key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestCatalog {
    requests: BTreeMap<RequestKey, String>,
}

impl RequestCatalog {
    /// Requests to unknown usage profiles are dropped. So are requests to
    /// mean files when climate meaning is off.
    pub fn build<C: ConfigFacts + ?Sized>(
        config: &C,
        usage: &UsageCatalog,
        meaning_enabled: bool,
    ) -> DataszResult<Self> {
        let mut requests = BTreeMap::new();
        let mut dropped = 0usize;

        for section in config.sections_with_prefix(STREQ_PREFIX) {
            let use_name = config.character(section, "use_name")?;
            let Some(profile) = usage.get(&use_name) else {
                debug!(section, usage = %use_name, "Dropping request to an uncatalogued usage profile");
                dropped += 1;
                continue;
            };
            if profile.is_mean_file() && !meaning_enabled {
                debug!(section, usage = %use_name, "Dropping mean request, climate meaning is off");
                dropped += 1;
                continue;
            }

            let code = StashCode::new(
                stash_index(config, section, "isec")?,
                stash_index(config, section, "item")?,
            );
            let key = RequestKey::new(
                code,
                config.character(section, "dom_name")?,
                config.character(section, "tim_name")?,
                use_name,
            );
            requests.insert(key, section.to_string());
        }

        info!(requests = requests.len(), dropped, "Built request catalog");
        Ok(Self { requests })
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RequestKey> {
        self.requests.keys()
    }

    /// Configuration section a request was read from.
    pub fn section(&self, key: &RequestKey) -> Option<&str> {
        self.requests.get(key).map(String::as_str)
    }

    pub fn domain_names(&self) -> BTreeSet<&str> {
        self.requests.keys().map(|key| key.domain.as_str()).collect()
    }

    pub fn time_names(&self) -> BTreeSet<&str> {
        self.requests.keys().map(|key| key.time.as_str()).collect()
    }
}

fn stash_index<C: ConfigFacts + ?Sized>(config: &C, section: &str, option: &str) -> DataszResult<u16> {
    let value = config.integer(section, option)?;
    u16::try_from(value)
        .map_err(|_| DataszError::invalid(section, option, &value.to_string(), "expected 0 to 65535"))
}
