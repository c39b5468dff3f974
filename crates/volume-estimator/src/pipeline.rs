//! End-to-end estimate over a run configuration.

use std::collections::BTreeMap;

use datasz_common::{DataszError, DataszResult, PackingRatioLookup, RequestKey, StashMetadataLookup};
use rayon::prelude::*;
use rose_config::ConfigFacts;
use serde::Serialize;
use tracing::info;

use crate::aggregate::aggregate;
use crate::common::CommonParameters;
use crate::domain::{resolve_domains, DomainAttributes, MeanAxis};
use crate::report::VolumeReport;
use crate::requests::RequestCatalog;
use crate::time::{resolve_times, TimeAttributes};
use crate::usage::{Destination, UsageCatalog};
use crate::volume::{RequestEstimate, VolumeEstimator};

/// A diagnostic request with everything its profiles contribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub key: RequestKey,
    pub destination: Destination,
    pub vertical_levels: u32,
    pub div_x: u64,
    pub div_y: u64,
    pub mean_axis: MeanAxis,
    pub output_freq_per_day: f64,
    pub active_years: u32,
    pub ignored: bool,
}

/// Join every catalogued request with its usage, domain and time attributes.
///
/// A request naming a domain or time profile that does not exist is a
/// configuration error.
pub fn materialize_requests(
    catalog: &RequestCatalog,
    usage: &UsageCatalog,
    domains: &BTreeMap<String, DomainAttributes>,
    times: &BTreeMap<String, TimeAttributes>,
) -> DataszResult<Vec<Request>> {
    catalog
        .keys()
        .map(|key| {
            let section = catalog.section(key).unwrap_or_default();
            let profile = usage
                .get(&key.usage)
                .ok_or_else(|| unknown_profile(section, "use_name", &key.usage))?;
            let domain = domains
                .get(&key.domain)
                .ok_or_else(|| unknown_profile(section, "dom_name", &key.domain))?;
            let time = times
                .get(&key.time)
                .ok_or_else(|| unknown_profile(section, "tim_name", &key.time))?;

            Ok(Request {
                key: key.clone(),
                destination: profile.destination.clone(),
                vertical_levels: domain.vertical_levels,
                div_x: domain.div_x,
                div_y: domain.div_y,
                mean_axis: domain.mean_axis,
                output_freq_per_day: time.occurrences_per_day,
                active_years: time.active_years,
                ignored: time.ignored,
            })
        })
        .collect()
}

fn unknown_profile(section: &str, option: &str, name: &str) -> DataszError {
    DataszError::invalid(section, option, name, "no active profile with this name")
}

/// Run every stage and return the report.
///
/// Requests are sized in parallel; listings keep request-key order.
pub fn estimate<C, S, R>(
    config: &C,
    stash: &S,
    ratios: &R,
    price_per_tib: f64,
) -> DataszResult<VolumeReport>
where
    C: ConfigFacts + ?Sized,
    S: StashMetadataLookup + Sync + ?Sized,
    R: PackingRatioLookup + Sync + ?Sized,
{
    let common = CommonParameters::derive(config)?;
    let usage = UsageCatalog::build(config)?;
    let catalog = RequestCatalog::build(config, &usage, common.meaning.enabled)?;

    let domains = resolve_domains(config, &catalog.domain_names())?;
    let times = resolve_times(config, &catalog.time_names(), &common)?;
    let requests = materialize_requests(&catalog, &usage, &domains, &times)?;

    let estimator = VolumeEstimator::new(&common, stash, ratios);
    let estimates = requests
        .par_iter()
        .map(|request| estimator.estimate(request))
        .collect::<DataszResult<Vec<RequestEstimate>>>()?;

    let ignored = estimates
        .iter()
        .filter(|e| matches!(e, RequestEstimate::Ignored(_)))
        .count();
    info!(requests = estimates.len(), ignored, "Estimated request volumes");

    Ok(aggregate(&common, &usage, &estimates, price_per_tib))
}
