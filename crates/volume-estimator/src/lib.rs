//! Diagnostic output volume and storage-cost estimator.
//!
//! Given a run configuration and field metadata, estimates how much data each
//! output stream and climate-meaning file will hold per day, month, quarter
//! and year, and what storing a year of it costs. Nothing is run: the
//! estimate is derived from the configuration alone.
//!
//! The pipeline is a chain of pure stages, each returning a new value:
//!
//! 1. [`CommonParameters::derive`] - run-wide scalars
//! 2. [`UsageCatalog::build`] - output destinations and header geometry
//! 3. [`RequestCatalog::build`] - diagnostic requests bound to those destinations
//! 4. [`resolve_domains`] / [`resolve_times`] - levels, area and frequency per profile
//! 5. [`materialize_requests`] - fully attributed [`Request`] records
//! 6. [`VolumeEstimator`] - per-request volumes
//! 7. [`aggregate`] - per-stream and per-meaning-file totals and cost
//!
//! [`estimate`] runs all of them.

pub mod aggregate;
pub mod common;
pub mod domain;
pub mod pipeline;
pub mod report;
pub mod requests;
pub mod time;
pub mod usage;
pub mod volume;

pub use aggregate::aggregate;
pub use common::{CommonParameters, DumpFrequencyUnit, MeaningSettings};
pub use domain::{resolve_domains, AreaSelection, DomainAttributes, DomainProfile, LevelSelection, MeanAxis};
pub use pipeline::{estimate, materialize_requests, Request};
pub use report::{
    FileGeometry, ListingEntry, MeanFileReport, StreamReport, VolumeReport, VolumeSummary,
};
pub use requests::RequestCatalog;
pub use time::{resolve_times, IntervalUnit, OutputTiming, TimeAttributes, TimeProcessing, TimeProfile};
pub use usage::{Destination, ReinitUnit, UsageCatalog, UsageProfile};
pub use volume::{
    calendar_factors, grid_dimensions, GridDimensions, IgnoredRequest, PackingFlag,
    RequestEstimate, RequestVolume, VolumeEstimator,
};
