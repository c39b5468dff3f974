//! Command-line front end for the volume estimator.
//!
//! Loads the run configuration, STASHmaster and packing-ratio database,
//! runs the estimate and renders it.

pub mod render;
pub mod settings;

use std::path::Path;

use anyhow::{Context, Result};
use rose_config::RoseConfig;
use stashmaster::{RatioTable, StashMaster};
use tracing::info;
use volume_estimator::VolumeReport;

use crate::render::{render_json, OutputFormat, TextReport};
use crate::settings::ResolvedSettings;

/// Run the estimate for the configuration at `config_path`.
pub fn run_estimate(config_path: &Path, settings: &ResolvedSettings) -> Result<VolumeReport> {
    let config = RoseConfig::from_path(config_path)
        .with_context(|| format!("Failed to load run configuration {:?}", config_path))?;
    let stash = StashMaster::from_dir(&settings.stash_dir)
        .with_context(|| format!("Failed to load STASHmaster from {:?}", settings.stash_dir))?;
    let ratios = match &settings.ratio_db {
        Some(path) => RatioTable::from_path(path)
            .with_context(|| format!("Failed to load packing ratios from {:?}", path))?,
        None => RatioTable::default(),
    };

    info!(
        config = %config_path.display(),
        stash_records = stash.len(),
        ratios = ratios.len(),
        "Inputs loaded"
    );

    let report = volume_estimator::estimate(&config, &stash, &ratios, settings.price_per_tib)
        .with_context(|| format!("Failed to estimate output volume for {:?}", config_path))?;
    Ok(report)
}

/// Run the estimate and render it in the chosen format.
pub fn execute(config_path: &Path, settings: &ResolvedSettings, format: OutputFormat) -> Result<String> {
    let report = run_estimate(config_path, settings)?;
    match format {
        OutputFormat::Text => Ok(TextReport::new(&report, &settings.currency).to_string()),
        OutputFormat::Json => render_json(&report).context("Failed to serialise report"),
    }
}
