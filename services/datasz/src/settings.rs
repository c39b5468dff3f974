//! Tool settings: an optional YAML file overridden by command-line flags.
//!
//! ```yaml
//! stash_dir: $UMDIR/vn10.3/ctldata/STASHmaster
//! ratio_db: ~/data/DB_ratio
//! price_per_tib: 85.0
//! currency: GBP
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PRICE_PER_TIB: f64 = 85.0;
pub const DEFAULT_CURRENCY: &str = "GBP";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub stash_dir: Option<String>,
    pub ratio_db: Option<String>,
    pub price_per_tib: f64,
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stash_dir: None,
            ratio_db: None,
            price_per_tib: DEFAULT_PRICE_PER_TIB,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Values given on the command line; `None` keeps the settings file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub stash_dir: Option<String>,
    pub ratio_db: Option<String>,
    pub price_per_tib: Option<f64>,
}

/// Settings with overrides applied and paths expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub stash_dir: PathBuf,
    pub ratio_db: Option<PathBuf>,
    pub price_per_tib: f64,
    pub currency: String,
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse settings from {:?}", path.as_ref()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn resolve(self, overrides: Overrides) -> Result<ResolvedSettings> {
        let stash_dir = overrides
            .stash_dir
            .or(self.stash_dir)
            .ok_or_else(|| anyhow!("No STASHmaster directory given (use --stash-dir or DATASZ_STASH_DIR)"))?;
        let ratio_db = overrides.ratio_db.or(self.ratio_db);
        let price_per_tib = overrides.price_per_tib.unwrap_or(self.price_per_tib);
        if !price_per_tib.is_finite() || price_per_tib < 0.0 {
            return Err(anyhow!("Storage price must be a non-negative number, got {}", price_per_tib));
        }

        Ok(ResolvedSettings {
            stash_dir: expand_path(&stash_dir)?,
            ratio_db: ratio_db.as_deref().map(expand_path).transpose()?,
            price_per_tib,
            currency: self.currency,
        })
    }
}

/// Expand `~` and `$VAR` / `${VAR}` in a path.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).with_context(|| format!("Cannot expand path {}", raw))?;
    Ok(PathBuf::from(expanded.into_owned()))
}
