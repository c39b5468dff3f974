//! Field metadata readers.
//!
//! This crate provides the two metadata collaborators the estimator needs:
//! - [`StashMaster`]: grid and packing codes per (section, item), read from a
//!   `STASHmaster_A` file
//! - [`RatioTable`]: historical packing ratios, read from a plain-text database

pub mod master;
pub mod ratio;

pub use master::{StashMaster, STASHMASTER_FILE};
pub use ratio::RatioTable;
