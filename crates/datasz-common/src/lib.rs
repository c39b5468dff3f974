//! Common types and utilities shared across the data-size estimator crates.

pub mod error;
pub mod period;
pub mod request;
pub mod stash;

pub use error::{DataszError, DataszResult};
pub use period::{Period, PeriodValues};
pub use request::RequestKey;
pub use stash::{
    PackingRatio, PackingRatioLookup, StashCode, StashMetadataLookup, StashRecord,
    NO_PACKING_CODE, UNPACKED_PERCENT,
};
