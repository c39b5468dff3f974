//! Run-configuration reader.
//!
//! Parses the INI-like `rose-app.conf` format used by model suites and
//! exposes the content through the [`ConfigFacts`] trait: typed, per
//! (section, option) access with "missing configuration item" failures for
//! mandatory settings.

pub mod facts;
pub mod parser;

pub use facts::ConfigFacts;
pub use parser::{ConfigOption, ConfigSection, RoseConfig};
