//! Diagnostic request identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::StashCode;

/// Key of one diagnostic request: what is output, where, when, and to which file.
///
/// Ordering is lexicographic over (section, item, domain, time, usage), which
/// fixes the order of every per-stream listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    pub code: StashCode,
    pub domain: String,
    pub time: String,
    pub usage: String,
}

impl RequestKey {
    pub fn new(
        code: StashCode,
        domain: impl Into<String>,
        time: impl Into<String>,
        usage: impl Into<String>,
    ) -> Self {
        Self {
            code,
            domain: domain.into(),
            time: time.into(),
            usage: usage.into(),
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.code, self.domain, self.time, self.usage
        )
    }
}
