//! Graded trust levels.
//!
//! A trust level is what a trustee holds in a circle, and what an operation
//! requires. Levels are totally ordered: `Sysop > Admin > Write > Read > All`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Access grade held by a trustee or required by an operation.
///
/// Variants are declared weakest first so the derived `Ord` matches the
/// hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrustLevel {
    All,
    Read,
    Write,
    Admin,
    Sysop,
}

impl TrustLevel {
    /// Every level, strongest first.
    pub const STRONGEST_FIRST: [TrustLevel; 5] = [
        TrustLevel::Sysop,
        TrustLevel::Admin,
        TrustLevel::Write,
        TrustLevel::Read,
        TrustLevel::All,
    ];

    /// The set of actual levels that satisfy `required`, strongest first.
    ///
    /// `permitted(All)` is the full set of five levels.
    pub fn permitted(required: TrustLevel) -> Vec<TrustLevel> {
        Self::STRONGEST_FIRST
            .iter()
            .copied()
            .filter(|level| *level >= required)
            .collect()
    }

    /// Check whether `actual` is at or above `required`.
    pub fn is_allowed(actual: TrustLevel, required: TrustLevel) -> bool {
        Self::permitted(required).contains(&actual)
    }

    /// Upper-case name, as used on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TrustLevel::All => "ALL",
            TrustLevel::Read => "READ",
            TrustLevel::Write => "WRITE",
            TrustLevel::Admin => "ADMIN",
            TrustLevel::Sysop => "SYSOP",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrustLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::STRONGEST_FIRST
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::verification(format!("unknown trust level '{s}'")))
    }
}
