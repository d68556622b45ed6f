//! Error types for the Plume particle frame cache.
//!
//! Cache operations themselves are total over valid inputs; the only
//! recoverable failures are configuration problems detected before a
//! cache is built. Contract violations (such as presenting a slot table
//! to the wrong cache) are panics, not errors.

use std::error::Error;
use std::fmt;

/// Errors detected while validating a cache configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The per-state particle reservation exceeds the supported maximum.
    ParticleCapacityTooLarge {
        /// The configured reservation.
        requested: usize,
        /// The largest accepted reservation.
        max: usize,
    },
    /// The expected effect count exceeds the supported maximum.
    ExpectedEffectsTooLarge {
        /// The configured effect count.
        requested: usize,
        /// The largest accepted effect count.
        max: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParticleCapacityTooLarge { requested, max } => {
                write!(f, "particle capacity {requested} exceeds maximum {max}")
            }
            Self::ExpectedEffectsTooLarge { requested, max } => {
                write!(f, "expected effect count {requested} exceeds maximum {max}")
            }
        }
    }
}

impl Error for ConfigError {}
