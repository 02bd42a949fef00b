use serde::{Deserialize, Serialize};
use std::fmt;

/// AMM venue family a pool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Venue {
    /// Concentrated-liquidity venue.
    U,
    /// Weighted / stable pool venue.
    B,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::U => write!(f, "U"),
            Venue::B => write!(f, "B"),
        }
    }
}

/// Pool class as persisted in the pool cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolClass {
    Weighted,
    Stable,
    Concentrated,
    Unknown,
}

/// Which venues a route touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VenueTag {
    SingleU,
    SingleB,
    Cross,
}

/// Executor targeted by a plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepVenue {
    U,
    B,
    Wrap,
    Unwrap,
}

impl From<Venue> for StepVenue {
    fn from(venue: Venue) -> Self {
        match venue {
            Venue::U => StepVenue::U,
            Venue::B => StepVenue::B,
        }
    }
}

impl fmt::Display for StepVenue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepVenue::U => "U",
            StepVenue::B => "B",
            StepVenue::Wrap => "Wrap",
            StepVenue::Unwrap => "Unwrap",
        };
        write!(f, "{s}")
    }
}

/// Call shape of a plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMethod {
    /// One pool.
    Single,
    /// Several pools of venue B in one vault call.
    Batch,
    /// Several pools of venue U in one router call.
    Multi,
}

impl fmt::Display for StepMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepMethod::Single => "single",
            StepMethod::Batch => "batch",
            StepMethod::Multi => "multi",
        };
        write!(f, "{s}")
    }
}
