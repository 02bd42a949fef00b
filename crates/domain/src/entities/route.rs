use crate::enums::{Venue, VenueTag};
use crate::value_objects::{Address, PoolId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A swap through one pool, referenced by id and token indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapHop {
    pub pool_id: PoolId,
    pub venue: Venue,
    pub token_in_index: usize,
    pub token_out_index: usize,
    /// Pool token sold (never the native sentinel).
    pub token_in: Address,
    /// Pool token bought.
    pub token_out: Address,
}

/// One leg of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Hop {
    Swap(SwapHop),
    /// Native to wrapped native, 1:1.
    Wrap,
    /// Wrapped native to native, 1:1.
    Unwrap,
}

impl Hop {
    pub fn as_swap(&self) -> Option<&SwapHop> {
        match self {
            Hop::Swap(swap) => Some(swap),
            _ => None,
        }
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, Hop::Wrap | Hop::Unwrap)
    }
}

/// A candidate path from `token_in` to `token_out` with its venue summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub hops: Vec<Hop>,
    pub venue_tag: VenueTag,
    pub requires_wrap: bool,
    pub requires_unwrap: bool,
    pub token_in: Address,
    pub token_out: Address,
}

impl Route {
    /// Builds a route and derives its venue tag and conversion flags from the hops.
    ///
    /// Conversion-only routes (a bare Wrap or Unwrap) are tagged `SingleU`.
    pub fn new(hops: Vec<Hop>, token_in: Address, token_out: Address) -> Self {
        let venues: BTreeSet<Venue> = hops.iter().filter_map(|h| h.as_swap()).map(|s| s.venue).collect();
        let venue_tag = match (venues.contains(&Venue::U), venues.contains(&Venue::B)) {
            (true, true) => VenueTag::Cross,
            (false, true) => VenueTag::SingleB,
            _ => VenueTag::SingleU,
        };
        let requires_wrap = hops.iter().any(|h| matches!(h, Hop::Wrap));
        let requires_unwrap = hops.iter().any(|h| matches!(h, Hop::Unwrap));
        Self {
            hops,
            venue_tag,
            requires_wrap,
            requires_unwrap,
            token_in,
            token_out,
        }
    }

    pub fn swaps(&self) -> impl Iterator<Item = &SwapHop> {
        self.hops.iter().filter_map(Hop::as_swap)
    }

    /// Ordered pool ids, the deduplication key of a path.
    pub fn pool_key(&self) -> Vec<PoolId> {
        self.swaps().map(|s| s.pool_id.clone()).collect()
    }

    /// Number of pool swaps (conversions excluded).
    pub fn swap_count(&self) -> usize {
        self.swaps().count()
    }

    pub fn venues(&self) -> BTreeSet<Venue> {
        self.swaps().map(|s| s.venue).collect()
    }

    pub fn has_conversion(&self) -> bool {
        self.requires_wrap || self.requires_unwrap
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(self.hops.len());
        for hop in &self.hops {
            match hop {
                Hop::Swap(s) => {
                    let id = s.pool_id.to_hex();
                    let short = &id[..id.len().min(10)];
                    parts.push(format!("{}:{}", s.venue, short));
                }
                Hop::Wrap => parts.push("wrap".to_string()),
                Hop::Unwrap => parts.push("unwrap".to_string()),
            }
        }
        write!(f, "{}", parts.join(" > "))
    }
}
