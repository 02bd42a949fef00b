//! Prelude module for convenient imports.
//!
//! ```rust
//! use dexroute_protocols::prelude::*;
//! ```

pub use crate::abi::{IVenuePool, evm_address};
pub use crate::chain::Chain;
pub use crate::error::AdapterError;
pub use crate::probes::{PoolProbe, ProbeSource, classify_pool, name_heuristic};
