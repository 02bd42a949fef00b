//! Prelude module for convenient imports.
//!
//! ```rust
//! use dexroute_simulation::prelude::*;
//! ```

pub use crate::error::SimulationError;
pub use crate::route_simulator::{HopQuote, RouteQuote, RouteSimulator};
