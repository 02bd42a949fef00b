//! Prelude module for convenient imports.
//!
//! ```rust
//! use dexroute_routing::prelude::*;
//! ```

pub use crate::paths::PathEnumerator;
pub use crate::router::SwapRouter;
pub use dexroute_domain::prelude::*;
