//! Request ingress of the swap router.
//!
//! [`SwapRouter::optimize`](router::SwapRouter::optimize) runs one request
//! end to end: pool discovery, path enumeration, simulation of every
//! candidate, split optimization and plan assembly.

/// Candidate path enumeration.
pub mod paths;
/// The request pipeline.
pub mod router;

/// Prelude module for convenient imports.
pub mod prelude;
