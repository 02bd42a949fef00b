//! Venue protocol plumbing: contract interfaces, the chain read interface
//! and the venue-B pool classification probes.

/// `sol!` interfaces of the pool view calls.
pub mod abi;
/// Read-only chain access.
pub mod chain;
/// Adapter error type.
pub mod error;
/// Venue-B pool class probes.
pub mod probes;

/// Prelude module for convenient imports.
pub mod prelude;
