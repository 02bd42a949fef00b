//! Execution plan assembly.
//!
//! This crate turns the optimizer's output into an [`ExecutionPlan`]:
//! - Steps grouped per venue, with slippage-protected minimum outputs
//! - Token approvals per spender
//! - Gas estimates and their cost in the output token
//! - Final selection between the split and every single route
//!
//! [`ExecutionPlan`]: dexroute_domain::entities::ExecutionPlan

/// Prelude module for convenient imports.
pub mod prelude;

/// Plan assembly and candidate selection.
pub mod builder;
/// Gas model.
pub mod gas;
/// Balance score and near-tie selection.
pub mod scoring;
/// Step grouping, balance flags and approvals.
pub mod steps;
