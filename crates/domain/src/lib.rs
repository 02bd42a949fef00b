//! Core domain model and AMM math for the swap router.
//!
//! This crate provides:
//! - Entities: tokens, pools, routes and execution plans
//! - Value objects: addresses, pool ids, swap fees, raw amounts
//! - The AMM math kernel (weighted, stable and concentrated-liquidity pools)
//! - Router configuration and error types

/// Router configuration.
pub mod config;
/// Domain entities.
pub mod entities;
/// Shared enums.
pub mod enums;
/// Error types.
pub mod error;
/// AMM math kernel.
pub mod math;
/// Value objects.
pub mod value_objects;

/// Prelude module for convenient imports.
pub mod prelude;
