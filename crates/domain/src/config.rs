//! Typed router configuration with documented defaults.

use crate::error::RouterError;
use crate::value_objects::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Mainnet wrapped native (WETH).
pub const WETH: Address = Address::from_bytes([
    0xc0, 0x2a, 0xaa, 0x39, 0xb2, 0x23, 0xfe, 0x8d, 0x0a, 0x0e, 0x5c, 0x4f, 0x27, 0xea, 0xd9, 0x08,
    0x3c, 0x75, 0x6c, 0xc2,
]);
/// Mainnet USDC.
pub const USDC: Address = Address::from_bytes([
    0xa0, 0xb8, 0x69, 0x91, 0xc6, 0x21, 0x8b, 0x36, 0xc1, 0xd1, 0x9d, 0x4a, 0x2e, 0x9e, 0xb0, 0xce,
    0x36, 0x06, 0xeb, 0x48,
]);
/// Mainnet USDT.
pub const USDT: Address = Address::from_bytes([
    0xda, 0xc1, 0x7f, 0x95, 0x8d, 0x2e, 0xe5, 0x23, 0xa2, 0x20, 0x62, 0x06, 0x99, 0x45, 0x97, 0xc1,
    0x3d, 0x83, 0x1e, 0xc7,
]);
/// Mainnet DAI.
pub const DAI: Address = Address::from_bytes([
    0x6b, 0x17, 0x54, 0x74, 0xe8, 0x90, 0x94, 0xc4, 0x4d, 0xa9, 0x8b, 0x95, 0x4e, 0xed, 0xea, 0xc4,
    0x95, 0x27, 0x1d, 0x0f,
]);
/// Mainnet WBTC.
pub const WBTC: Address = Address::from_bytes([
    0x22, 0x60, 0xfa, 0xc5, 0xe5, 0x54, 0x2a, 0x77, 0x3a, 0xa4, 0x4f, 0xbc, 0xfe, 0xdf, 0x7c, 0x19,
    0x3b, 0xc2, 0xc5, 0x99,
]);
/// Venue U swap router.
pub const VENUE_U_ROUTER: Address = Address::from_bytes([
    0xe5, 0x92, 0x42, 0x7a, 0x0a, 0xec, 0xe9, 0x2d, 0xe3, 0xed, 0xee, 0x1f, 0x18, 0xe0, 0x15, 0x7c,
    0x05, 0x86, 0x15, 0x64,
]);
/// Venue B vault.
pub const VENUE_B_VAULT: Address = Address::from_bytes([
    0xba, 0x12, 0x22, 0x22, 0x22, 0x22, 0x8d, 0x8b, 0xa4, 0x45, 0x95, 0x8a, 0x75, 0xa0, 0x70, 0x4d,
    0x56, 0x6b, 0xf2, 0xc8,
]);

/// Split optimizer knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Concentration level of the seed pivot transform.
    pub pivot: Decimal,
    /// Minimum seed share of any route before renormalization.
    pub seed_floor: Decimal,
    /// Initial hill-climbing step.
    pub initial_step: Decimal,
    /// Step multiplier applied after an iteration without improvement.
    pub step_decay: Decimal,
    /// Search stops once the step falls below this value.
    pub min_step: Decimal,
    pub max_iterations: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            pivot: Decimal::new(40, 2),       // 0.40
            seed_floor: Decimal::new(1, 3),   // 0.001
            initial_step: Decimal::new(2, 2), // 2%
            step_decay: Decimal::new(8, 1),   // x0.8
            min_step: Decimal::new(5, 5),     // 5e-5
            max_iterations: 200,
        }
    }
}

/// Gas model used by the plan builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub gas_price_gwei: Decimal,
    pub swap_u: u64,
    pub swap_b: u64,
    /// Added per extra pool in a multi or batch step.
    pub extra_hop: u64,
    pub wrap: u64,
    pub unwrap: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            gas_price_gwei: Decimal::from(20),
            swap_u: 130_000,
            swap_b: 120_000,
            extra_hop: 80_000,
            wrap: 30_000,
            unwrap: 35_000,
        }
    }
}

/// Router-wide configuration. Every knob lives here; nothing is global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub wrapped_native: Address,
    /// Intermediate tokens for 2- and 3-hop paths.
    pub bridges: Vec<Address>,
    pub use_venue_u: bool,
    pub use_venue_b: bool,
    /// Minimum Σ normalized balances, in whole normalized units.
    pub liquidity_floor: Decimal,
    pub max_hops: u8,
    pub max_candidates: usize,
    pub max_three_hop_paths: usize,
    pub slippage: Decimal,
    /// Relative net-output band inside which the balance score decides.
    pub near_tie_tolerance: Decimal,
    /// Wall-clock deadline for each indexer or chain read.
    pub io_deadline_secs: u64,
    pub venue_u_spender: Address,
    pub venue_b_spender: Address,
    pub optimizer: OptimizerConfig,
    pub gas: GasConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            wrapped_native: WETH,
            bridges: vec![WETH, USDC, USDT, DAI, WBTC],
            use_venue_u: true,
            use_venue_b: true,
            liquidity_floor: Decimal::new(1, 2), // 0.01
            max_hops: 3,
            max_candidates: 10,
            max_three_hop_paths: 10,
            slippage: Decimal::new(5, 3), // 0.5%
            near_tie_tolerance: Decimal::new(5, 4), // 0.05%
            io_deadline_secs: 30,
            venue_u_spender: VENUE_U_ROUTER,
            venue_b_spender: VENUE_B_VAULT,
            optimizer: OptimizerConfig::default(),
            gas: GasConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Whether `address` is the native sentinel or the configured wrapped native.
    #[must_use]
    pub fn is_native_like(&self, address: &Address) -> bool {
        address.is_native() || *address == self.wrapped_native
    }

    /// Maps native to wrapped native; other addresses are returned as is.
    #[must_use]
    pub fn routing_vertex(&self, address: &Address) -> Address {
        if address.is_native() {
            self.wrapped_native
        } else {
            *address
        }
    }

    /// Validates `opts` and returns this configuration with the request overrides applied.
    pub fn with_options(&self, opts: &OptimizeOptions) -> Result<RouterConfig, RouterError> {
        opts.validate()?;
        let mut config = self.clone();
        config.slippage = opts.slippage;
        config.max_hops = opts.max_hops;
        config.use_venue_u = opts.use_venue_u;
        config.use_venue_b = opts.use_venue_b;
        config.max_candidates = opts.max_candidates;
        if let Some(bridges) = &opts.bridge_set {
            let mut unique = Vec::with_capacity(bridges.len());
            for bridge in bridges {
                let vertex = self.routing_vertex(bridge);
                if !unique.contains(&vertex) {
                    unique.push(vertex);
                }
            }
            config.bridges = unique;
        }
        if let Some(floor) = opts.liquidity_floor {
            config.liquidity_floor = floor;
        }
        Ok(config)
    }
}

/// Per-request options of `optimize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizeOptions {
    pub slippage: Decimal,
    pub max_hops: u8,
    pub use_venue_u: bool,
    pub use_venue_b: bool,
    pub bridge_set: Option<Vec<Address>>,
    pub liquidity_floor: Option<Decimal>,
    pub max_candidates: usize,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            slippage: Decimal::new(5, 3),
            max_hops: 3,
            use_venue_u: true,
            use_venue_b: true,
            bridge_set: None,
            liquidity_floor: None,
            max_candidates: 10,
        }
    }
}

impl OptimizeOptions {
    /// Sets the slippage tolerance.
    #[must_use]
    pub fn with_slippage(mut self, slippage: Decimal) -> Self {
        self.slippage = slippage;
        self
    }

    /// Sets the maximum number of pool hops.
    #[must_use]
    pub fn with_max_hops(mut self, max_hops: u8) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Enables or disables the two venues.
    #[must_use]
    pub fn with_venues(mut self, use_venue_u: bool, use_venue_b: bool) -> Self {
        self.use_venue_u = use_venue_u;
        self.use_venue_b = use_venue_b;
        self
    }

    /// Replaces the bridge token set.
    #[must_use]
    pub fn with_bridges(mut self, bridges: Vec<Address>) -> Self {
        self.bridge_set = Some(bridges);
        self
    }

    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Checks ranges of every option.
    ///
    /// # Errors
    /// Returns `RouterError::InvalidConfig` when an option is out of range or
    /// both venues are disabled.
    pub fn validate(&self) -> Result<(), RouterError> {
        if !self.use_venue_u && !self.use_venue_b {
            return Err(RouterError::InvalidConfig(
                "at least one venue must be enabled".to_string(),
            ));
        }
        if self.slippage < Decimal::ZERO || self.slippage > Decimal::ONE {
            return Err(RouterError::InvalidConfig(format!(
                "slippage {} outside [0, 1]",
                self.slippage
            )));
        }
        if !(1..=3).contains(&self.max_hops) {
            return Err(RouterError::InvalidConfig(format!(
                "max hops {} outside 1..=3",
                self.max_hops
            )));
        }
        if !(1..=50).contains(&self.max_candidates) {
            return Err(RouterError::InvalidConfig(format!(
                "max candidates {} outside 1..=50",
                self.max_candidates
            )));
        }
        if matches!(self.liquidity_floor, Some(floor) if floor < Decimal::ZERO) {
            return Err(RouterError::InvalidConfig(
                "liquidity floor must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_options_are_valid() {
        assert!(OptimizeOptions::default().validate().is_ok());
    }

    #[test]
    fn test_both_venues_disabled() {
        let opts = OptimizeOptions::default().with_venues(false, false);
        assert!(matches!(opts.validate(), Err(RouterError::InvalidConfig(_))));
    }

    #[test]
    fn test_option_ranges() {
        assert!(OptimizeOptions::default().with_max_hops(4).validate().is_err());
        assert!(OptimizeOptions::default().with_max_candidates(0).validate().is_err());
        assert!(OptimizeOptions::default().with_slippage(dec!(1.2)).validate().is_err());
    }

    #[test]
    fn test_with_options_maps_native_bridge() {
        let config = RouterConfig::default();
        let opts = OptimizeOptions::default().with_bridges(vec![Address::NATIVE, USDC]);
        let effective = config.with_options(&opts).unwrap();
        assert_eq!(effective.bridges, vec![WETH, USDC]);
    }

    #[test]
    fn test_config_json_defaults() {
        let config: RouterConfig = serde_json::from_str(r#"{"max_hops": 2}"#).unwrap();
        assert_eq!(config.max_hops, 2);
        assert_eq!(config.optimizer.max_iterations, 200);
        assert_eq!(config.bridges.len(), 5);
    }
}
