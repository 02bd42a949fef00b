//! Gas estimates per step and their cost expressed in the output token.
//!
//! Gas never changes simulated amounts; it only enters plan selection
//! through the net output.

use dexroute_domain::config::GasConfig;
use dexroute_domain::enums::StepVenue;
use dexroute_domain::value_objects::amount::pow10;
use dexroute_domain::value_objects::{Price, mul_decimal_floor};
use num_bigint::BigUint;
use rust_decimal::Decimal;

/// Decimals of wei amounts.
const WEI_DECIMALS: u8 = 18;

/// USD prices used to express gas in the output token. Either may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasPrices {
    pub eth_usd: Option<Decimal>,
    pub token_out_usd: Option<Decimal>,
}

/// Gas of one step touching `pools` pools (ignored for conversions).
pub fn step_gas(config: &GasConfig, venue: StepVenue, pools: usize) -> u64 {
    let extra = config
        .extra_hop
        .saturating_mul(pools.saturating_sub(1) as u64);
    match venue {
        StepVenue::U => config.swap_u.saturating_add(extra),
        StepVenue::B => config.swap_b.saturating_add(extra),
        StepVenue::Wrap => config.wrap,
        StepVenue::Unwrap => config.unwrap,
    }
}

/// `total_gas · gas_price` in wei, truncated.
pub fn gas_cost_wei(config: &GasConfig, total_gas: u64) -> BigUint {
    mul_decimal_floor(&(BigUint::from(total_gas) * pow10(9)), config.gas_price_gwei)
}

/// Converts a wei cost into raw output-token units.
///
/// An output that is native or wrapped native is already priced in ETH.
/// Otherwise both USD prices are required; `None` means the cost is unknown.
pub fn cost_in_output(
    wei: &BigUint,
    output_is_native_like: bool,
    output_decimals: u8,
    prices: &GasPrices,
) -> Option<BigUint> {
    if output_is_native_like {
        return Some(wei.clone());
    }
    let eth = Price::new(prices.eth_usd?);
    let out = Price::new(prices.token_out_usd?);
    eth.convert_raw(wei, WEI_DECIMALS, &out, output_decimals)
}
