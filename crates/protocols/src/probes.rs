//! Classification of venue-B pools by contract probing.
//!
//! Probes run in a fixed order and the first success wins:
//! 1. `getNormalizedWeights()`: weighted pool
//! 2. `getAmplificationParameter()`: stable pool
//! 3. `name()` heuristics: "Stable" in the name, or a `80ABC-20XYZ` weight label
//!
//! A rate-limit from any probe aborts classification. Every other probe
//! failure (revert, transport, malformed data) only moves on to the next probe.

use crate::abi::IVenuePool;
use crate::chain::Chain;
use crate::error::AdapterError;
use alloy::primitives::U256;
use alloy::sol_types::SolCall;
use dexroute_domain::entities::{PoolParams, StableParams, WeightedParams};
use dexroute_domain::value_objects::Address;
use rust_decimal::Decimal;
use tracing::{debug, trace};

/// Amplification assumed for pools recognized as stable only by name.
pub const NAMED_STABLE_AMPLIFICATION: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

const WAD: u64 = 1_000_000_000_000_000_000;

/// Which probe produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeSource {
    Weights,
    Amplification,
    Name,
}

/// Probes a single pool contract through a [`Chain`].
pub struct PoolProbe<'a> {
    chain: &'a dyn Chain,
}

impl<'a> PoolProbe<'a> {
    pub fn new(chain: &'a dyn Chain) -> Self {
        Self { chain }
    }

    /// Decoded call result, with everything but rate limits folded into `None`.
    async fn call<C: SolCall + Send>(&self, address: Address, call: C) -> Result<Option<C::Return>, AdapterError> {
        let data = call.abi_encode();
        match self.chain.call(address, data.into()).await {
            Ok(output) => match C::abi_decode_returns(&output) {
                Ok(decoded) => Ok(Some(decoded)),
                Err(err) => {
                    trace!(pool = %address, call = C::SIGNATURE, error = %err, "probe returned malformed data");
                    Ok(None)
                }
            },
            Err(err) if err.is_rate_limited() => Err(err),
            Err(err) => {
                trace!(pool = %address, call = C::SIGNATURE, error = %err, "probe failed");
                Ok(None)
            }
        }
    }

    /// Integer percentage weights from `getNormalizedWeights()`.
    pub async fn weights(&self, address: Address, token_count: usize) -> Result<Option<WeightedParams>, AdapterError> {
        let Some(raw) = self.call(address, IVenuePool::getNormalizedWeightsCall {}).await? else {
            return Ok(None);
        };
        if raw.len() != token_count {
            return Ok(None);
        }
        let wad = U256::from(WAD);
        let mut weights = Vec::with_capacity(raw.len());
        for w in raw {
            if w > wad {
                return Ok(None);
            }
            // Percent, rounded half up.
            let percent = (w * U256::from(100u64) + wad / U256::from(2u64)) / wad;
            weights.push(percent.saturating_to::<u32>());
        }
        Ok(valid_weights(&weights).then_some(WeightedParams { weights }))
    }

    /// Amplification from `getAmplificationParameter()`, unscaled.
    pub async fn amplification(&self, address: Address) -> Result<Option<StableParams>, AdapterError> {
        let Some(reply) = self.call(address, IVenuePool::getAmplificationParameterCall {}).await? else {
            return Ok(None);
        };
        let (Ok(value), Ok(precision)) = (u64::try_from(reply.value), u64::try_from(reply.precision)) else {
            return Ok(None);
        };
        if precision == 0 {
            return Ok(None);
        }
        let amplification = Decimal::from(value) / Decimal::from(precision);
        if amplification < Decimal::ONE {
            return Ok(None);
        }
        Ok(Some(StableParams {
            amplification,
            is_updating: reply.isUpdating,
        }))
    }

    pub async fn name(&self, address: Address) -> Result<Option<String>, AdapterError> {
        self.call(address, IVenuePool::nameCall {}).await
    }
}

fn valid_weights(weights: &[u32]) -> bool {
    let sum: u32 = weights.iter().sum();
    weights.len() >= 2 && weights.iter().all(|w| *w > 0 && *w < 100) && (99..=101).contains(&sum)
}

/// `"80BAL"` to `(80, "BAL")`.
fn weight_label(part: &str) -> Option<(u32, &str)> {
    let digits = part.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 2 || digits == part.len() {
        return None;
    }
    let weight = part[..digits].parse().ok()?;
    Some((weight, &part[digits..]))
}

/// Classifies a pool from its name alone.
///
/// `token_symbols` are the pool's token symbols in pool order; a weight label
/// must name each of them exactly once.
pub fn name_heuristic(name: &str, token_symbols: &[String]) -> Option<PoolParams> {
    if name.to_ascii_lowercase().contains("stable") {
        return Some(PoolParams::Stable(StableParams {
            amplification: NAMED_STABLE_AMPLIFICATION,
            is_updating: false,
        }));
    }

    for word in name.split_whitespace() {
        let Some(labels) = word
            .split('-')
            .map(weight_label)
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };
        if labels.len() != token_symbols.len() {
            continue;
        }
        let mut weights = vec![0u32; token_symbols.len()];
        let mut matched = true;
        for (weight, symbol) in labels {
            match token_symbols
                .iter()
                .position(|s| s.eq_ignore_ascii_case(symbol))
            {
                Some(i) if weights[i] == 0 => weights[i] = weight,
                _ => {
                    matched = false;
                    break;
                }
            }
        }
        if matched && valid_weights(&weights) {
            return Some(PoolParams::Weighted(WeightedParams { weights }));
        }
    }
    None
}

/// Runs the probes for one venue-B pool.
///
/// Returns `PoolParams::Unknown` (and no source) when every probe fails.
///
/// # Errors
/// `AdapterError::RateLimited` from any probe.
pub async fn classify_pool(
    chain: &dyn Chain,
    address: Address,
    token_symbols: &[String],
) -> Result<(PoolParams, Option<ProbeSource>), AdapterError> {
    let probe = PoolProbe::new(chain);

    if let Some(weighted) = probe.weights(address, token_symbols.len()).await? {
        return Ok((PoolParams::Weighted(weighted), Some(ProbeSource::Weights)));
    }
    if let Some(stable) = probe.amplification(address).await? {
        return Ok((PoolParams::Stable(stable), Some(ProbeSource::Amplification)));
    }
    if let Some(name) = probe.name(address).await? {
        if let Some(params) = name_heuristic(&name, token_symbols) {
            return Ok((params, Some(ProbeSource::Name)));
        }
    }
    debug!(pool = %address, "no probe matched, pool class unknown");
    Ok((PoolParams::Unknown, None))
}
