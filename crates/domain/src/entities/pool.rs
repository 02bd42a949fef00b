use crate::entities::token::Token;
use crate::enums::{PoolClass, Venue};
use crate::math::scaling::normalize;
use crate::value_objects::amount::biguint_vec_string;
use crate::value_objects::{Address, PoolId, SwapFee};
use num_bigint::BigUint;
use num_traits::Zero;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("pool {0} has fewer than two tokens")]
    TooFewTokens(PoolId),
    #[error("pool {0} has {tokens} tokens but {balances} balances", tokens = .1, balances = .2)]
    BalanceCountMismatch(PoolId, usize, usize),
    #[error("pool {0} token decimals out of range")]
    UnsupportedDecimals(PoolId),
    #[error("pool {0} weights are invalid")]
    InvalidWeights(PoolId),
    #[error("pool {0} amplification must be at least 1")]
    InvalidAmplification(PoolId),
    #[error("pool {0} concentrated state is invalid")]
    InvalidConcentratedState(PoolId),
}

/// An initialized tick of a concentrated-liquidity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub index: i32,
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
}

/// Ticks aligned to the pool's spacing, unique by index and sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSnapshot {
    ticks: Vec<Tick>,
}

impl TickSnapshot {
    /// Builds a snapshot, dropping ticks off the spacing grid and keeping the
    /// first occurrence of each index.
    pub fn new(ticks: impl IntoIterator<Item = Tick>, tick_spacing: i32) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut kept: Vec<Tick> = ticks
            .into_iter()
            .filter(|t| tick_spacing > 0 && t.index % tick_spacing == 0)
            .filter(|t| seen.insert(t.index))
            .collect();
        kept.sort_by_key(|t| t.index);
        Self { ticks: kept }
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Largest initialized tick with `index <= tick`.
    pub fn at_or_below(&self, tick: i32) -> Option<&Tick> {
        let pos = self.ticks.partition_point(|t| t.index <= tick);
        pos.checked_sub(1).map(|i| &self.ticks[i])
    }

    /// Smallest initialized tick with `index > tick`.
    pub fn above(&self, tick: i32) -> Option<&Tick> {
        let pos = self.ticks.partition_point(|t| t.index <= tick);
        self.ticks.get(pos)
    }
}

/// Mutable state of a concentrated-liquidity pool for the current block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcentratedState {
    /// Current sqrt price, Q64.96.
    pub sqrt_price_x96: U256,
    /// In-range liquidity.
    pub liquidity: u128,
    /// Current tick.
    pub tick: i32,
    pub tick_spacing: i32,
    pub ticks: TickSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedParams {
    /// Integer weights per token, summing to 100 (±1).
    pub weights: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableParams {
    /// Amplification parameter A (unscaled).
    pub amplification: Decimal,
    /// Set while an amplification ramp is in progress; the current value is used regardless.
    pub is_updating: bool,
}

/// Class-specific pool parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum PoolParams {
    Weighted(WeightedParams),
    Stable(StableParams),
    Concentrated(ConcentratedState),
    Unknown,
}

impl PoolParams {
    pub fn class(&self) -> PoolClass {
        match self {
            PoolParams::Weighted(_) => PoolClass::Weighted,
            PoolParams::Stable(_) => PoolClass::Stable,
            PoolParams::Concentrated(_) => PoolClass::Concentrated,
            PoolParams::Unknown => PoolClass::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub address: Address,
    pub venue: Venue,
    pub name: Option<String>,
    /// Ordered pool tokens (`token0`, `token1` on venue U).
    pub tokens: Vec<Token>,
    /// Raw balances, one per token.
    #[serde(with = "biguint_vec_string")]
    pub balances: Vec<BigUint>,
    pub swap_fee: SwapFee,
    pub params: PoolParams,
}

impl Pool {
    pub fn class(&self) -> PoolClass {
        self.params.class()
    }

    pub fn is_routable(&self) -> bool {
        self.class() != PoolClass::Unknown
    }

    /// Index of `address` among the pool tokens.
    pub fn token_index(&self, address: &Address) -> Option<usize> {
        self.tokens.iter().position(|t| t.address == *address)
    }

    pub fn token_addresses(&self) -> impl Iterator<Item = &Address> {
        self.tokens.iter().map(|t| &t.address)
    }

    /// Balances in 18-decimal normalized units.
    pub fn normalized_balances(&self) -> Vec<BigUint> {
        self.balances
            .iter()
            .zip(&self.tokens)
            .map(|(b, t)| normalize(b, t.decimals))
            .collect()
    }

    /// Sum of normalized balances, the quantity compared against the liquidity floor.
    pub fn normalized_liquidity(&self) -> BigUint {
        self.normalized_balances()
            .into_iter()
            .fold(BigUint::zero(), |acc, b| acc + b)
    }

    /// Checks the structural invariants of the pool and its parameters.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.tokens.len() < 2 {
            return Err(PoolError::TooFewTokens(self.id.clone()));
        }
        if self.tokens.len() != self.balances.len() {
            return Err(PoolError::BalanceCountMismatch(
                self.id.clone(),
                self.tokens.len(),
                self.balances.len(),
            ));
        }
        if !self.tokens.iter().all(Token::has_supported_decimals) {
            return Err(PoolError::UnsupportedDecimals(self.id.clone()));
        }
        match &self.params {
            PoolParams::Weighted(w) => {
                let sum: u32 = w.weights.iter().sum();
                let in_range = w.weights.iter().all(|&x| x > 0 && x < 100);
                if w.weights.len() != self.tokens.len() || !in_range || !(99..=101).contains(&sum)
                {
                    return Err(PoolError::InvalidWeights(self.id.clone()));
                }
            }
            PoolParams::Stable(s) => {
                if s.amplification < Decimal::ONE {
                    return Err(PoolError::InvalidAmplification(self.id.clone()));
                }
            }
            PoolParams::Concentrated(c) => {
                if self.tokens.len() != 2 || c.tick_spacing <= 0 || c.sqrt_price_x96.is_zero() {
                    return Err(PoolError::InvalidConcentratedState(self.id.clone()));
                }
            }
            PoolParams::Unknown => {}
        }
        Ok(())
    }
}

/// Immutable pool snapshot for one request, keyed by pool id.
#[derive(Debug, Clone, Default)]
pub struct PoolSet {
    pools: BTreeMap<PoolId, Pool>,
}

impl PoolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pool; a pool id already present keeps its first value.
    pub fn insert(&mut self, pool: Pool) -> bool {
        if self.pools.contains_key(&pool.id) {
            return false;
        }
        self.pools.insert(pool.id.clone(), pool);
        true
    }

    pub fn get(&self, id: &PoolId) -> Option<&Pool> {
        self.pools.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Looks up a token's metadata across all pools.
    pub fn find_token(&self, address: &Address) -> Option<&Token> {
        self.pools
            .values()
            .flat_map(|p| p.tokens.iter())
            .find(|t| t.address == *address)
    }
}

impl FromIterator<Pool> for PoolSet {
    fn from_iter<T: IntoIterator<Item = Pool>>(iter: T) -> Self {
        let mut set = PoolSet::new();
        for pool in iter {
            set.insert(pool);
        }
        set
    }
}
