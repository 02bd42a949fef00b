//! Pool indexers.
//!
//! An indexer lists the pools of one venue touching a token set. Records come
//! back venue-neutral as [`RawPool`] with human-readable decimal balances; the
//! registry converts them to raw units.

use async_trait::async_trait;
use dexroute_domain::entities::{ConcentratedState, Pool, PoolParams, Tick, TickSnapshot, Token};
use dexroute_domain::enums::Venue;
use dexroute_domain::value_objects::{Address, PoolId, SwapFee, parse_units};
use dexroute_protocols::error::AdapterError;
use primitive_types::U256;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RawToken {
    pub address: Address,
    /// Human-readable balance, e.g. `"1234.56"`.
    pub balance: String,
    pub decimals: u8,
    pub symbol: String,
}

/// Block state of a concentrated-liquidity pool as reported by the indexer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawConcentrated {
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
    pub tick_spacing: i32,
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPool {
    pub venue: Venue,
    pub id: PoolId,
    pub address: Address,
    pub name: Option<String>,
    pub swap_fee: SwapFee,
    pub tokens: Vec<RawToken>,
    pub paused: bool,
    pub in_recovery_mode: bool,
    /// Present on venue U records only.
    pub concentrated: Option<RawConcentrated>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("token {0} balance {1:?} is not a decimal amount")]
    Balance(Address, String),
    #[error("venue U record has no concentrated state")]
    MissingState,
}

impl RawPool {
    /// Whether the pool is open for swaps. A concentrated pool without a price
    /// has not been initialized.
    pub fn is_active(&self) -> bool {
        if self.paused || self.in_recovery_mode {
            return false;
        }
        match (&self.venue, &self.concentrated) {
            (Venue::U, Some(state)) => !state.sqrt_price_x96.is_zero(),
            (Venue::U, None) => false,
            (Venue::B, _) => true,
        }
    }

    pub fn token_symbols(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.symbol.clone()).collect()
    }

    /// Concentrated parameters carried by a venue-U record.
    pub fn concentrated_params(&self) -> Result<PoolParams, ConversionError> {
        let state = self.concentrated.as_ref().ok_or(ConversionError::MissingState)?;
        Ok(PoolParams::Concentrated(ConcentratedState {
            sqrt_price_x96: state.sqrt_price_x96,
            liquidity: state.liquidity,
            tick: state.tick,
            tick_spacing: state.tick_spacing,
            ticks: TickSnapshot::new(state.ticks.iter().copied(), state.tick_spacing),
        }))
    }

    /// Builds the domain pool, converting balances to raw units exactly.
    pub fn to_pool(&self, params: PoolParams) -> Result<Pool, ConversionError> {
        let balances = self
            .tokens
            .iter()
            .map(|t| {
                parse_units(&t.balance, t.decimals)
                    .ok_or_else(|| ConversionError::Balance(t.address, t.balance.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pool {
            id: self.id.clone(),
            address: self.address,
            venue: self.venue,
            name: self.name.clone(),
            tokens: self
                .tokens
                .iter()
                .map(|t| Token::new(t.address, t.symbol.clone(), t.decimals))
                .collect(),
            balances,
            swap_fee: self.swap_fee,
            params,
        })
    }
}

/// Query limits passed to indexers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolFilters {
    /// Page size of the pools query.
    pub first: u32,
    /// Initialized ticks fetched per concentrated pool.
    pub ticks_per_pool: u32,
}

impl Default for PoolFilters {
    fn default() -> Self {
        Self {
            first: 1000,
            ticks_per_pool: 1000,
        }
    }
}

/// Source of pool records for one venue. Implementations never retry.
#[async_trait]
pub trait Indexer: Send + Sync {
    fn venue(&self) -> Venue;

    /// Pools of this venue holding at least one of `tokens`.
    ///
    /// # Errors
    /// `AdapterError::RateLimited` on a rate-limit signal, other variants when
    /// the indexer cannot be reached or answers garbage.
    async fn pools(&self, tokens: &[Address], filters: &PoolFilters) -> Result<Vec<RawPool>, AdapterError>;
}

const VENUE_U_QUERY: &str = r#"
query Pools($tokens: [String!]!, $first: Int!, $ticks: Int!) {
  pools(first: $first, where: { or: [{ token0_in: $tokens }, { token1_in: $tokens }] }) {
    id
    feeTier
    sqrtPrice
    liquidity
    tick
    token0 { id symbol decimals }
    token1 { id symbol decimals }
    totalValueLockedToken0
    totalValueLockedToken1
    ticks(first: $ticks, where: { liquidityGross_gt: "0" }) { tickIdx liquidityNet liquidityGross }
  }
}"#;

const VENUE_B_QUERY: &str = r#"
query Pools($tokens: [String!]!, $first: Int!) {
  pools(first: $first, where: { tokensList_contains_any: $tokens, totalShares_gt: "0" }) {
    id
    address
    name
    swapFee
    isPaused
    isInRecoveryMode
    tokens { address balance decimals symbol }
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PoolsData<T> {
    pools: Vec<T>,
}

/// Integer fields arrive as JSON numbers or as strings depending on the indexer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IntField {
    Number(i64),
    Text(String),
}

impl IntField {
    fn parse<T: FromStr>(&self) -> Option<T> {
        match self {
            IntField::Number(n) => n.to_string().parse().ok(),
            IntField::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UToken {
    id: Address,
    symbol: String,
    decimals: IntField,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UTick {
    tick_idx: IntField,
    liquidity_net: IntField,
    liquidity_gross: IntField,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UPool {
    id: String,
    fee_tier: IntField,
    sqrt_price: IntField,
    liquidity: IntField,
    tick: Option<IntField>,
    token0: UToken,
    token1: UToken,
    total_value_locked_token0: String,
    total_value_locked_token1: String,
    #[serde(default)]
    ticks: Vec<UTick>,
}

#[derive(Debug, Deserialize)]
struct BToken {
    address: Address,
    balance: String,
    decimals: IntField,
    symbol: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BPool {
    id: String,
    address: Address,
    name: Option<String>,
    swap_fee: String,
    #[serde(default)]
    is_paused: bool,
    #[serde(default)]
    is_in_recovery_mode: bool,
    tokens: Vec<BToken>,
}

/// Tick spacing implied by a venue-U fee tier.
fn tick_spacing_for_fee(fee_pips: u32) -> Option<i32> {
    match fee_pips {
        100 => Some(1),
        500 => Some(10),
        3000 => Some(60),
        10000 => Some(200),
        _ => None,
    }
}

fn convert_u(record: UPool) -> Option<RawPool> {
    let fee_pips: u32 = record.fee_tier.parse()?;
    let id = PoolId::from_str(&record.id).ok()?;
    let address = Address::from_str(&record.id).ok()?;
    let sqrt_price_x96 = match &record.sqrt_price {
        IntField::Number(n) => U256::from(u64::try_from(*n).ok()?),
        IntField::Text(s) => U256::from_dec_str(s.trim()).ok()?,
    };
    let ticks = record
        .ticks
        .iter()
        .map(|t| {
            Some(Tick {
                index: t.tick_idx.parse()?,
                liquidity_net: t.liquidity_net.parse()?,
                liquidity_gross: t.liquidity_gross.parse()?,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    let token = |t: &UToken, balance: String| -> Option<RawToken> {
        Some(RawToken {
            address: t.id,
            balance,
            decimals: t.decimals.parse()?,
            symbol: t.symbol.clone(),
        })
    };
    Some(RawPool {
        venue: Venue::U,
        id,
        address,
        name: None,
        swap_fee: SwapFee::from_pips(fee_pips)?,
        tokens: vec![
            token(&record.token0, record.total_value_locked_token0.clone())?,
            token(&record.token1, record.total_value_locked_token1.clone())?,
        ],
        paused: false,
        in_recovery_mode: false,
        concentrated: Some(RawConcentrated {
            sqrt_price_x96,
            liquidity: record.liquidity.parse()?,
            tick: match &record.tick {
                Some(tick) => tick.parse()?,
                None => 0,
            },
            tick_spacing: tick_spacing_for_fee(fee_pips)?,
            ticks,
        }),
    })
}

fn convert_b(record: BPool) -> Option<RawPool> {
    let swap_fee = SwapFee::from_decimal(Decimal::from_str(record.swap_fee.trim()).ok()?)?;
    let tokens = record
        .tokens
        .into_iter()
        .map(|t| {
            Some(RawToken {
                address: t.address,
                balance: t.balance,
                decimals: t.decimals.parse()?,
                symbol: t.symbol,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    Some(RawPool {
        venue: Venue::B,
        id: PoolId::from_str(&record.id).ok()?,
        address: record.address,
        name: record.name,
        swap_fee,
        tokens,
        paused: record.is_paused,
        in_recovery_mode: record.is_in_recovery_mode,
        concentrated: None,
    })
}

/// GraphQL indexer for one venue.
pub struct GraphQlIndexer {
    client: Client,
    url: String,
    venue: Venue,
    name: String,
}

impl GraphQlIndexer {
    /// # Errors
    /// `AdapterError::Unavailable` when the HTTP client cannot be built.
    pub fn new(venue: Venue, url: impl Into<String>, timeout: Duration) -> Result<Self, AdapterError> {
        let name = format!("indexer-{}", venue.to_string().to_lowercase());
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::unavailable(&name, e))?;
        Ok(Self {
            client,
            url: url.into(),
            venue,
            name,
        })
    }

    async fn query<T: DeserializeOwned>(&self, body: serde_json::Value) -> Result<Vec<T>, AdapterError> {
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AdapterError::RateLimited(self.name.clone()));
        }
        if !status.is_success() {
            return Err(AdapterError::unavailable(&self.name, format!("HTTP {status}")));
        }

        let payload: GraphQlResponse<PoolsData<T>> = response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(format!("{}: {e}", self.name)))?;
        if let Some(err) = payload.errors.first() {
            if err.message.to_ascii_lowercase().contains("rate limit") {
                return Err(AdapterError::RateLimited(self.name.clone()));
            }
            return Err(AdapterError::unavailable(&self.name, &err.message));
        }
        payload
            .data
            .map(|d| d.pools)
            .ok_or_else(|| AdapterError::Decode(format!("{}: response has no data", self.name)))
    }

    fn transport_error(&self, err: reqwest::Error) -> AdapterError {
        if err.is_timeout() {
            AdapterError::Timeout(self.name.clone())
        } else {
            AdapterError::unavailable(&self.name, err)
        }
    }
}

#[async_trait]
impl Indexer for GraphQlIndexer {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn pools(&self, tokens: &[Address], filters: &PoolFilters) -> Result<Vec<RawPool>, AdapterError> {
        let token_list: Vec<String> = tokens.iter().map(Address::to_hex).collect();
        let (records, skipped) = match self.venue {
            Venue::U => {
                let body = json!({
                    "query": VENUE_U_QUERY,
                    "variables": { "tokens": token_list, "first": filters.first, "ticks": filters.ticks_per_pool },
                });
                let records: Vec<UPool> = self.query(body).await?;
                let total = records.len();
                let pools: Vec<RawPool> = records.into_iter().filter_map(convert_u).collect();
                let skipped = total - pools.len();
                (pools, skipped)
            }
            Venue::B => {
                let body = json!({
                    "query": VENUE_B_QUERY,
                    "variables": { "tokens": token_list, "first": filters.first },
                });
                let records: Vec<BPool> = self.query(body).await?;
                let total = records.len();
                let pools: Vec<RawPool> = records.into_iter().filter_map(convert_b).collect();
                let skipped = total - pools.len();
                (pools, skipped)
            }
        };
        if skipped > 0 {
            warn!(indexer = %self.name, skipped, "dropped malformed pool records");
        }
        debug!(indexer = %self.name, pools = records.len(), "indexer query complete");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexroute_domain::enums::PoolClass;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_venue_u_record() {
        let json = r#"{
            "id": "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640",
            "feeTier": "500",
            "sqrtPrice": "79228162514264337593543950336",
            "liquidity": "1000000000000000000",
            "tick": "0",
            "token0": {"id": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "symbol": "USDC", "decimals": "6"},
            "token1": {"id": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "symbol": "WETH", "decimals": "18"},
            "totalValueLockedToken0": "1500000.25",
            "totalValueLockedToken1": "640.5",
            "ticks": [
                {"tickIdx": "-600", "liquidityNet": "1000000000000000000", "liquidityGross": "1000000000000000000"},
                {"tickIdx": "600", "liquidityNet": "-1000000000000000000", "liquidityGross": "1000000000000000000"}
            ]
        }"#;
        let raw = convert_u(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(raw.swap_fee.pips(), 500);
        assert!(raw.is_active());
        let state = raw.concentrated.as_ref().unwrap();
        assert_eq!(state.tick_spacing, 10);
        assert_eq!(state.ticks.len(), 2);

        let pool = raw.to_pool(raw.concentrated_params().unwrap()).unwrap();
        assert_eq!(pool.class(), PoolClass::Concentrated);
        assert_eq!(pool.balances[0].to_string(), "1500000250000");
        assert_eq!(pool.balances[1].to_string(), "640500000000000000000");
        assert!(pool.validate().is_ok());
    }

    #[test]
    fn test_convert_venue_b_record() {
        let json = r#"{
            "id": "0x5c6ee304399dbdb9c8ef030ab642b10820db8f56000200000000000000000014",
            "address": "0x5c6ee304399dbdb9c8ef030ab642b10820db8f56",
            "name": "Balancer 80 BAL 20 WETH",
            "swapFee": "0.01",
            "isPaused": false,
            "isInRecoveryMode": true,
            "tokens": [
                {"address": "0xba100000625a3754423978a60c9317c58a424e3d", "balance": "100.5", "decimals": 18, "symbol": "BAL"},
                {"address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "balance": "3", "decimals": 18, "symbol": "WETH"}
            ]
        }"#;
        let raw = convert_b(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(raw.id.as_bytes().len(), 32);
        assert_eq!(raw.swap_fee.to_decimal(), dec!(0.01));
        assert!(!raw.is_active());
        assert_eq!(raw.token_symbols(), vec!["BAL".to_string(), "WETH".to_string()]);
    }

    #[test]
    fn test_malformed_records_dropped() {
        let json = r#"{
            "id": "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640",
            "feeTier": "1234",
            "sqrtPrice": "1",
            "liquidity": "1",
            "tick": null,
            "token0": {"id": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "symbol": "USDC", "decimals": "6"},
            "token1": {"id": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "symbol": "WETH", "decimals": "18"},
            "totalValueLockedToken0": "1",
            "totalValueLockedToken1": "1"
        }"#;
        // Fee tier without a known tick spacing.
        assert!(convert_u(serde_json::from_str(json).unwrap()).is_none());
    }

    #[test]
    fn test_bad_balance_fails_conversion() {
        let raw = RawPool {
            venue: Venue::B,
            id: PoolId::new(vec![1]),
            address: Address::NATIVE,
            name: None,
            swap_fee: SwapFee::ZERO,
            tokens: vec![RawToken {
                address: Address::NATIVE,
                balance: "12,5".into(),
                decimals: 18,
                symbol: "X".into(),
            }],
            paused: false,
            in_recovery_mode: false,
            concentrated: None,
        };
        assert!(matches!(
            raw.to_pool(PoolParams::Unknown),
            Err(ConversionError::Balance(_, _))
        ));
    }
}
