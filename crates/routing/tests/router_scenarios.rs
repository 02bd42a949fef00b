//! End-to-end requests against in-memory adapters.

use alloy::primitives::Bytes;
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use dexroute_data::prelude::*;
use dexroute_protocols::abi::IVenuePool;
use dexroute_protocols::chain::Chain;
use dexroute_protocols::error::AdapterError;
use dexroute_routing::prelude::*;
use num_bigint::BigUint;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use std::sync::Arc;

const WETH: Address = dexroute_domain::config::WETH;
const TKA: Address = Address::from_bytes([0xa1; 20]);
const TKB: Address = Address::from_bytes([0xb2; 20]);

struct StaticIndexer {
    venue: Venue,
    pools: Result<Vec<RawPool>, AdapterError>,
}

#[async_trait]
impl Indexer for StaticIndexer {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn pools(&self, _tokens: &[Address], _filters: &PoolFilters) -> Result<Vec<RawPool>, AdapterError> {
        self.pools.clone()
    }
}

/// Every pool reports 50/50 weights.
struct EvenWeightsChain;

#[async_trait]
impl Chain for EvenWeightsChain {
    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, AdapterError> {
        if !data.starts_with(&IVenuePool::getNormalizedWeightsCall::SELECTOR) {
            return Err(AdapterError::Decode("execution reverted".into()));
        }
        let half = alloy::primitives::U256::from(500_000_000_000_000_000u64);
        Ok(vec![half, half].abi_encode().into())
    }
}

fn raw_token(address: Address, balance: &str) -> RawToken {
    RawToken {
        address,
        balance: balance.into(),
        decimals: 18,
        symbol: format!("T{}", address.as_bytes()[0]),
    }
}

fn weighted_pool(tag: u8, a: (Address, &str), b: (Address, &str)) -> RawPool {
    RawPool {
        venue: Venue::B,
        id: PoolId::new(vec![tag; 32]),
        address: Address::from_bytes([tag; 20]),
        name: None,
        swap_fee: SwapFee::from_decimal(dec!(0.003)).unwrap(),
        tokens: vec![raw_token(a.0, a.1), raw_token(b.0, b.1)],
        paused: false,
        in_recovery_mode: false,
        concentrated: None,
    }
}

fn concentrated_pool(tag: u8, token0: Address, token1: Address) -> RawPool {
    let liquidity = 1_000_000_000_000_000_000_000i128;
    RawPool {
        venue: Venue::U,
        id: PoolId::new(vec![tag; 20]),
        address: Address::from_bytes([tag; 20]),
        name: None,
        swap_fee: SwapFee::from_pips(3000).unwrap(),
        tokens: vec![raw_token(token0, "250"), raw_token(token1, "250")],
        paused: false,
        in_recovery_mode: false,
        concentrated: Some(RawConcentrated {
            sqrt_price_x96: U256::one() << 96,
            liquidity: liquidity as u128,
            tick: 0,
            tick_spacing: 60,
            ticks: vec![
                Tick {
                    index: -6000,
                    liquidity_net: liquidity,
                    liquidity_gross: liquidity as u128,
                },
                Tick {
                    index: 6000,
                    liquidity_net: -liquidity,
                    liquidity_gross: liquidity as u128,
                },
            ],
        }),
    }
}

fn router(b_pools: Vec<RawPool>, u_pools: Vec<RawPool>) -> SwapRouter {
    let indexers: Vec<Arc<dyn Indexer>> = vec![
        Arc::new(StaticIndexer {
            venue: Venue::B,
            pools: Ok(b_pools),
        }),
        Arc::new(StaticIndexer {
            venue: Venue::U,
            pools: Ok(u_pools),
        }),
    ];
    let registry = PoolRegistry::new(indexers, Arc::new(EvenWeightsChain), Arc::new(InMemoryCache::new()));
    SwapRouter::new(RouterConfig::default(), registry, Arc::new(StaticPriceFeed::new(None)))
}

fn units(whole: u64) -> BigUint {
    BigUint::from(whole) * BigUint::from(10u64).pow(18)
}

fn to_decimal(value: &BigUint) -> Decimal {
    Decimal::from_str_exact(&value.to_string()).unwrap()
}

/// Structural invariants every plan must satisfy.
fn assert_plan_invariants(plan: &ExecutionPlan, slippage: Decimal) {
    let spent: BigUint = plan
        .steps
        .iter()
        .filter(|s| s.token_in == plan.token_in)
        .map(|s| &s.amount_in)
        .sum();
    assert_eq!(spent, plan.amount_in);

    let mut intermediate = BTreeSet::new();
    for step in &plan.steps {
        for token in [step.token_in, step.token_out] {
            if token != plan.token_in && token != plan.token_out {
                intermediate.insert(token);
            }
        }
    }
    for token in intermediate {
        let produced: BigUint = plan
            .steps
            .iter()
            .filter(|s| s.token_out == token)
            .map(|s| &s.expected_amount_out)
            .sum();
        let consumed: BigUint = plan
            .steps
            .iter()
            .filter(|s| s.token_in == token)
            .map(|s| &s.amount_in)
            .sum();
        assert_eq!(produced, consumed, "token {token} is not balanced");
    }

    assert!(plan.min_output <= plan.expected_output);
    let expected = to_decimal(&plan.expected_output);
    let gap = (expected - to_decimal(&plan.min_output)) / expected;
    assert!(gap <= slippage + dec!(0.000000001));

    for step in &plan.steps {
        if matches!(step.venue, StepVenue::Wrap | StepVenue::Unwrap) {
            assert_eq!(step.amount_in, step.expected_amount_out);
        }
    }
}

#[tokio::test]
async fn test_dominant_route_takes_everything() {
    // The second pool prices TKB at half the first: splitting never helps.
    let router = router(
        vec![
            weighted_pool(1, (TKA, "1000"), (TKB, "1000")),
            weighted_pool(2, (TKA, "1000"), (TKB, "500")),
        ],
        Vec::new(),
    );
    let opts = OptimizeOptions::default();
    let plan = router.optimize(TKA, TKB, &units(1), &opts).await.unwrap();

    assert!(!plan.is_split());
    assert_eq!(plan.splits[0].fraction, Decimal::ONE);
    assert_eq!(plan.splits[0].route.pool_key(), vec![PoolId::new(vec![1; 32])]);
    assert_eq!(plan.steps.len(), 1);
    assert_plan_invariants(&plan, opts.slippage);
}

#[tokio::test]
async fn test_shared_first_hop_split() {
    let router = router(
        vec![
            weighted_pool(1, (TKA, "1000000"), (WETH, "1000000")),
            weighted_pool(2, (WETH, "1000"), (TKB, "1000")),
            weighted_pool(3, (WETH, "1000"), (TKB, "1000")),
        ],
        Vec::new(),
    );
    let opts = OptimizeOptions::default();
    let plan = router.optimize(TKA, TKB, &units(200), &opts).await.unwrap();

    assert!(plan.is_split());
    let total: Decimal = plan.splits.iter().map(|s| s.fraction).sum();
    assert!((total - Decimal::ONE).abs() <= dec!(0.000001));
    assert!(plan.splits.iter().all(|s| s.route.pool_key()[0] == PoolId::new(vec![1; 32])));

    let indices: BTreeSet<usize> = plan.steps.iter().map(|s| s.split_index).collect();
    assert_eq!(indices.len(), plan.splits.len());
    let last_input_step = plan
        .steps
        .iter()
        .rposition(|s| s.token_in == TKA)
        .unwrap();
    for (index, step) in plan.steps.iter().enumerate() {
        if step.token_in == TKA {
            assert_eq!(step.use_all_balance, index == last_input_step);
        }
    }
    assert_eq!(plan.approvals.len(), 1);
    assert_eq!(plan.approvals[0].amount, units(200));
    assert_plan_invariants(&plan, opts.slippage);
}

#[tokio::test]
async fn test_native_to_wrapped_is_one_wrap() {
    let router = router(Vec::new(), Vec::new());
    let plan = router
        .optimize(Address::NATIVE, WETH, &units(2), &OptimizeOptions::default())
        .await
        .unwrap();

    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].venue, StepVenue::Wrap);
    let route = &plan.splits[0].route;
    assert!(route.requires_wrap && !route.requires_unwrap);
    assert_eq!(plan.expected_output, units(2));
    assert!(plan.approvals.is_empty());
    assert_plan_invariants(&plan, plan.slippage);
}

#[tokio::test]
async fn test_native_input_through_concentrated_pool() {
    let router = router(Vec::new(), vec![concentrated_pool(9, WETH, TKB)]);
    let opts = OptimizeOptions::default();
    let plan = router.optimize(Address::NATIVE, TKB, &units(1), &opts).await.unwrap();

    let wraps = plan.steps.iter().filter(|s| s.venue == StepVenue::Wrap).count();
    assert_eq!(wraps, 1);
    assert!(plan.steps.iter().all(|s| s.venue != StepVenue::Unwrap));
    assert_eq!(plan.steps[1].venue, StepVenue::U);
    assert_eq!(plan.approvals[0].token, WETH);
    assert!(plan.expected_output > units(0));
    assert_plan_invariants(&plan, opts.slippage);
}

#[tokio::test]
async fn test_identical_requests_give_identical_plans() {
    let pools = || {
        vec![
            weighted_pool(1, (TKA, "5000"), (TKB, "5000")),
            weighted_pool(2, (TKA, "3000"), (TKB, "3100")),
            weighted_pool(3, (TKA, "800"), (WETH, "800")),
            weighted_pool(4, (WETH, "900"), (TKB, "900")),
        ]
    };
    let opts = OptimizeOptions::default().with_slippage(dec!(0.01));
    let first = router(pools(), Vec::new())
        .optimize(TKA, TKB, &units(700), &opts)
        .await
        .unwrap();
    let second = router(pools(), Vec::new())
        .optimize(TKA, TKB, &units(700), &opts)
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_plan_invariants(&first, opts.slippage);
}

#[tokio::test]
async fn test_request_errors() {
    let router = router(vec![weighted_pool(1, (TKA, "10"), (TKB, "10"))], Vec::new());
    let opts = OptimizeOptions::default();

    let zero = router.optimize(TKA, TKB, &BigUint::default(), &opts).await;
    assert!(matches!(zero, Err(RouterError::InvalidConfig(_))));

    let same = router.optimize(TKA, TKA, &units(1), &opts).await;
    assert!(matches!(same, Err(RouterError::InvalidConfig(_))));

    let unreachable = router.optimize(TKA, WETH, &units(1), &opts).await;
    assert!(matches!(unreachable, Err(RouterError::NoLiquidity)));

    let bad_hops = router
        .optimize(TKA, TKB, &units(1), &OptimizeOptions::default().with_max_hops(0))
        .await;
    assert!(matches!(bad_hops, Err(RouterError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_rate_limit_is_retriable() {
    let indexers: Vec<Arc<dyn Indexer>> = vec![Arc::new(StaticIndexer {
        venue: Venue::B,
        pools: Err(AdapterError::RateLimited("indexer-b".into())),
    })];
    let registry = PoolRegistry::new(indexers, Arc::new(EvenWeightsChain), Arc::new(InMemoryCache::new()));
    let router = SwapRouter::new(RouterConfig::default(), registry, Arc::new(StaticPriceFeed::default()));

    let err = router
        .optimize(TKA, TKB, &units(1), &OptimizeOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_retriable());
    assert!(matches!(err, RouterError::RateLimited { .. }));
}
