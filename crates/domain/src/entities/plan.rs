use crate::entities::route::Route;
use crate::enums::{StepMethod, StepVenue};
use crate::value_objects::amount::biguint_string;
use crate::value_objects::{Address, PoolId};
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One executor call of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub venue: StepVenue,
    pub method: StepMethod,
    /// Pools traversed in order; empty for Wrap/Unwrap.
    pub pools: Vec<PoolId>,
    pub token_in: Address,
    pub token_out: Address,
    #[serde(with = "biguint_string")]
    pub amount_in: BigUint,
    #[serde(with = "biguint_string")]
    pub expected_amount_out: BigUint,
    #[serde(with = "biguint_string")]
    pub min_amount_out: BigUint,
    /// Index of the split leg this step belongs to.
    pub split_index: usize,
    pub split_total: usize,
    /// Consume the whole runtime balance of `token_in` instead of `amount_in`.
    pub use_all_balance: bool,
    pub gas_estimate: u64,
}

/// Allowance the signer must grant before executing the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub token: Address,
    pub spender: Address,
    #[serde(with = "biguint_string")]
    pub amount: BigUint,
}

/// A route and the share of the input routed through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSplit {
    pub route: Route,
    pub fraction: Decimal,
    #[serde(with = "biguint_string")]
    pub amount_in: BigUint,
    #[serde(with = "biguint_string")]
    pub expected_output: BigUint,
}

/// The router's output: everything an external signer needs to assemble transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub token_in: Address,
    pub token_out: Address,
    #[serde(with = "biguint_string")]
    pub amount_in: BigUint,
    pub splits: Vec<PlanSplit>,
    pub steps: Vec<Step>,
    pub approvals: Vec<Approval>,
    #[serde(with = "biguint_string")]
    pub expected_output: BigUint,
    #[serde(with = "biguint_string")]
    pub min_output: BigUint,
    pub total_gas_estimate: u64,
    /// Gas cost expressed in raw output-token units (zero when prices are unknown).
    #[serde(with = "biguint_string")]
    pub gas_cost_in_output: BigUint,
    pub balance_score: Decimal,
    pub slippage: Decimal,
    /// Absorbed failures the caller may want to surface (cache IO, indexer deadlines).
    pub warnings: Vec<String>,
}

impl ExecutionPlan {
    pub fn is_split(&self) -> bool {
        self.splits.len() > 1
    }

    /// Expected output minus the gas cost, saturating at zero.
    pub fn net_output(&self) -> BigUint {
        if self.gas_cost_in_output >= self.expected_output {
            BigUint::default()
        } else {
            &self.expected_output - &self.gas_cost_in_output
        }
    }
}
