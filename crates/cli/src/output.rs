//! Terminal rendering of plans and cache contents.

use dexroute_data::cache::PoolCache;
use dexroute_domain::entities::ExecutionPlan;
use dexroute_domain::value_objects::format_units;
use prettytable::{Table, row};
use rust_decimal::Decimal;

fn short(hex: &str) -> String {
    if hex.len() <= 14 {
        hex.to_string()
    } else {
        format!("{}…{}", &hex[..8], &hex[hex.len() - 4..])
    }
}

pub fn print_plan(plan: &ExecutionPlan, decimals_in: u8, decimals_out: u8) {
    println!("\n📊 Execution plan");
    let mut summary = Table::new();
    summary.add_row(row!["Amount in", format_units(&plan.amount_in, decimals_in)]);
    summary.add_row(row!["Expected out", format_units(&plan.expected_output, decimals_out)]);
    summary.add_row(row!["Minimum out", format_units(&plan.min_output, decimals_out)]);
    summary.add_row(row!["Slippage", format!("{}%", plan.slippage * Decimal::ONE_HUNDRED)]);
    summary.add_row(row!["Gas estimate", plan.total_gas_estimate]);
    summary.add_row(row!["Gas cost (out)", format_units(&plan.gas_cost_in_output, decimals_out)]);
    summary.add_row(row!["Balance score", plan.balance_score.round_dp(6)]);
    summary.printstd();

    let mut splits = Table::new();
    splits.add_row(row!["#", "Share", "Route", "Venues", "Expected out"]);
    for (index, split) in plan.splits.iter().enumerate() {
        splits.add_row(row![
            index,
            format!("{}%", (split.fraction * Decimal::ONE_HUNDRED).round_dp(4)),
            split.route,
            format!("{:?}", split.route.venue_tag),
            format_units(&split.expected_output, decimals_out)
        ]);
    }
    splits.printstd();

    let mut steps = Table::new();
    steps.add_row(row!["Leg", "Venue", "Method", "Pools", "In", "Min out", "All balance", "Gas"]);
    for step in &plan.steps {
        steps.add_row(row![
            format!("{}/{}", step.split_index + 1, step.split_total),
            step.venue,
            step.method,
            step.pools.len(),
            step.amount_in,
            step.min_amount_out,
            step.use_all_balance,
            step.gas_estimate
        ]);
    }
    steps.printstd();

    if !plan.approvals.is_empty() {
        let mut approvals = Table::new();
        approvals.add_row(row!["Token", "Spender", "Amount"]);
        for approval in &plan.approvals {
            approvals.add_row(row![
                short(&approval.token.to_hex()),
                short(&approval.spender.to_hex()),
                approval.amount
            ]);
        }
        approvals.printstd();
    }
    for warning in &plan.warnings {
        println!("⚠️  {warning}");
    }
}

pub fn print_cache(cache: &PoolCache) {
    println!(
        "Pool cache v{} · {} pools · updated {}",
        cache.version,
        cache.len(),
        cache.last_updated.format("%Y-%m-%d %H:%M:%S")
    );
    if cache.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.add_row(row!["Pool", "Venue", "Class", "Weights", "Amp", "Queried"]);
    for (id, entry) in &cache.pools {
        let weights = entry
            .weights
            .as_ref()
            .map(|w| w.iter().map(u32::to_string).collect::<Vec<_>>().join("/"))
            .unwrap_or_default();
        let amp = entry.amplification_parameter.map(|a| a.to_string()).unwrap_or_default();
        table.add_row(row![
            short(id),
            entry.venue,
            format!("{:?}", entry.class),
            weights,
            amp,
            entry.queried_at.format("%Y-%m-%d %H:%M")
        ]);
    }
    table.printstd();
}
