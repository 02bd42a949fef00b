//! Command line interface of the swap router.
mod logging;
mod output;
mod settings;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dexroute_data::prelude::*;
use dexroute_domain::config::{OptimizeOptions, RouterConfig};
use dexroute_domain::enums::Venue;
use dexroute_domain::value_objects::{Address, parse_units};
use dexroute_protocols::chain::Chain;
use dexroute_routing::router::SwapRouter;
use dotenv::dotenv;
use rust_decimal::Decimal;
use settings::{ENV_RPC_URL, Settings, load_router_config};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Parser)]
#[command(name = "dexroute")]
#[command(about = "Off-chain swap router for concentrated-liquidity and weighted/stable venues", long_about = None)]
struct Cli {
    /// JSON file with router configuration overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the best execution plan for a swap
    Quote {
        /// Token sold (0x0000000000000000000000000000000000000000 for native)
        #[arg(long)]
        token_in: Address,

        /// Token bought
        #[arg(long)]
        token_out: Address,

        /// Amount sold, in whole tokens (e.g. 1.5)
        #[arg(long)]
        amount: String,

        /// Decimals of the token sold
        #[arg(long, default_value_t = 18)]
        decimals_in: u8,

        /// Decimals of the token bought, for display only
        #[arg(long, default_value_t = 18)]
        decimals_out: u8,

        /// Slippage tolerance as a fraction (0.005 = 0.5%)
        #[arg(long, default_value = "0.005")]
        slippage: Decimal,

        /// Maximum pool hops per route
        #[arg(long, default_value_t = 3)]
        max_hops: u8,

        /// Skip the concentrated-liquidity venue
        #[arg(long)]
        no_venue_u: bool,

        /// Skip the weighted/stable venue
        #[arg(long)]
        no_venue_b: bool,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or reset the pool cache file
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print cached pool classes
    Show,
    /// Delete the cache file
    Clear,
}

fn build_router(settings: &Settings, config: RouterConfig) -> Result<SwapRouter> {
    let deadline = Duration::from_secs(config.io_deadline_secs);
    let mut indexers: Vec<Arc<dyn Indexer>> = Vec::new();
    for (venue, url) in [(Venue::U, &settings.indexer_u), (Venue::B, &settings.indexer_b)] {
        match url {
            Some(url) => indexers.push(Arc::new(GraphQlIndexer::new(venue, url.clone(), deadline)?)),
            None => warn!(%venue, "no indexer endpoint configured, venue disabled"),
        }
    }
    if indexers.is_empty() {
        bail!("no indexer endpoint configured (DEXROUTE_INDEXER_U / DEXROUTE_INDEXER_B)");
    }
    let rpc_url = settings
        .rpc_url
        .clone()
        .with_context(|| format!("{ENV_RPC_URL} must be set in .env or environment"))?;
    let chain: Arc<dyn Chain> = Arc::new(RpcChain::new(&rpc_url, deadline)?);
    let store: Arc<dyn CacheStore> = Arc::new(JsonFileCache::new(&settings.cache_path));
    let registry = PoolRegistry::new(indexers, chain, store);
    let prices = Arc::new(StaticPriceFeed::new(settings.eth_usd));
    Ok(SwapRouter::new(config, registry, prices))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    logging::setup_logging(&cli.log_level, cli.json_logs);

    let settings = Settings::from_env()?;
    let config = load_router_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Quote {
            token_in,
            token_out,
            amount,
            decimals_in,
            decimals_out,
            slippage,
            max_hops,
            no_venue_u,
            no_venue_b,
            json,
        } => {
            let amount_in = parse_units(&amount, decimals_in)
                .with_context(|| format!("{amount} is not an amount with {decimals_in} decimals"))?;
            let use_venue_u = !no_venue_u && settings.indexer_u.is_some();
            let use_venue_b = !no_venue_b && settings.indexer_b.is_some();
            let opts = OptimizeOptions {
                max_candidates: config.max_candidates,
                ..OptimizeOptions::default()
            }
            .with_slippage(slippage)
            .with_max_hops(max_hops)
            .with_venues(use_venue_u, use_venue_b);

            let router = build_router(&settings, config)?;
            if !json {
                println!("🔍 Routing {amount} {token_in} -> {token_out}...");
            }
            let plan = router.optimize(token_in, token_out, &amount_in, &opts).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_plan(&plan, decimals_in, decimals_out);
            }
        }
        Commands::Cache { action } => {
            let store = JsonFileCache::new(&settings.cache_path);
            match action {
                CacheAction::Show => output::print_cache(&store.load().await?),
                CacheAction::Clear => {
                    store.clear().await?;
                    println!("🗑️  Removed {}", store.path().display());
                }
            }
        }
    }

    Ok(())
}
