use async_trait::async_trait;
use dexroute_domain::value_objects::Address;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// USD prices for gas accounting. Best effort: `None` means unknown.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn eth_usd(&self) -> Option<Decimal>;
    async fn token_usd(&self, token: &Address) -> Option<Decimal>;
}

/// Fixed prices taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed {
    eth_usd: Option<Decimal>,
    tokens: HashMap<Address, Decimal>,
}

impl StaticPriceFeed {
    pub fn new(eth_usd: Option<Decimal>) -> Self {
        Self {
            eth_usd,
            tokens: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Address, usd: Decimal) -> Self {
        self.tokens.insert(token, usd);
        self
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn eth_usd(&self) -> Option<Decimal> {
        self.eth_usd
    }

    async fn token_usd(&self, token: &Address) -> Option<Decimal> {
        self.tokens.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexroute_domain::config::USDC;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_static_prices() {
        let feed = StaticPriceFeed::new(Some(dec!(3000))).with_token(USDC, dec!(1));
        assert_eq!(feed.eth_usd().await, Some(dec!(3000)));
        assert_eq!(feed.token_usd(&USDC).await, Some(dec!(1)));
        assert_eq!(feed.token_usd(&Address::NATIVE).await, None);
        assert_eq!(StaticPriceFeed::default().eth_usd().await, None);
    }
}
