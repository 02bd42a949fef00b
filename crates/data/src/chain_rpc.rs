use alloy::network::Ethereum;
use alloy::primitives::{Bytes, TxKind};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::eth::{TransactionInput, TransactionRequest};
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use dexroute_domain::value_objects::Address;
use dexroute_protocols::abi::evm_address;
use dexroute_protocols::chain::Chain;
use dexroute_protocols::error::AdapterError;
use std::time::Duration;
use tokio::time::timeout;
use tracing::trace;
use url::Url;

const SOURCE: &str = "rpc";

/// JSON-RPC error codes nodes and gateways use for throttling.
const RATE_LIMIT_CODES: [i64; 2] = [-32005, 429];

pub type HttpProvider = RootProvider<Ethereum>;

/// `eth_call` against the latest block through an HTTP provider.
pub struct RpcChain {
    provider: HttpProvider,
    deadline: Duration,
}

impl RpcChain {
    /// # Errors
    /// `AdapterError::Unavailable` when `rpc_url` is not a valid URL.
    pub fn new(rpc_url: &str, deadline: Duration) -> Result<Self, AdapterError> {
        let url = Url::parse(rpc_url).map_err(|e| AdapterError::unavailable(SOURCE, format!("invalid RPC URL: {e}")))?;
        Ok(Self::with_provider(RootProvider::new_http(url), deadline))
    }

    pub fn with_provider(provider: HttpProvider, deadline: Duration) -> Self {
        Self { provider, deadline }
    }
}

fn classify_rpc_error(code: i64, message: &str) -> AdapterError {
    if RATE_LIMIT_CODES.contains(&code) || message.to_ascii_lowercase().contains("rate limit") {
        AdapterError::RateLimited(SOURCE.to_string())
    } else {
        AdapterError::unavailable(SOURCE, format!("{message} ({code})"))
    }
}

fn map_rpc_error(err: &RpcError<TransportErrorKind>) -> AdapterError {
    if let Some(payload) = err.as_error_resp() {
        return classify_rpc_error(payload.code, &payload.message);
    }
    match err.as_transport_err() {
        Some(TransportErrorKind::HttpError(http)) if http.is_rate_limit_err() => {
            AdapterError::RateLimited(SOURCE.to_string())
        }
        Some(TransportErrorKind::HttpError(http)) => AdapterError::unavailable(SOURCE, format!("HTTP {}", http.status)),
        _ => AdapterError::unavailable(SOURCE, err),
    }
}

#[async_trait]
impl Chain for RpcChain {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AdapterError> {
        trace!(%to, len = data.len(), "eth_call");
        let request = TransactionRequest {
            to: Some(TxKind::Call(evm_address(to))),
            input: TransactionInput::new(data),
            ..Default::default()
        };
        match timeout(self.deadline, self.provider.call(request)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(err)) => Err(map_rpc_error(&err)),
            Err(_) => Err(AdapterError::Timeout(SOURCE.to_string())),
        }
    }
}
