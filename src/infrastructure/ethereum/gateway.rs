//! Node-backed wallet session and chain client
//!
//! A gateway owns one lazily connected provider per known chain and tracks
//! which chain is active. Switching only selects a known endpoint; adding a
//! chain connects to its first RPC URL and checks `eth_chainId` first.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxKind};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::domain::chain::ChainContext;
use crate::domain::ports::{
    CallEncoder, ChainClient, ReadCall, TxHandle, TxRequest, WalletError, WalletSession,
};
use crate::infrastructure::ethereum::provider::{create_provider, ProviderConfig};

/// EIP-1193 code for a request the user declined
const USER_REJECTED_CODE: i64 = 4001;

pub struct AlloyGateway {
    encoder: Arc<dyn CallEncoder>,
    account: Option<String>,
    endpoints: RwLock<BTreeMap<u64, ProviderConfig>>,
    providers: Mutex<HashMap<u64, DynProvider>>,
    active: RwLock<Option<u64>>,
}

impl AlloyGateway {
    /// Gateway over `endpoints`, keyed by chain id
    ///
    /// `active` defaults to the lowest configured chain id.
    pub fn new(
        encoder: Arc<dyn CallEncoder>,
        endpoints: BTreeMap<u64, ProviderConfig>,
        active: Option<u64>,
    ) -> Self {
        let active = active
            .filter(|id| endpoints.contains_key(id))
            .or_else(|| endpoints.keys().next().copied());
        Self {
            encoder,
            account: None,
            endpoints: RwLock::new(endpoints),
            providers: Mutex::new(HashMap::new()),
            active: RwLock::new(active),
        }
    }

    /// Connect to a single endpoint and use whatever chain it reports
    pub async fn connect(encoder: Arc<dyn CallEncoder>, endpoint: ProviderConfig) -> Result<Self> {
        let provider = create_provider(&endpoint).await?;
        let chain_id = provider
            .get_chain_id()
            .await
            .with_context(|| format!("Failed to query chain id from {endpoint}"))?;
        let gateway = Self::new(encoder, BTreeMap::from([(chain_id, endpoint)]), Some(chain_id));
        gateway.providers.lock().await.insert(chain_id, provider);
        Ok(gateway)
    }

    pub fn with_account(mut self, account: Option<String>) -> Self {
        self.account = account.filter(|account| !account.trim().is_empty());
        self
    }

    /// First account the active node manages, for dev nodes like Anvil
    pub async fn node_account(&self) -> Result<Option<String>> {
        let chain_id = self.active_chain().await?;
        let provider = self.provider(chain_id).await?;
        let accounts = provider.get_accounts().await.context("eth_accounts failed")?;
        Ok(accounts.first().map(|address| address.to_checksum(None)))
    }

    pub async fn known_chains(&self) -> Vec<u64> {
        self.endpoints.read().await.keys().copied().collect()
    }

    async fn active_chain(&self) -> Result<u64> {
        self.active
            .read()
            .await
            .ok_or_else(|| anyhow!("no chain endpoint configured"))
    }

    async fn provider(&self, chain_id: u64) -> Result<DynProvider> {
        let mut providers = self.providers.lock().await;
        if let Some(provider) = providers.get(&chain_id) {
            return Ok(provider.clone());
        }
        let endpoint = self
            .endpoints
            .read()
            .await
            .get(&chain_id)
            .cloned()
            .ok_or_else(|| anyhow!("no endpoint for chain {chain_id}"))?;
        debug!(chain_id, endpoint = %endpoint, "connecting");
        let provider = create_provider(&endpoint).await?;
        providers.insert(chain_id, provider.clone());
        Ok(provider)
    }
}

#[async_trait::async_trait]
impl WalletSession for AlloyGateway {
    fn account(&self) -> Option<String> {
        self.account.clone()
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.active_chain()
            .await
            .map_err(|err| WalletError::Other(err.to_string()))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        if !self.endpoints.read().await.contains_key(&chain_id) {
            return Err(WalletError::UnrecognizedChain(chain_id));
        }
        *self.active.write().await = Some(chain_id);
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainContext) -> Result<(), WalletError> {
        let rpc = chain
            .rpc_urls
            .iter()
            .map(|url| url.trim())
            .find(|url| !url.is_empty())
            .ok_or_else(|| WalletError::Other("no rpc url to register".into()))?;
        let endpoint = ProviderConfig::parse(rpc);
        let provider = create_provider(&endpoint)
            .await
            .map_err(|err| WalletError::Other(format!("{err:#}")))?;
        let reported = provider
            .get_chain_id()
            .await
            .map_err(|err| WalletError::Other(err.to_string()))?;
        if reported != chain.chain_id {
            return Err(WalletError::Other(format!(
                "{endpoint} serves chain {reported}, expected {}",
                chain.chain_id
            )));
        }

        info!(chain_id = chain.chain_id, endpoint = %endpoint, "registered chain endpoint");
        self.endpoints.write().await.insert(chain.chain_id, endpoint);
        self.providers.lock().await.insert(chain.chain_id, provider);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChainClient for AlloyGateway {
    async fn read_contract(&self, call: ReadCall) -> Result<Value> {
        let data = self.encoder.encode_call(&call.function, &call.args)?;
        let output = self.call(&call.address, data, call.chain_id).await?;
        Ok(self.encoder.decode_output(&call.function, &output)?)
    }

    async fn call(&self, to: &str, data: Bytes, chain_id: u64) -> Result<Bytes> {
        let to = parse_address(to)?;
        let provider = self.provider(chain_id).await?;
        let request = TransactionRequest {
            to: Some(TxKind::Call(to)),
            input: TransactionInput::new(data),
            ..Default::default()
        };
        Ok(provider.call(request).await?)
    }

    async fn send_transaction(&self, request: TxRequest) -> Result<TxHandle, WalletError> {
        let other = |err: anyhow::Error| WalletError::Other(format!("{err:#}"));
        let from = request
            .from
            .as_deref()
            .map(parse_address)
            .transpose()
            .map_err(other)?;
        let to = match request.to.as_deref() {
            Some(to) => TxKind::Call(parse_address(to).map_err(other)?),
            None => TxKind::Create,
        };
        let provider = self.provider(request.chain_id).await.map_err(other)?;

        let tx = TransactionRequest {
            from,
            to: Some(to),
            value: Some(request.value),
            input: TransactionInput::new(request.data),
            gas: request.gas,
            chain_id: Some(request.chain_id),
            ..Default::default()
        };
        let pending = provider.send_transaction(tx).await.map_err(|err| {
            let rejected = err
                .as_error_resp()
                .is_some_and(|payload| payload.code == USER_REJECTED_CODE);
            if rejected || err.to_string().to_lowercase().contains("user rejected") {
                WalletError::UserRejected
            } else {
                WalletError::Other(err.to_string())
            }
        })?;

        Ok(TxHandle {
            hash: pending.tx_hash().to_string(),
            chain_id: request.chain_id,
        })
    }
}

fn parse_address(text: &str) -> Result<Address> {
    Address::from_str(text.trim()).with_context(|| format!("Invalid address '{text}'"))
}
