//! In-memory wallet and chain client for driving the engine without a node

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use alloy_primitives::Bytes;
use serde_json::Value;

use actionpad::domain::{
    ChainClient, ChainContext, ChainRegistry, ReadCall, TxHandle, TxRequest, WalletError,
    WalletSession,
};
use actionpad::Engine;

pub const ACCOUNT: &str = "0x00000000000000000000000000000000000000c0";
pub const TOKEN: &str = "0x000000000000000000000000000000000000aaaa";
pub const RECIPIENT: &str = "0x000000000000000000000000000000000000bbbb";

pub struct MockWallet {
    pub account: Option<String>,
    pub chain: Mutex<u64>,
    pub known: Mutex<BTreeSet<u64>>,
    pub reject_switch: bool,
    /// Accept `add_chain` but keep the chain unknown
    pub ignore_added: bool,
    pub switches: Mutex<Vec<u64>>,
    pub added: Mutex<Vec<ChainContext>>,
}

impl MockWallet {
    pub fn new(chain: u64, known: &[u64]) -> Self {
        Self {
            account: Some(ACCOUNT.to_string()),
            chain: Mutex::new(chain),
            known: Mutex::new(known.iter().copied().chain([chain]).collect()),
            reject_switch: false,
            ignore_added: false,
            switches: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected(chain: u64) -> Self {
        Self {
            account: None,
            ..Self::new(chain, &[])
        }
    }

    pub fn switches(&self) -> Vec<u64> {
        self.switches.lock().unwrap().clone()
    }

    pub fn added(&self) -> Vec<ChainContext> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl WalletSession for MockWallet {
    fn account(&self) -> Option<String> {
        self.account.clone()
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(*self.chain.lock().unwrap())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.switches.lock().unwrap().push(chain_id);
        if self.reject_switch {
            return Err(WalletError::UserRejected);
        }
        if !self.known.lock().unwrap().contains(&chain_id) {
            return Err(WalletError::UnrecognizedChain(chain_id));
        }
        *self.chain.lock().unwrap() = chain_id;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainContext) -> Result<(), WalletError> {
        self.added.lock().unwrap().push(chain.clone());
        if !self.ignore_added {
            self.known.lock().unwrap().insert(chain.chain_id);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockClient {
    /// Read results keyed by function name
    pub reads: Mutex<HashMap<String, Value>>,
    pub raw_result: Bytes,
    pub reject_send: bool,
    pub read_calls: Mutex<Vec<ReadCall>>,
    pub raw_calls: Mutex<Vec<(String, Bytes, u64)>>,
    pub sent: Mutex<Vec<TxRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read(self, function: &str, result: Value) -> Self {
        self.reads.lock().unwrap().insert(function.to_string(), result);
        self
    }

    pub fn sent(&self) -> Vec<TxRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn read_calls(&self) -> Vec<ReadCall> {
        self.read_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChainClient for MockClient {
    async fn read_contract(&self, call: ReadCall) -> anyhow::Result<Value> {
        let result = self
            .reads
            .lock()
            .unwrap()
            .get(&call.function.name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("execution reverted\ncall to {}", call.function.name))?;
        self.read_calls.lock().unwrap().push(call);
        Ok(result)
    }

    async fn call(&self, to: &str, data: Bytes, chain_id: u64) -> anyhow::Result<Bytes> {
        self.raw_calls
            .lock()
            .unwrap()
            .push((to.to_string(), data, chain_id));
        Ok(self.raw_result.clone())
    }

    async fn send_transaction(&self, request: TxRequest) -> Result<TxHandle, WalletError> {
        if self.reject_send {
            return Err(WalletError::UserRejected);
        }
        let mut sent = self.sent.lock().unwrap();
        let chain_id = request.chain_id;
        sent.push(request);
        Ok(TxHandle {
            hash: format!("0x{:064x}", sent.len()),
            chain_id,
        })
    }
}

pub fn engine(client: &Arc<MockClient>, wallet: &Arc<MockWallet>) -> Engine {
    engine_with_registry(client, wallet, ChainRegistry::new())
}

pub fn engine_with_registry(
    client: &Arc<MockClient>,
    wallet: &Arc<MockWallet>,
    registry: ChainRegistry,
) -> Engine {
    Engine::new(client.clone(), wallet.clone(), registry)
}

pub fn erc20_abi() -> Value {
    serde_json::json!([
        {
            "type": "function", "name": "transfer", "stateMutability": "nonpayable",
            "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
            "outputs": [{"name": "", "type": "bool"}]
        },
        {
            "type": "function", "name": "balanceOf", "stateMutability": "view",
            "inputs": [{"name": "owner", "type": "address"}],
            "outputs": [{"name": "balance", "type": "uint256"}]
        }
    ])
}
