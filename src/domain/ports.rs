//! Collaborator contracts
//!
//! The engine never talks to a wallet or node directly. These traits are the
//! narrow surfaces it calls through; `infrastructure` provides alloy-backed
//! implementations and tests provide in-memory ones.

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Bytes, U256};
use serde_json::Value;
use thiserror::Error;

use crate::domain::abi::ResolvedFunction;
use crate::domain::chain::ChainContext;
use crate::domain::error::EngineResult;

/// Failures reported by the wallet for switch/register/send prompts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("user rejected the request")]
    UserRejected,
    #[error("chain {0} is not recognized by the wallet")]
    UnrecognizedChain(u64),
    #[error("{0}")]
    Other(String),
}

/// Wallet/session provider
#[async_trait::async_trait]
pub trait WalletSession: Send + Sync {
    /// Currently connected account, if any
    fn account(&self) -> Option<String>;

    /// Active chain of the connection
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Ask the wallet to switch its active chain
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Ask the wallet to register an unknown chain
    async fn add_chain(&self, chain: &ChainContext) -> Result<(), WalletError>;
}

/// A read-only contract call
#[derive(Debug, Clone)]
pub struct ReadCall {
    pub address: String,
    pub abi: JsonAbi,
    pub function: ResolvedFunction,
    pub args: Vec<Value>,
    pub chain_id: u64,
}

/// A transaction ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// `None` for contract creation
    pub to: Option<String>,
    pub from: Option<String>,
    pub value: U256,
    pub data: Bytes,
    pub gas: Option<u64>,
    pub chain_id: u64,
}

/// Handle of a submitted, pending transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHandle {
    pub hash: String,
    pub chain_id: u64,
}

/// Chain client capabilities
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Perform an ABI read and return the decoded result
    ///
    /// A single output is returned bare; several outputs as an array.
    async fn read_contract(&self, call: ReadCall) -> anyhow::Result<Value>;

    /// Raw `eth_call` with prepared data
    async fn call(&self, to: &str, data: Bytes, chain_id: u64) -> anyhow::Result<Bytes>;

    /// Submit a transaction and return its pending handle
    async fn send_transaction(&self, request: TxRequest) -> Result<TxHandle, WalletError>;
}

/// ABI encoding/decoding of concrete argument values
pub trait CallEncoder: Send + Sync {
    /// Selector followed by the encoded arguments
    fn encode_call(&self, function: &ResolvedFunction, args: &[Value]) -> EngineResult<Bytes>;

    /// Bytecode followed by the encoded constructor arguments
    fn encode_deploy(
        &self,
        bytecode: &[u8],
        constructor: Option<&ResolvedFunction>,
        args: &[Value],
    ) -> EngineResult<Bytes>;

    /// Decode return data into JSON (bare value for a single output)
    fn decode_output(&self, function: &ResolvedFunction, data: &[u8]) -> EngineResult<Value>;
}
