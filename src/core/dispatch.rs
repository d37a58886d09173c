//! Execution dispatch - builds the final call and routes it to read or send

use std::sync::Arc;

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Bytes, U256};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::introspect::{parse_abi, resolve_callable};
use crate::core::network::NetworkCoordinator;
use crate::core::resolver::{pending_inputs, InputSlot, ReadPath};
use crate::domain::abi::ResolvedFunction;
use crate::domain::button::{ButtonConfig, CallBasis, ChainField, ASK_PLACEHOLDER};
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::number::parse_uint;
use crate::domain::ports::{
    CallEncoder, ChainClient, ReadCall, TxHandle, TxRequest, WalletError, WalletSession,
};

/// Outcome of a dispatched call
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// Decoded result of a read-only call
    Read(Value),
    /// Handle of a submitted transaction
    Sent(TxHandle),
}

/// The callable a button invokes, with the ABI it was taken from
#[derive(Debug, Clone)]
pub struct Callable {
    pub abi: JsonAbi,
    pub function: ResolvedFunction,
}

/// Determine the function or constructor a button targets
///
/// Returns `None` for raw-data calls and for deployments without a constructor.
/// Deployment arguments without an ABI to encode them are `NotFound`.
pub fn callable_for(config: &ButtonConfig) -> EngineResult<Option<Callable>> {
    let basis = config.call_basis()?;
    let Some(raw_abi) = config.abi.as_ref() else {
        if basis == CallBasis::Deploy && !config.args.is_empty() {
            return Err(EngineError::NotFound(
                "deployment arguments need an ABI with a constructor".into(),
            ));
        }
        return Ok(None);
    };

    match basis {
        CallBasis::RawData => Ok(None),
        CallBasis::Abi => {
            let abi = parse_abi(raw_abi)?;
            let function = resolve_callable(
                &abi,
                config.function_name.as_deref(),
                false,
                Some(config.args.len()),
            )?;
            Ok(Some(Callable { abi, function }))
        }
        CallBasis::Deploy => {
            let abi = parse_abi(raw_abi)?;
            if abi.constructor.is_none() && config.args.is_empty() {
                return Ok(None);
            }
            let function = resolve_callable(&abi, None, true, None)?;
            Ok(Some(Callable { abi, function }))
        }
    }
}

/// Routes concrete calls to the chain client
#[derive(Clone)]
pub struct ExecutionDispatcher {
    client: Arc<dyn ChainClient>,
    encoder: Arc<dyn CallEncoder>,
    wallet: Arc<dyn WalletSession>,
    network: NetworkCoordinator,
}

impl ExecutionDispatcher {
    pub fn new(
        client: Arc<dyn ChainClient>,
        encoder: Arc<dyn CallEncoder>,
        wallet: Arc<dyn WalletSession>,
        network: NetworkCoordinator,
    ) -> Self {
        Self {
            client,
            encoder,
            wallet,
            network,
        }
    }

    /// Slots that still need user input before the button can run
    ///
    /// Never fails on empty values; configuration errors (bad ABI, unknown
    /// function) are still reported.
    pub fn pending_inputs(&self, config: &ButtonConfig) -> EngineResult<Vec<InputSlot>> {
        let mut pending = Vec::new();
        if config.id == ChainField::Ask {
            pending.push(InputSlot::ChainId);
        }
        if config.address.trim() == ASK_PLACEHOLDER {
            pending.push(InputSlot::Address);
        }
        if let Some(callable) = callable_for(config)? {
            pending.extend(pending_inputs(&config.args, &callable.function.inputs));
        }
        Ok(pending)
    }

    /// Build and submit the call described by `config` with resolved arguments
    pub async fn execute(
        &self,
        config: &ButtonConfig,
        callable: Option<&Callable>,
        args: &[Value],
    ) -> EngineResult<Execution> {
        let basis = config.call_basis()?;
        let chain_id = config.chain_id()?;
        let to = config.target_address()?;

        let data = match basis {
            CallBasis::RawData => decode_data(config.raw_data().unwrap_or("0x"))?,
            CallBasis::Abi => {
                let callable = callable.ok_or_else(|| {
                    EngineError::NotFound("no function resolved for this button".into())
                })?;
                check_count(&callable.function, args)?;
                self.encoder.encode_call(&callable.function, args)?
            }
            CallBasis::Deploy => {
                let bytecode = config
                    .raw_data()
                    .ok_or(EngineError::DeploymentMissingBytecode)?;
                let constructor = callable.map(|callable| &callable.function);
                if let Some(constructor) = constructor {
                    check_count(constructor, args)?;
                }
                self.encoder
                    .encode_deploy(&decode_data(bytecode)?, constructor, args)?
            }
        };

        let hints = config.chain_context(self.network.registry())?;
        self.network.ensure_chain(chain_id, Some(&hints)).await?;

        if config.read_only {
            let to = to.ok_or_else(|| {
                EngineError::invalid("address", "a read-only call needs a contract address")
            })?;
            return match (basis, callable) {
                (CallBasis::Abi, Some(callable)) => {
                    debug!(function = %callable.function.signature(), to = %to, chain_id, "reading");
                    let value = self
                        .client
                        .read_contract(ReadCall {
                            address: to,
                            abi: callable.abi.clone(),
                            function: callable.function.clone(),
                            args: args.to_vec(),
                            chain_id,
                        })
                        .await
                        .map_err(EngineError::transport)?;
                    Ok(Execution::Read(value))
                }
                _ => {
                    debug!(to = %to, chain_id, "raw call");
                    let output = self
                        .client
                        .call(&to, data, chain_id)
                        .await
                        .map_err(EngineError::transport)?;
                    Ok(Execution::Read(Value::String(format!(
                        "0x{}",
                        hex::encode(&output)
                    ))))
                }
            };
        }

        let request = TxRequest {
            to,
            from: Some(self.wallet.account().ok_or(EngineError::NotConnected)?),
            value: parse_value(&config.value)?,
            data,
            gas: parse_gas(&config.gas)?,
            chain_id,
        };
        let handle = self
            .client
            .send_transaction(request)
            .await
            .map_err(|err| match err {
                WalletError::UserRejected => EngineError::UserRejected,
                other => EngineError::transport(other),
            })?;
        info!(hash = %handle.hash, chain_id, "transaction submitted");
        Ok(Execution::Sent(handle))
    }
}

#[async_trait::async_trait]
impl ReadPath for ExecutionDispatcher {
    async fn read(&self, call: ReadCall) -> EngineResult<Value> {
        self.network.ensure_chain(call.chain_id, None).await?;
        self.client
            .read_contract(call)
            .await
            .map_err(EngineError::transport)
    }
}

fn check_count(function: &ResolvedFunction, args: &[Value]) -> EngineResult<()> {
    if args.len() != function.inputs.len() {
        return Err(EngineError::ArgumentCountMismatch {
            expected: function.inputs.len(),
            actual: args.len(),
        });
    }
    Ok(())
}

fn decode_data(text: &str) -> EngineResult<Bytes> {
    let payload = text
        .trim()
        .strip_prefix("0x")
        .or_else(|| text.trim().strip_prefix("0X"))
        .unwrap_or(text.trim());
    hex::decode(payload)
        .map(Bytes::from)
        .map_err(|err| EngineError::invalid("data", format!("invalid hex: {err}")))
}

/// Transaction value in wei; empty means zero
pub fn parse_value(text: &str) -> EngineResult<U256> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(U256::ZERO);
    }
    parse_uint(text).map_err(|reason| EngineError::invalid("value", reason))
}

/// Gas limit; empty leaves estimation to the client
pub fn parse_gas(text: &str) -> EngineResult<Option<u64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let gas = parse_uint(text).map_err(|reason| EngineError::invalid("gas", reason))?;
    u64::try_from(gas)
        .map(Some)
        .map_err(|_| EngineError::invalid("gas", format!("{gas} is too large")))
}
