//! Engine facade - runs a button from stored config to a read result or pending tx

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::core::dispatch::{callable_for, Callable, Execution, ExecutionDispatcher};
use crate::core::network::NetworkCoordinator;
use crate::core::resolver::{ArgumentResolver, InputSlot};
use crate::domain::abi::ResolvedFunction;
use crate::domain::button::{ButtonConfig, CallBasis, UserInputs};
use crate::domain::chain::ChainRegistry;
use crate::domain::error::EngineResult;
use crate::domain::ports::{CallEncoder, ChainClient, WalletSession};
use crate::infrastructure::abi::AlloyCodec;

/// What a button would do, without touching the chain
#[derive(Debug, Clone)]
pub struct Inspection {
    pub basis: CallBasis,
    pub function: Option<ResolvedFunction>,
    pub pending: Vec<InputSlot>,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Button with the user's inputs applied, suitable for persisting
    pub config: ButtonConfig,
    pub function: Option<ResolvedFunction>,
    /// Concrete arguments that were encoded
    pub args: Vec<Value>,
    pub execution: Execution,
}

pub struct Engine {
    wallet: Arc<dyn WalletSession>,
    dispatcher: ExecutionDispatcher,
}

impl Engine {
    pub fn new(
        client: Arc<dyn ChainClient>,
        wallet: Arc<dyn WalletSession>,
        registry: ChainRegistry,
    ) -> Self {
        Self::with_encoder(client, wallet, Arc::new(AlloyCodec::new()), registry)
    }

    pub fn with_encoder(
        client: Arc<dyn ChainClient>,
        wallet: Arc<dyn WalletSession>,
        encoder: Arc<dyn CallEncoder>,
        registry: ChainRegistry,
    ) -> Self {
        let network = NetworkCoordinator::new(wallet.clone(), Arc::new(registry));
        let dispatcher = ExecutionDispatcher::new(client, encoder, wallet.clone(), network);
        Self { wallet, dispatcher }
    }

    /// Classify a button and list what it still needs from the user
    pub fn inspect(&self, config: &ButtonConfig) -> EngineResult<Inspection> {
        let basis = config.call_basis()?;
        let function = callable_for(config)?.map(|callable| callable.function);
        let pending = self.dispatcher.pending_inputs(config)?;
        Ok(Inspection {
            basis,
            function,
            pending,
        })
    }

    /// Apply `inputs`, resolve every argument and dispatch the call
    ///
    /// Argument resolution finishes before the call is built, so a missing
    /// or invalid argument never reaches the wallet.
    pub async fn run(&self, config: &ButtonConfig, inputs: &UserInputs) -> EngineResult<Invocation> {
        let config = config.apply_inputs(inputs);
        let basis = config.call_basis()?;
        let callable = callable_for(&config)?;
        let chain_id = config.chain_id()?;
        let target = config.target_address()?;

        debug!(button = %config.name, %basis, chain_id, "running button");
        let args = match &callable {
            Some(callable) => self.resolve(&config, callable, chain_id, target.as_deref()).await?,
            None => Vec::new(),
        };

        let execution = self
            .dispatcher
            .execute(&config, callable.as_ref(), &args)
            .await?;
        info!(button = %config.name, "button finished");

        Ok(Invocation {
            function: callable.map(|callable| callable.function),
            config,
            args,
            execution,
        })
    }

    async fn resolve(
        &self,
        config: &ButtonConfig,
        callable: &Callable,
        chain_id: u64,
        target: Option<&str>,
    ) -> EngineResult<Vec<Value>> {
        let account = self.wallet.account();
        let resolver = ArgumentResolver::new(account.as_deref(), chain_id, target, &self.dispatcher);
        resolver
            .resolve_args(&config.args, &callable.function.inputs)
            .await
    }
}
