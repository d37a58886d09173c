//! Network coordination - keeps the wallet on the chain a call targets

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::chain::{ChainContext, ChainRegistry};
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::ports::{WalletError, WalletSession};

/// How the target chain became active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainSwitch {
    /// Already on the target chain, nothing was requested
    AlreadyActive,
    /// The wallet switched to a chain it knew
    Switched,
    /// The chain was registered and then switched to
    Registered,
}

/// Ensures the wallet's active chain matches a call's target
#[derive(Clone)]
pub struct NetworkCoordinator {
    wallet: Arc<dyn WalletSession>,
    registry: Arc<ChainRegistry>,
}

impl NetworkCoordinator {
    pub fn new(wallet: Arc<dyn WalletSession>, registry: Arc<ChainRegistry>) -> Self {
        Self { wallet, registry }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Switch (or register, then switch) to `target`
    ///
    /// `hints` are the button's own registration fields; missing fields are
    /// taken from the registry. At most one registration and one retried
    /// switch are attempted.
    pub async fn ensure_chain(
        &self,
        target: u64,
        hints: Option<&ChainContext>,
    ) -> EngineResult<ChainSwitch> {
        let current = self.wallet.chain_id().await.map_err(wallet_error)?;
        if current == target {
            return Ok(ChainSwitch::AlreadyActive);
        }

        debug!(from = current, to = target, "switching chain");
        match self.wallet.switch_chain(target).await {
            Ok(()) => {
                info!(chain_id = target, "switched chain");
                return Ok(ChainSwitch::Switched);
            }
            Err(WalletError::UnrecognizedChain(_)) => {}
            Err(err) => return Err(wallet_error(err)),
        }

        let context = self.registration_context(target, hints);
        if !context.is_registrable() {
            warn!(chain_id = target, "chain unknown to wallet and not registrable");
            return Err(EngineError::ChainUnregistrable(target));
        }

        info!(chain_id = target, name = ?context.chain_name, "registering chain");
        self.wallet
            .add_chain(&context)
            .await
            .map_err(|err| match err {
                WalletError::UserRejected => EngineError::UserRejected,
                other => EngineError::RegistrationFailed {
                    chain_id: target,
                    reason: other.to_string(),
                },
            })?;

        // Single retry after registration, failures surface to the caller
        self.wallet
            .switch_chain(target)
            .await
            .map_err(|err| match err {
                WalletError::UnrecognizedChain(_) => EngineError::RegistrationFailed {
                    chain_id: target,
                    reason: "wallet still does not recognize the chain".into(),
                },
                other => wallet_error(other),
            })?;

        info!(chain_id = target, "switched chain after registration");
        Ok(ChainSwitch::Registered)
    }

    fn registration_context(&self, target: u64, hints: Option<&ChainContext>) -> ChainContext {
        let context = hints
            .filter(|hints| hints.chain_id == target)
            .cloned()
            .unwrap_or_else(|| ChainContext::new(target));
        match self.registry.get(target) {
            Some(known) => context.or_from(known),
            None => context,
        }
    }
}

fn wallet_error(err: WalletError) -> EngineError {
    match err {
        WalletError::UserRejected => EngineError::UserRejected,
        other => EngineError::transport(other),
    }
}
