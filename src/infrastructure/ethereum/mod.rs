//! Ethereum infrastructure - Alloy provider implementations

mod gateway;
mod provider;

pub use gateway::AlloyGateway;
pub use provider::{create_provider, ProviderConfig};
