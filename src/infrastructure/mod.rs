//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based provider, wallet session and chain client
//! - ABI encoding and decoding using alloy-dyn-abi

pub mod abi;
pub mod ethereum;

pub use abi::AlloyCodec;
pub use ethereum::{AlloyGateway, ProviderConfig};
