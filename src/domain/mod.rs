//! Domain layer - button model, ABI types, errors and collaborator contracts

pub mod abi;
pub mod button;
pub mod chain;
pub mod error;
pub mod number;
pub mod ports;

pub use button::{
    ButtonConfig, CallBasis, ChainField, EmbeddedRead, UserInputs, ADDRESS_PLACEHOLDER,
    ASK_PLACEHOLDER, READ_DIRECTIVE_KEY,
};
pub use chain::{ChainContext, ChainRegistry, NativeCurrency};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use ports::{CallEncoder, ChainClient, ReadCall, TxHandle, TxRequest, WalletError, WalletSession};
