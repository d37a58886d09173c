//! ABI infrastructure - Alloy-based encoding and decoding

mod codec;

pub use codec::{to_sol_type, AlloyCodec};
