//! ABI domain models
//!
//! Parameter types are decoded once from raw ABI JSON into a closed
//! variant; resolved callables carry those types to the resolver and codec.

mod function;
mod param;

pub use function::{CallableKind, ParamSpec, ResolvedFunction};
pub use param::{ParamType, TupleField};
