pub mod dispatch;
pub mod engine;
pub mod introspect;
pub mod network;
pub mod resolver;

pub use dispatch::{callable_for, Callable, Execution, ExecutionDispatcher};
pub use engine::{Engine, Inspection, Invocation};
pub use introspect::{parse_abi, resolve_callable};
pub use network::{ChainSwitch, NetworkCoordinator};
pub use resolver::{ArgumentResolver, InputSlot, ReadPath};
