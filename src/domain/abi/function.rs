//! Resolved function/constructor descriptors

use alloy_json_abi::{Constructor, Function, Param as AbiParam, StateMutability};
use alloy_primitives::keccak256;

use super::ParamType;
use crate::domain::error::EngineResult;

/// A named, typed parameter of a resolved callable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    pub ty: ParamType,
}

impl ParamSpec {
    fn from_abi(param: &AbiParam) -> EngineResult<Self> {
        Ok(Self {
            name: param.name.clone(),
            ty: ParamType::from_abi(param)?,
        })
    }

    /// Name used in error messages, falling back to the position
    pub fn display_name(&self, index: usize) -> String {
        if self.name.trim().is_empty() {
            format!("#{index}")
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Constructor,
}

/// The ABI entry chosen for a button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFunction {
    pub kind: CallableKind,
    /// Function name (empty for constructors)
    pub name: String,
    pub inputs: Vec<ParamSpec>,
    pub outputs: Vec<ParamSpec>,
    pub state_mutability: StateMutability,
}

impl ResolvedFunction {
    pub fn from_function(function: &Function) -> EngineResult<Self> {
        Ok(Self {
            kind: CallableKind::Function,
            name: function.name.clone(),
            inputs: convert_params(&function.inputs)?,
            outputs: convert_params(&function.outputs)?,
            state_mutability: function.state_mutability,
        })
    }

    pub fn from_constructor(constructor: &Constructor) -> EngineResult<Self> {
        Ok(Self {
            kind: CallableKind::Constructor,
            name: String::new(),
            inputs: convert_params(&constructor.inputs)?,
            outputs: Vec::new(),
            state_mutability: constructor.state_mutability,
        })
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == CallableKind::Constructor
    }

    /// Whether the ABI declares the function as non-state-changing
    pub fn is_view(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }

    /// Full signature string (e.g., "transfer(address,uint256)")
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(|param| param.ty.to_string()).collect();
        let name = if self.is_constructor() {
            "constructor"
        } else {
            self.name.as_str()
        };
        format!("{}({})", name, types.join(","))
    }

    /// 4-byte function selector
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }
}

fn convert_params(params: &[AbiParam]) -> EngineResult<Vec<ParamSpec>> {
    params.iter().map(ParamSpec::from_abi).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_selector() {
        let function: Function = serde_json::from_value(serde_json::json!({
            "type": "function",
            "name": "transfer",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        }))
        .unwrap();

        let resolved = ResolvedFunction::from_function(&function).unwrap();
        assert_eq!(resolved.signature(), "transfer(address,uint256)");
        assert_eq!(resolved.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(resolved.selector_hex(), "0xa9059cbb");
        assert!(!resolved.is_view());
    }

    #[test]
    fn test_display_name_falls_back_to_index() {
        let spec = ParamSpec {
            name: String::new(),
            ty: ParamType::Bool,
        };
        assert_eq!(spec.display_name(2), "#2");
    }
}
