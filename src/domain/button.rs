//! Button configuration model
//!
//! A button is a user-authored, JSON-described template for one contract
//! interaction. Placeholder tokens and embedded reads are resolved at call time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::chain::{ChainContext, ChainRegistry, NativeCurrency};
use crate::domain::error::{EngineError, EngineResult};

/// Placeholder meaning "ask the user at invocation time"
pub const ASK_PLACEHOLDER: &str = "{ask}";

/// Placeholder meaning "use the connected wallet address"
pub const ADDRESS_PLACEHOLDER: &str = "{address}";

/// Key marking an argument slot as an embedded read directive
pub const READ_DIRECTIVE_KEY: &str = "$read";

/// Target chain of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ChainField {
    Id(u64),
    Ask,
}

impl TryFrom<Value> for ChainField {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(number) => number
                .as_u64()
                .map(ChainField::Id)
                .ok_or_else(|| format!("invalid chain id {number}")),
            Value::String(text) => {
                let text = text.trim();
                if text == ASK_PLACEHOLDER {
                    return Ok(ChainField::Ask);
                }
                parse_chain_id(text)
                    .map(ChainField::Id)
                    .ok_or_else(|| format!("invalid chain id '{text}'"))
            }
            other => Err(format!("invalid chain id {other}")),
        }
    }
}

impl From<ChainField> for Value {
    fn from(field: ChainField) -> Self {
        match field {
            ChainField::Id(id) => Value::from(id),
            ChainField::Ask => Value::from(ASK_PLACEHOLDER),
        }
    }
}

fn parse_chain_id(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// How the call payload is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallBasis {
    /// `data` is sent verbatim
    RawData,
    /// Calldata is ABI-encoded from `functionName` and `args`
    Abi,
    /// Contract creation from `data` bytecode plus encoded constructor args
    Deploy,
}

impl fmt::Display for CallBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallBasis::RawData => write!(f, "raw data"),
            CallBasis::Abi => write!(f, "abi"),
            CallBasis::Deploy => write!(f, "deploy"),
        }
    }
}

/// A named action button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonConfig {
    #[serde(default)]
    pub name: String,

    pub id: ChainField,

    /// Contract address; empty means deployment
    #[serde(default)]
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,

    #[serde(default)]
    pub args: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,

    #[serde(default, deserialize_with = "string_or_number")]
    pub gas: String,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_currency: Option<NativeCurrency>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rpc_urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
}

impl ButtonConfig {
    pub fn new(name: impl Into<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            id: ChainField::Id(chain_id),
            address: String::new(),
            abi: None,
            function_name: None,
            args: Vec::new(),
            data: None,
            value: String::new(),
            gas: String::new(),
            read_only: false,
            chain_name: None,
            native_currency: None,
            rpc_urls: Vec::new(),
            block_explorer_urls: Vec::new(),
        }
    }

    /// Target chain id, failing if it is still the ask placeholder
    pub fn chain_id(&self) -> EngineResult<u64> {
        match self.id {
            ChainField::Id(id) => Ok(id),
            ChainField::Ask => Err(EngineError::MissingArgument("id".into())),
        }
    }

    /// Empty address means the button deploys a contract
    pub fn is_deployment(&self) -> bool {
        self.address.trim().is_empty()
    }

    /// Target contract address, `None` for deployments
    pub fn target_address(&self) -> EngineResult<Option<String>> {
        let address = self.address.trim();
        if address.is_empty() {
            return Ok(None);
        }
        if address == ASK_PLACEHOLDER {
            return Err(EngineError::MissingArgument("address".into()));
        }
        Ok(Some(address.to_string()))
    }

    /// Raw call data or bytecode, if any
    pub fn raw_data(&self) -> Option<&str> {
        self.data
            .as_deref()
            .map(str::trim)
            .filter(|data| !data.is_empty() && *data != "0x")
    }

    pub fn call_basis(&self) -> EngineResult<CallBasis> {
        if self.is_deployment() {
            if self.raw_data().is_none() {
                return Err(EngineError::DeploymentMissingBytecode);
            }
            return Ok(CallBasis::Deploy);
        }
        if self.raw_data().is_some() {
            return Ok(CallBasis::RawData);
        }
        if self.abi.is_some() {
            return Ok(CallBasis::Abi);
        }
        // No abi and no data is only a plain value transfer
        if !self.args.is_empty() {
            return Err(EngineError::ArgumentCountMismatch {
                expected: 0,
                actual: self.args.len(),
            });
        }
        Ok(CallBasis::RawData)
    }

    /// Chain parameters for switching/registration, completed from the registry
    pub fn chain_context(&self, registry: &ChainRegistry) -> EngineResult<ChainContext> {
        let chain_id = self.chain_id()?;
        let context = ChainContext {
            chain_id,
            chain_name: self.chain_name.clone().filter(|name| !name.trim().is_empty()),
            native_currency: self.native_currency.clone(),
            rpc_urls: self.rpc_urls.clone(),
            block_explorer_urls: self.block_explorer_urls.clone(),
        };
        Ok(match registry.get(chain_id) {
            Some(known) => context.or_from(known),
            None => context,
        })
    }

    /// Apply values the user supplied for placeholders and empty slots
    ///
    /// Supplied values replace the slot wholesale; tuples are never merged.
    pub fn apply_inputs(&self, inputs: &UserInputs) -> ButtonConfig {
        let mut config = self.clone();
        if let Some(chain_id) = inputs.chain_id {
            config.id = ChainField::Id(chain_id);
        }
        if let Some(address) = &inputs.address {
            config.address = address.trim().to_string();
        }
        for (&index, value) in &inputs.args {
            if index >= config.args.len() {
                config.args.resize(index + 1, Value::String(String::new()));
            }
            config.args[index] = value.clone();
        }
        config
    }

    /// Copy of this button with argument values persisted after a successful fill
    pub fn with_filled_args(&self, args: Vec<Value>) -> ButtonConfig {
        ButtonConfig {
            args,
            ..self.clone()
        }
    }
}

/// Values collected from the user for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInputs {
    pub chain_id: Option<u64>,
    pub address: Option<String>,
    pub args: BTreeMap<usize, Value>,
}

impl UserInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, index: usize, value: impl Into<Value>) -> Self {
        self.args.insert(index, value.into());
        self
    }
}

/// A nested read whose single output becomes an argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedRead {
    /// Defaults to the parent button's address
    #[serde(default)]
    pub address: Option<String>,

    /// Defaults to the parent button's chain
    #[serde(default)]
    pub chain_id: Option<u64>,

    pub abi: Value,

    #[serde(default)]
    pub function_name: Option<String>,

    #[serde(default)]
    pub args: Vec<Value>,
}

impl EmbeddedRead {
    /// Recognize a `{"$read": {...}}` slot
    ///
    /// Returns `None` for ordinary values.
    pub fn from_slot(value: &Value) -> Option<EngineResult<EmbeddedRead>> {
        let directive = value.as_object()?.get(READ_DIRECTIVE_KEY)?;
        Some(
            serde_json::from_value(directive.clone())
                .map_err(|err| EngineError::MalformedAbi(format!("invalid read directive: {err}"))),
        )
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a numeric string, got {other}"
        ))),
    }
}
