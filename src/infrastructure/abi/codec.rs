//! ABI codec implementation using alloy-dyn-abi

use std::str::FromStr;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, Bytes, B256};
use serde_json::{Map, Value};

use crate::domain::abi::{ParamSpec, ParamType, ResolvedFunction};
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::number::{parse_int, parse_uint};
use crate::domain::ports::CallEncoder;

/// ABI codec backed by alloy-dyn-abi
#[derive(Debug, Clone, Copy, Default)]
pub struct AlloyCodec;

impl AlloyCodec {
    pub fn new() -> Self {
        Self
    }

    fn encode_params(params: &[ParamSpec], args: &[Value]) -> EngineResult<Vec<u8>> {
        if args.len() != params.len() {
            return Err(EngineError::ArgumentCountMismatch {
                expected: params.len(),
                actual: args.len(),
            });
        }
        if params.is_empty() {
            return Ok(Vec::new());
        }
        let values = params
            .iter()
            .zip(args)
            .enumerate()
            .map(|(index, (param, arg))| to_sol_value(&param.ty, arg, &param.display_name(index)))
            .collect::<EngineResult<Vec<_>>>()?;
        // Wrap values in a tuple for proper encoding
        Ok(DynSolValue::Tuple(values).abi_encode_params())
    }
}

impl CallEncoder for AlloyCodec {
    fn encode_call(&self, function: &ResolvedFunction, args: &[Value]) -> EngineResult<Bytes> {
        let mut calldata = function.selector().to_vec();
        calldata.extend_from_slice(&Self::encode_params(&function.inputs, args)?);
        Ok(Bytes::from(calldata))
    }

    fn encode_deploy(
        &self,
        bytecode: &[u8],
        constructor: Option<&ResolvedFunction>,
        args: &[Value],
    ) -> EngineResult<Bytes> {
        let mut data = bytecode.to_vec();
        match constructor {
            Some(constructor) => {
                data.extend_from_slice(&Self::encode_params(&constructor.inputs, args)?)
            }
            None if !args.is_empty() => {
                return Err(EngineError::ArgumentCountMismatch {
                    expected: 0,
                    actual: args.len(),
                })
            }
            None => {}
        }
        Ok(Bytes::from(data))
    }

    fn decode_output(&self, function: &ResolvedFunction, data: &[u8]) -> EngineResult<Value> {
        if function.outputs.is_empty() {
            return Ok(Value::Null);
        }
        let types: Vec<DynSolType> = function
            .outputs
            .iter()
            .map(|param| to_sol_type(&param.ty))
            .collect();
        let decoded = DynSolType::Tuple(types)
            .abi_decode_params(data)
            .map_err(|err| EngineError::transport(format!("failed to decode result: {err}")))?;

        // Extract individual values from the tuple
        let values = match decoded {
            DynSolValue::Tuple(values) => values,
            other => vec![other],
        };
        let mut outputs: Vec<Value> = function
            .outputs
            .iter()
            .zip(values.iter())
            .map(|(param, value)| to_json(&param.ty, value))
            .collect();

        if outputs.len() == 1 {
            return Ok(outputs.remove(0));
        }
        Ok(Value::Array(outputs))
    }
}

/// Map a tagged parameter type onto the alloy dynamic type
pub fn to_sol_type(ty: &ParamType) -> DynSolType {
    match ty {
        ParamType::Address => DynSolType::Address,
        ParamType::Bool => DynSolType::Bool,
        ParamType::Uint(bits) => DynSolType::Uint(*bits),
        ParamType::Int(bits) => DynSolType::Int(*bits),
        ParamType::String => DynSolType::String,
        ParamType::Bytes => DynSolType::Bytes,
        ParamType::FixedBytes(size) => DynSolType::FixedBytes(*size),
        ParamType::Array(inner) => DynSolType::Array(Box::new(to_sol_type(inner))),
        ParamType::FixedArray(inner, size) => {
            DynSolType::FixedArray(Box::new(to_sol_type(inner)), *size)
        }
        ParamType::Tuple(fields) => {
            DynSolType::Tuple(fields.iter().map(|field| to_sol_type(&field.ty)).collect())
        }
    }
}

/// Convert a resolved JSON argument into an alloy value of the given type
fn to_sol_value(ty: &ParamType, value: &Value, name: &str) -> EngineResult<DynSolValue> {
    let invalid = |reason: String| EngineError::invalid(name, reason);

    match ty {
        ParamType::Address => {
            let text = expect_str(value, name)?;
            let address = Address::from_str(text.trim())
                .map_err(|err| invalid(format!("invalid address '{text}': {err}")))?;
            Ok(DynSolValue::Address(address))
        }

        ParamType::Bool => match value {
            Value::Bool(flag) => Ok(DynSolValue::Bool(*flag)),
            Value::String(text) if text.trim().eq_ignore_ascii_case("true") => {
                Ok(DynSolValue::Bool(true))
            }
            Value::String(text) if text.trim().eq_ignore_ascii_case("false") => {
                Ok(DynSolValue::Bool(false))
            }
            other => Err(invalid(format!("expected true/false, got {other}"))),
        },

        ParamType::Uint(bits) => {
            let text = integer_text(value, name)?;
            let number = parse_uint(&text).map_err(invalid)?;
            Ok(DynSolValue::Uint(number, *bits))
        }

        ParamType::Int(bits) => {
            let text = integer_text(value, name)?;
            let number = parse_int(&text).map_err(invalid)?;
            Ok(DynSolValue::Int(number, *bits))
        }

        ParamType::String => Ok(DynSolValue::String(expect_str(value, name)?.to_string())),

        ParamType::Bytes => {
            let bytes = decode_hex(expect_str(value, name)?).map_err(invalid)?;
            Ok(DynSolValue::Bytes(bytes))
        }

        ParamType::FixedBytes(size) => {
            let bytes = decode_hex(expect_str(value, name)?).map_err(invalid)?;
            if bytes.len() != *size {
                return Err(invalid(format!(
                    "expected {} bytes, got {}",
                    size,
                    bytes.len()
                )));
            }
            let mut word = [0u8; 32];
            word[..*size].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(B256::from(word), *size))
        }

        ParamType::Array(inner) => {
            let items = expect_array(value, name)?;
            let values = items
                .iter()
                .map(|item| to_sol_value(inner, item, name))
                .collect::<EngineResult<Vec<_>>>()?;
            Ok(DynSolValue::Array(values))
        }

        ParamType::FixedArray(inner, size) => {
            let items = expect_array(value, name)?;
            if items.len() != *size {
                return Err(invalid(format!(
                    "expected {} elements, got {}",
                    size,
                    items.len()
                )));
            }
            let values = items
                .iter()
                .map(|item| to_sol_value(inner, item, name))
                .collect::<EngineResult<Vec<_>>>()?;
            Ok(DynSolValue::FixedArray(values))
        }

        ParamType::Tuple(fields) => {
            let values = match value {
                Value::Object(map) => fields
                    .iter()
                    .map(|field| {
                        let item = map
                            .get(&field.name)
                            .ok_or_else(|| EngineError::MissingArgument(field.name.clone()))?;
                        to_sol_value(&field.ty, item, &field.name)
                    })
                    .collect::<EngineResult<Vec<_>>>()?,
                Value::Array(items) if items.len() == fields.len() => fields
                    .iter()
                    .zip(items)
                    .map(|(field, item)| to_sol_value(&field.ty, item, &field.name))
                    .collect::<EngineResult<Vec<_>>>()?,
                other => return Err(invalid(format!("expected a tuple object, got {other}"))),
            };
            Ok(DynSolValue::Tuple(values))
        }
    }
}

/// Convert a decoded alloy value into JSON
///
/// Integers become decimal strings so 64+-bit values survive serialization.
fn to_json(ty: &ParamType, value: &DynSolValue) -> Value {
    match (ty, value) {
        (ParamType::Tuple(fields), DynSolValue::Tuple(items)) => {
            let all_named = fields.iter().all(|field| !field.name.is_empty());
            if all_named {
                let mut map = Map::new();
                for (field, item) in fields.iter().zip(items) {
                    map.insert(field.name.clone(), to_json(&field.ty, item));
                }
                Value::Object(map)
            } else {
                Value::Array(
                    fields
                        .iter()
                        .zip(items)
                        .map(|(field, item)| to_json(&field.ty, item))
                        .collect(),
                )
            }
        }
        (ParamType::Array(inner), DynSolValue::Array(items))
        | (ParamType::FixedArray(inner, _), DynSolValue::FixedArray(items)) => {
            Value::Array(items.iter().map(|item| to_json(inner, item)).collect())
        }
        (_, other) => scalar_json(other),
    }
}

fn scalar_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(flag) => Value::Bool(*flag),
        DynSolValue::Int(number, _) => Value::String(number.to_string()),
        DynSolValue::Uint(number, _) => Value::String(number.to_string()),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            Value::String(format!("0x{}", hex::encode(bytes)))
        }
        DynSolValue::Address(address) => Value::String(address.to_checksum(None)),
        DynSolValue::Function(func) => Value::String(format!("0x{}", hex::encode(func.as_slice()))),
        DynSolValue::Bytes(bytes) => Value::String(format!("0x{}", hex::encode(bytes))),
        DynSolValue::String(text) => Value::String(text.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(scalar_json).collect())
        }
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

fn expect_str<'a>(value: &'a Value, name: &str) -> EngineResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| EngineError::invalid(name, format!("expected a string, got {value}")))
}

fn expect_array<'a>(value: &'a Value, name: &str) -> EngineResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| EngineError::invalid(name, format!("expected an array, got {value}")))
}

fn integer_text(value: &Value, name: &str) -> EngineResult<String> {
    match value {
        Value::String(text) => Ok(text.trim().to_string()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(EngineError::invalid(
            name,
            format!("expected an integer, got {other}"),
        )),
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>, String> {
    let text = text.trim();
    let payload = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(payload).map_err(|err| format!("invalid hex: {err}"))
}
