//! ABI introspection - picks the function or constructor a button invokes

use alloy_json_abi::{Function, JsonAbi};
use serde_json::Value;

use crate::domain::abi::ResolvedFunction;
use crate::domain::error::{EngineError, EngineResult};

/// Parse raw ABI JSON (an array, or an artifact object with an `abi` field)
pub fn parse_abi(raw: &Value) -> EngineResult<JsonAbi> {
    let abi_value = match raw {
        Value::Object(map) if map.contains_key("abi") => &map["abi"],
        Value::String(text) => {
            let parsed: Value = serde_json::from_str(text)
                .map_err(|err| EngineError::MalformedAbi(err.to_string()))?;
            return parse_abi(&parsed);
        }
        other => other,
    };
    serde_json::from_value(abi_value.clone()).map_err(|err| EngineError::MalformedAbi(err.to_string()))
}

/// Resolve the callable a button targets
///
/// `arity` is the number of argument templates, used only to pick between
/// overloads sharing `function_name`.
pub fn resolve_callable(
    abi: &JsonAbi,
    function_name: Option<&str>,
    is_constructor: bool,
    arity: Option<usize>,
) -> EngineResult<ResolvedFunction> {
    if is_constructor {
        let constructor = abi
            .constructor
            .as_ref()
            .ok_or_else(|| EngineError::NotFound("ABI has no constructor".into()))?;
        return ResolvedFunction::from_constructor(constructor);
    }

    let name = function_name.map(str::trim).filter(|name| !name.is_empty());
    let Some(name) = name else {
        let functions: Vec<&Function> = abi.functions().collect();
        return match functions.as_slice() {
            [only] => ResolvedFunction::from_function(only),
            [] => Err(EngineError::Ambiguous(
                "ABI has no functions; set functionName".into(),
            )),
            many => Err(EngineError::Ambiguous(format!(
                "ABI has {} functions; set functionName",
                many.len()
            ))),
        };
    };

    let overloads = abi
        .function(name)
        .filter(|overloads| !overloads.is_empty())
        .ok_or_else(|| EngineError::NotFound(format!("function '{name}' not found in ABI")))?;

    if let [only] = overloads.as_slice() {
        return ResolvedFunction::from_function(only);
    }

    let matching: Vec<&Function> = overloads
        .iter()
        .filter(|function| arity == Some(function.inputs.len()))
        .collect();
    match matching.as_slice() {
        [only] => ResolvedFunction::from_function(only),
        _ => Err(EngineError::Ambiguous(format!(
            "function '{name}' is overloaded {} times",
            overloads.len()
        ))),
    }
}
