//! Argument resolution
//!
//! Walks the argument templates of a button against the typed parameter list,
//! depth-first and left to right:
//!
//! - `{"$read": {...}}` slots are replaced by the single output of a nested read
//! - the connected-address placeholder is replaced at any nesting depth
//! - every value is coerced by its declared [`ParamType`]
//!
//! The output is a list of JSON values the codec can encode directly. Integers
//! are emitted as canonical decimal strings.

use alloy_primitives::U256;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::introspect::{parse_abi, resolve_callable};
use crate::domain::abi::{ParamSpec, ParamType, ResolvedFunction};
use crate::domain::button::{EmbeddedRead, ADDRESS_PLACEHOLDER, ASK_PLACEHOLDER};
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::number::{parse_int, parse_uint};
use crate::domain::ports::ReadCall;

static NULL: Value = Value::Null;

/// Read path used to evaluate embedded reads
///
/// Implementations make sure the wallet is on `call.chain_id` before reading.
#[async_trait::async_trait]
pub trait ReadPath: Send + Sync {
    async fn read(&self, call: ReadCall) -> EngineResult<Value>;
}

/// A slot that still needs a value from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSlot {
    ChainId,
    Address,
    Arg {
        index: usize,
        name: String,
        ty: String,
    },
}

/// Resolves templates for one call
pub struct ArgumentResolver<'a> {
    account: Option<&'a str>,
    chain_id: u64,
    default_address: Option<&'a str>,
    reader: &'a dyn ReadPath,
}

impl<'a> ArgumentResolver<'a> {
    /// `default_address` is used by embedded reads that omit their own address
    pub fn new(
        account: Option<&'a str>,
        chain_id: u64,
        default_address: Option<&'a str>,
        reader: &'a dyn ReadPath,
    ) -> Self {
        Self {
            account,
            chain_id,
            default_address,
            reader,
        }
    }

    /// Resolve every template against its parameter
    pub async fn resolve_args(
        &self,
        templates: &[Value],
        params: &[ParamSpec],
    ) -> EngineResult<Vec<Value>> {
        if templates.len() != params.len() {
            return Err(EngineError::ArgumentCountMismatch {
                expected: params.len(),
                actual: templates.len(),
            });
        }

        let mut resolved = Vec::with_capacity(params.len());
        // Sequential on purpose: nested reads may switch chains
        for (index, (template, param)) in templates.iter().zip(params).enumerate() {
            let name = param.display_name(index);
            resolved.push(self.resolve_value(&param.ty, template, &name).await?);
        }
        Ok(resolved)
    }

    fn resolve_value<'b>(
        &'b self,
        ty: &'b ParamType,
        value: &'b Value,
        name: &'b str,
    ) -> BoxFuture<'b, EngineResult<Value>> {
        async move {
            if let Some(read) = EmbeddedRead::from_slot(value) {
                let fetched = self.embedded_read(&read?).await?;
                return self.resolve_value(ty, &fetched, name).await;
            }

            if value.as_str().map(str::trim) == Some(ADDRESS_PLACEHOLDER) {
                let account = self.account.ok_or(EngineError::NotConnected)?;
                return coerce_scalar(ty, &Value::String(account.to_string()), name);
            }

            if is_blank(value) {
                return Err(EngineError::MissingArgument(name.to_string()));
            }

            match ty {
                ParamType::Tuple(fields) => {
                    let parsed = parse_json_text(value, name)?;
                    let object = parsed.as_object().ok_or_else(|| {
                        EngineError::invalid(name, format!("expected an object, got {parsed}"))
                    })?;

                    // Built in full before returning; a missing field fails the whole tuple
                    let mut resolved = Map::new();
                    for field in fields {
                        if field.name.trim().is_empty() {
                            return Err(EngineError::MalformedAbi(format!(
                                "tuple '{name}' has an unnamed component"
                            )));
                        }
                        let item = object.get(&field.name).unwrap_or(&NULL);
                        let item = self.resolve_value(&field.ty, item, &field.name).await?;
                        resolved.insert(field.name.clone(), item);
                    }
                    Ok(Value::Object(resolved))
                }

                ParamType::Array(inner) | ParamType::FixedArray(inner, _) => {
                    let parsed = parse_json_text(value, name)?;
                    let items = parsed.as_array().ok_or_else(|| {
                        EngineError::invalid(name, format!("expected an array, got {parsed}"))
                    })?;
                    if let ParamType::FixedArray(_, size) = ty {
                        if items.len() != *size {
                            return Err(EngineError::invalid(
                                name,
                                format!("expected {} elements, got {}", size, items.len()),
                            ));
                        }
                    }

                    let mut resolved = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        let item_name = format!("{name}[{index}]");
                        resolved.push(self.resolve_value(inner, item, &item_name).await?);
                    }
                    Ok(Value::Array(resolved))
                }

                _ => coerce_scalar(ty, value, name),
            }
        }
        .boxed()
    }

    async fn embedded_read(&self, read: &EmbeddedRead) -> EngineResult<Value> {
        let abi = parse_abi(&read.abi)?;
        let function = resolve_callable(
            &abi,
            read.function_name.as_deref(),
            false,
            Some(read.args.len()),
        )?;
        if function.outputs.len() != 1 {
            return Err(EngineError::AmbiguousReadResult(function.name.clone()));
        }

        let chain_id = read.chain_id.unwrap_or(self.chain_id);
        let address = match read.address.as_deref().map(str::trim) {
            Some(ADDRESS_PLACEHOLDER) => self.account.ok_or(EngineError::NotConnected)?.to_string(),
            // Nothing asks the user inside a directive
            Some(ASK_PLACEHOLDER) => {
                return Err(EngineError::MissingArgument(format!("{}.address", function.name)));
            }
            Some(address) if !address.is_empty() => address.to_string(),
            _ => self
                .default_address
                .map(str::to_string)
                .ok_or_else(|| EngineError::MissingArgument(format!("{}.address", function.name)))?,
        };

        let nested = ArgumentResolver::new(self.account, chain_id, Some(&address), self.reader);
        let args = nested.resolve_args(&read.args, &function.inputs).await?;

        debug!(
            function = %function.signature(),
            address = %address,
            chain_id,
            "resolving embedded read"
        );
        let result = self
            .reader
            .read(ReadCall {
                address: address.clone(),
                abi,
                function: function.clone(),
                args,
                chain_id,
            })
            .await?;

        extract_single(&function, result)
    }
}

/// Unwrap the single declared output from a read result
///
/// Accepts the bare value, a one-element array, or an object keyed by the
/// output name (or with exactly one key). For array outputs the result is
/// unwrapped only when it is one element nested exactly as deep as the output type.
pub fn extract_single(function: &ResolvedFunction, result: Value) -> EngineResult<Value> {
    let ambiguous = || EngineError::AmbiguousReadResult(function.name.clone());
    let [output] = function.outputs.as_slice() else {
        return Err(ambiguous());
    };

    match result {
        Value::Array(mut items) => {
            let depth = array_depth(&output.ty);
            if depth > 0 {
                // Only a single wrapper with the declared nesting is unwrapped
                if items.len() == 1 && value_depth(&items[0]) == depth {
                    return Ok(items.remove(0));
                }
                return Ok(Value::Array(items));
            }
            if items.len() == 1 {
                return Ok(items.remove(0));
            }
            Err(ambiguous())
        }
        Value::Object(mut map) => {
            if !output.name.is_empty() {
                if let Some(value) = map.remove(&output.name) {
                    return Ok(value);
                }
            }
            if map.len() == 1 {
                if let Some((_, value)) = map.into_iter().next() {
                    return Ok(value);
                }
            }
            Err(ambiguous())
        }
        scalar => Ok(scalar),
    }
}

fn array_depth(ty: &ParamType) -> usize {
    match ty {
        ParamType::Array(inner) | ParamType::FixedArray(inner, _) => 1 + array_depth(inner),
        _ => 0,
    }
}

/// Nesting of a JSON value, following first elements
fn value_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.first().map_or(0, value_depth),
        _ => 0,
    }
}

/// Slots that still need user input, without failing
///
/// Tuple parameters are always reported: a tuple is filled atomically by the user.
pub fn pending_inputs(templates: &[Value], params: &[ParamSpec]) -> Vec<InputSlot> {
    params
        .iter()
        .enumerate()
        .filter(|(index, param)| {
            if param.ty.is_tuple() {
                return true;
            }
            let template = templates.get(*index).unwrap_or(&NULL);
            if EmbeddedRead::from_slot(template).is_some() {
                return false;
            }
            if template.as_str().map(str::trim) == Some(ADDRESS_PLACEHOLDER) {
                return false;
            }
            is_blank(template)
        })
        .map(|(index, param)| InputSlot::Arg {
            index,
            name: param.display_name(index),
            ty: param.ty.to_string(),
        })
        .collect()
}

/// Null, blank after trimming, or the ask placeholder
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => {
            let text = text.trim();
            text.is_empty() || text == ASK_PLACEHOLDER
        }
        _ => false,
    }
}

/// Arrays and tuples may arrive as JSON text from form inputs
fn parse_json_text(value: &Value, name: &str) -> EngineResult<Value> {
    match value {
        Value::String(text) => serde_json::from_str(text.trim())
            .map_err(|err| EngineError::invalid(name, format!("invalid JSON: {err}"))),
        other => Ok(other.clone()),
    }
}

fn coerce_scalar(ty: &ParamType, value: &Value, name: &str) -> EngineResult<Value> {
    if is_blank(value) {
        return Err(EngineError::MissingArgument(name.to_string()));
    }

    match ty {
        ParamType::Uint(bits) => {
            let number = parse_uint(&integer_text(value, name)?)
                .map_err(|reason| EngineError::invalid(name, reason))?;
            if number.bit_len() > *bits {
                return Err(EngineError::invalid(
                    name,
                    format!("{number} does not fit in uint{bits}"),
                ));
            }
            Ok(Value::String(number.to_string()))
        }

        ParamType::Int(bits) => {
            let number = parse_int(&integer_text(value, name)?)
                .map_err(|reason| EngineError::invalid(name, reason))?;
            let magnitude = number.unsigned_abs();
            let limit = U256::from(1u8) << (*bits - 1);
            let fits = if number.is_negative() {
                magnitude <= limit
            } else {
                magnitude < limit
            };
            if !fits {
                return Err(EngineError::invalid(
                    name,
                    format!("{number} does not fit in int{bits}"),
                ));
            }
            Ok(Value::String(number.to_string()))
        }

        ParamType::Bool => match value {
            Value::Bool(flag) => Ok(Value::Bool(*flag)),
            Value::String(text) if text.trim().eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(text) if text.trim().eq_ignore_ascii_case("false") => {
                Ok(Value::Bool(false))
            }
            other => Err(EngineError::invalid(
                name,
                format!("expected true or false, got {other}"),
            )),
        },

        ParamType::Tuple(_) | ParamType::Array(_) | ParamType::FixedArray(..) => Err(
            EngineError::invalid(name, format!("expected {ty}, got {value}")),
        ),

        ParamType::Address | ParamType::String | ParamType::Bytes | ParamType::FixedBytes(_) => {
            match value {
                Value::String(text) => Ok(Value::String(text.trim().to_string())),
                Value::Number(number) => Ok(Value::String(number.to_string())),
                other => Err(EngineError::invalid(
                    name,
                    format!("expected a string, got {other}"),
                )),
            }
        }
    }
}

fn integer_text(value: &Value, name: &str) -> EngineResult<String> {
    match value {
        Value::String(text) => Ok(text.trim().to_string()),
        Value::Number(number) if number.is_i64() || number.is_u64() => Ok(number.to_string()),
        other => Err(EngineError::invalid(
            name,
            format!("expected an integer, got {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::TupleField;
    use crate::domain::error::ErrorKind;
    use serde_json::json;
    use std::sync::Mutex;

    const ACCOUNT: &str = "0x00000000000000000000000000000000000000c0";
    const TOKEN: &str = "0x00000000000000000000000000000000000000aa";

    /// Returns scripted results and records every call
    struct RecordingReader {
        results: Mutex<Vec<Value>>,
        calls: Mutex<Vec<ReadCall>>,
    }

    impl RecordingReader {
        fn new(results: Vec<Value>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ReadPath for RecordingReader {
        async fn read(&self, call: ReadCall) -> EngineResult<Value> {
            self.calls.lock().unwrap().push(call);
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                return Err(EngineError::transport("no scripted result"));
            }
            Ok(results.remove(0))
        }
    }

    fn spec(name: &str, ty: ParamType) -> ParamSpec {
        ParamSpec {
            name: name.to_string(),
            ty,
        }
    }

    fn field(name: &str, ty: ParamType) -> TupleField {
        TupleField {
            name: name.to_string(),
            ty,
        }
    }

    async fn resolve(templates: Vec<Value>, params: Vec<ParamSpec>) -> EngineResult<Vec<Value>> {
        let reader = RecordingReader::new(vec![]);
        ArgumentResolver::new(Some(ACCOUNT), 1, Some(TOKEN), &reader)
            .resolve_args(&templates, &params)
            .await
    }

    #[tokio::test]
    async fn test_integer_canonical_form() {
        let cases = [
            ("0", ParamType::Uint(256), "0"),
            ("000123", ParamType::Uint(256), "123"),
            ("+5", ParamType::Uint(8), "5"),
            ("0xff", ParamType::Uint(8), "255"),
            ("-0", ParamType::Int(64), "0"),
            ("-0042", ParamType::Int(64), "-42"),
            ("-9223372036854775808", ParamType::Int(64), "-9223372036854775808"),
            (
                "115792089237316195423570985008687907853269984665640564039457584007913129639935",
                ParamType::Uint(256),
                "115792089237316195423570985008687907853269984665640564039457584007913129639935",
            ),
        ];
        for (input, ty, expected) in cases {
            let resolved = resolve(vec![json!(input)], vec![spec("n", ty)]).await.unwrap();
            assert_eq!(resolved, vec![json!(expected)], "input {input}");
        }
    }

    #[tokio::test]
    async fn test_integer_out_of_range() {
        for (input, ty) in [
            ("256", ParamType::Uint(8)),
            ("-1", ParamType::Uint(256)),
            ("128", ParamType::Int(8)),
            ("-129", ParamType::Int(8)),
            ("12abc", ParamType::Uint(256)),
            ("1.5", ParamType::Int(256)),
        ] {
            let err = resolve(vec![json!(input)], vec![spec("n", ty)]).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "input {input}");
        }
    }

    #[tokio::test]
    async fn test_json_numbers_are_integers() {
        let resolved = resolve(vec![json!(42)], vec![spec("n", ParamType::Uint(64))])
            .await
            .unwrap();
        assert_eq!(resolved, vec![json!("42")]);
    }

    #[tokio::test]
    async fn test_booleans() {
        let params = vec![
            spec("a", ParamType::Bool),
            spec("b", ParamType::Bool),
            spec("c", ParamType::Bool),
        ];
        let resolved = resolve(vec![json!("TRUE"), json!(" false "), json!(true)], params.clone())
            .await
            .unwrap();
        assert_eq!(resolved, vec![json!(true), json!(false), json!(true)]);

        let err = resolve(vec![json!("yes"), json!(true), json!(true)], params)
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::invalid("a", "expected true or false, got \"yes\""));
    }

    #[tokio::test]
    async fn test_missing_argument_names_parameter() {
        let params = vec![
            spec("to", ParamType::Address),
            spec("amount", ParamType::Uint(256)),
        ];
        let err = resolve(vec![json!("0xBBB"), json!("  ")], params).await.unwrap_err();
        assert_eq!(err, EngineError::MissingArgument("amount".into()));

        let unnamed = vec![spec("", ParamType::String)];
        let err = resolve(vec![json!(ASK_PLACEHOLDER)], unnamed).await.unwrap_err();
        assert_eq!(err, EngineError::MissingArgument("#0".into()));
    }

    #[tokio::test]
    async fn test_first_failing_slot_is_reported() {
        let params = vec![spec("a", ParamType::Uint(8)), spec("b", ParamType::Uint(8))];
        let err = resolve(vec![json!(""), json!("x")], params).await.unwrap_err();
        assert_eq!(err, EngineError::MissingArgument("a".into()));
    }

    #[tokio::test]
    async fn test_count_mismatch() {
        let err = resolve(vec![json!("1")], vec![]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentCountMismatch);
    }

    #[tokio::test]
    async fn test_array_from_json_text() {
        let params = vec![spec("amounts", ParamType::Array(Box::new(ParamType::Uint(256))))];
        let resolved = resolve(vec![json!("[1, \"0x10\", \"007\"]")], params).await.unwrap();
        assert_eq!(resolved, vec![json!(["1", "16", "7"])]);
    }

    #[tokio::test]
    async fn test_array_rejects_non_array() {
        let params = vec![spec("amounts", ParamType::Array(Box::new(ParamType::Uint(256))))];
        let err = resolve(vec![json!("1,2")], params.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let fixed = vec![spec(
            "pair",
            ParamType::FixedArray(Box::new(ParamType::Uint(8)), 2),
        )];
        let err = resolve(vec![json!([1])], fixed).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_tuple_resolved_by_name() {
        let order = ParamType::Tuple(vec![
            field("maker", ParamType::Address),
            field("amount", ParamType::Uint(128)),
        ]);
        let resolved = resolve(
            vec![json!("{\"amount\": \"0010\", \"maker\": \"{address}\", \"extra\": 1}")],
            vec![spec("order", order)],
        )
        .await
        .unwrap();
        assert_eq!(resolved, vec![json!({"maker": ACCOUNT, "amount": "10"})]);
    }

    #[tokio::test]
    async fn test_tuple_missing_field_fails_whole_tuple() {
        let order = ParamType::Tuple(vec![
            field("maker", ParamType::Address),
            field("amount", ParamType::Uint(128)),
            field("deadline", ParamType::Uint(64)),
        ]);
        let err = resolve(
            vec![json!({"maker": TOKEN, "deadline": "1"})],
            vec![spec("order", order.clone())],
        )
        .await
        .unwrap_err();
        assert_eq!(err, EngineError::MissingArgument("amount".into()));

        let err = resolve(
            vec![json!({"maker": TOKEN, "amount": "", "deadline": "1"})],
            vec![spec("order", order)],
        )
        .await
        .unwrap_err();
        assert_eq!(err, EngineError::MissingArgument("amount".into()));
    }

    #[tokio::test]
    async fn test_unnamed_tuple_component_is_malformed() {
        let tuple = ParamType::Tuple(vec![field("", ParamType::Uint(8))]);
        let err = resolve(vec![json!({"": "1"})], vec![spec("t", tuple)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedAbi);
    }

    #[tokio::test]
    async fn test_address_placeholder_at_any_depth() {
        let ty = ParamType::Array(Box::new(ParamType::Tuple(vec![
            field("owners", ParamType::Array(Box::new(ParamType::Address))),
            field("label", ParamType::String),
        ])));
        let resolved = resolve(
            vec![json!([
                {"owners": ["{address}", TOKEN], "label": "{address}"},
                {"owners": [ACCOUNT], "label": "mine"}
            ])],
            vec![spec("groups", ty)],
        )
        .await
        .unwrap();
        assert_eq!(
            resolved,
            vec![json!([
                {"owners": [ACCOUNT, TOKEN], "label": ACCOUNT},
                {"owners": [ACCOUNT], "label": "mine"}
            ])]
        );
    }

    #[tokio::test]
    async fn test_address_placeholder_needs_account() {
        let reader = RecordingReader::new(vec![]);
        let err = ArgumentResolver::new(None, 1, None, &reader)
            .resolve_args(&[json!("{address}")], &[spec("to", ParamType::Address)])
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::NotConnected);
    }

    fn balance_of_directive() -> Value {
        json!({"$read": {
            "abi": [{
                "type": "function", "name": "balanceOf", "stateMutability": "view",
                "inputs": [{"name": "owner", "type": "address"}],
                "outputs": [{"name": "balance", "type": "uint256"}]
            }],
            "args": ["{address}"]
        }})
    }

    #[tokio::test]
    async fn test_embedded_read_inherits_parent_target() {
        let reader = RecordingReader::new(vec![json!(["0x0400"])]);
        let resolved = ArgumentResolver::new(Some(ACCOUNT), 5, Some(TOKEN), &reader)
            .resolve_args(&[balance_of_directive()], &[spec("amount", ParamType::Uint(256))])
            .await
            .unwrap();
        assert_eq!(resolved, vec![json!("1024")]);

        let calls = reader.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].address, TOKEN);
        assert_eq!(calls[0].chain_id, 5);
        assert_eq!(calls[0].args, vec![json!(ACCOUNT)]);
    }

    #[tokio::test]
    async fn test_embedded_reads_run_in_order() {
        let mut second = balance_of_directive();
        second["$read"]["address"] = json!("0x00000000000000000000000000000000000000bb");
        second["$read"]["chainId"] = json!(137);

        let reader = RecordingReader::new(vec![json!("1"), json!({"balance": "2"})]);
        let resolved = ArgumentResolver::new(Some(ACCOUNT), 1, Some(TOKEN), &reader)
            .resolve_args(
                &[balance_of_directive(), second],
                &[spec("a", ParamType::Uint(256)), spec("b", ParamType::Uint(256))],
            )
            .await
            .unwrap();
        assert_eq!(resolved, vec![json!("1"), json!("2")]);

        let calls = reader.calls.lock().unwrap();
        assert_eq!(calls[0].chain_id, 1);
        assert_eq!(calls[1].chain_id, 137);
    }

    #[tokio::test]
    async fn test_nested_directive_in_directive_args() {
        let outer = json!({"$read": {
            "abi": [{
                "type": "function", "name": "allowance", "stateMutability": "view",
                "inputs": [
                    {"name": "owner", "type": "address"},
                    {"name": "spender", "type": "address"}
                ],
                "outputs": [{"name": "", "type": "uint256"}]
            }],
            "args": ["{address}", {"$read": {
                "abi": [{
                    "type": "function", "name": "router", "stateMutability": "view",
                    "inputs": [], "outputs": [{"name": "", "type": "address"}]
                }]
            }}]
        }});
        let router = "0x00000000000000000000000000000000000000dd";
        let reader = RecordingReader::new(vec![json!(router), json!("77")]);
        let resolved = ArgumentResolver::new(Some(ACCOUNT), 1, Some(TOKEN), &reader)
            .resolve_args(&[outer], &[spec("limit", ParamType::Uint(256))])
            .await
            .unwrap();
        assert_eq!(resolved, vec![json!("77")]);

        let calls = reader.calls.lock().unwrap();
        assert_eq!(calls[0].function.name, "router");
        assert_eq!(calls[1].args, vec![json!(ACCOUNT), json!(router)]);
    }

    #[tokio::test]
    async fn test_embedded_read_with_two_outputs_is_rejected() {
        let directive = json!({"$read": {
            "abi": [{
                "type": "function", "name": "getReserves", "stateMutability": "view",
                "inputs": [],
                "outputs": [
                    {"name": "reserve0", "type": "uint112"},
                    {"name": "reserve1", "type": "uint112"}
                ]
            }]
        }});
        let reader = RecordingReader::new(vec![json!(["1", "2"])]);
        let err = ArgumentResolver::new(Some(ACCOUNT), 1, Some(TOKEN), &reader)
            .resolve_args(&[directive], &[spec("x", ParamType::Uint(256))])
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::AmbiguousReadResult("getReserves".into()));
        assert!(reader.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_extract_single_shapes() {
        let function = ResolvedFunction {
            kind: crate::domain::abi::CallableKind::Function,
            name: "totalSupply".into(),
            inputs: vec![],
            outputs: vec![spec("supply", ParamType::Uint(256))],
            state_mutability: alloy_json_abi::StateMutability::View,
        };
        assert_eq!(extract_single(&function, json!("5")).unwrap(), json!("5"));
        assert_eq!(extract_single(&function, json!(["5"])).unwrap(), json!("5"));
        assert_eq!(extract_single(&function, json!({"supply": "5"})).unwrap(), json!("5"));
        assert_eq!(extract_single(&function, json!({"0": "5"})).unwrap(), json!("5"));
        assert_eq!(
            extract_single(&function, json!({"a": "5", "b": "6"})).unwrap_err().kind(),
            ErrorKind::AmbiguousReadResult
        );
        assert_eq!(
            extract_single(&function, json!(["5", "6"])).unwrap_err().kind(),
            ErrorKind::AmbiguousReadResult
        );
    }

    #[test]
    fn test_extract_single_keeps_array_outputs() {
        let function = ResolvedFunction {
            kind: crate::domain::abi::CallableKind::Function,
            name: "holders".into(),
            inputs: vec![],
            outputs: vec![spec("", ParamType::Array(Box::new(ParamType::Address)))],
            state_mutability: alloy_json_abi::StateMutability::View,
        };
        assert_eq!(
            extract_single(&function, json!([ACCOUNT, TOKEN])).unwrap(),
            json!([ACCOUNT, TOKEN])
        );
        assert_eq!(
            extract_single(&function, json!([[ACCOUNT]])).unwrap(),
            json!([ACCOUNT])
        );
    }

    #[test]
    fn test_extract_single_nested_array_output() {
        let function = ResolvedFunction {
            kind: crate::domain::abi::CallableKind::Function,
            name: "matrix".into(),
            inputs: vec![],
            outputs: vec![spec(
                "",
                ParamType::Array(Box::new(ParamType::Array(Box::new(ParamType::Uint(256))))),
            )],
            state_mutability: alloy_json_abi::StateMutability::View,
        };
        assert_eq!(
            extract_single(&function, json!([["1"], ["2"]])).unwrap(),
            json!([["1"], ["2"]])
        );
        assert_eq!(extract_single(&function, json!([["1"]])).unwrap(), json!([["1"]]));
        assert_eq!(extract_single(&function, json!([[]])).unwrap(), json!([[]]));
        assert_eq!(extract_single(&function, json!([[["1"]]])).unwrap(), json!([["1"]]));
    }

    #[tokio::test]
    async fn test_embedded_read_with_asked_address() {
        let mut directive = balance_of_directive();
        directive["$read"]["address"] = json!(" {ask} ");

        let reader = RecordingReader::new(vec![json!("1")]);
        let err = ArgumentResolver::new(Some(ACCOUNT), 1, Some(TOKEN), &reader)
            .resolve_args(&[directive], &[spec("amount", ParamType::Uint(256))])
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::MissingArgument("balanceOf.address".into()));
        assert!(reader.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_pending_inputs() {
        let params = vec![
            spec("to", ParamType::Address),
            spec("amount", ParamType::Uint(256)),
            spec("order", ParamType::Tuple(vec![field("x", ParamType::Bool)])),
            spec("", ParamType::Bool),
            spec("limit", ParamType::Uint(256)),
        ];
        let templates = vec![
            json!("{address}"),
            json!(ASK_PLACEHOLDER),
            json!({"x": true}),
            json!(""),
            balance_of_directive(),
        ];
        let pending = pending_inputs(&templates, &params);
        assert_eq!(
            pending,
            vec![
                InputSlot::Arg {
                    index: 1,
                    name: "amount".into(),
                    ty: "uint256".into()
                },
                InputSlot::Arg {
                    index: 2,
                    name: "order".into(),
                    ty: "(bool)".into()
                },
                InputSlot::Arg {
                    index: 3,
                    name: "#3".into(),
                    ty: "bool".into()
                },
            ]
        );
    }
}
