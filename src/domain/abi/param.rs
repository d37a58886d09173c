//! Tagged ABI parameter types
//!
//! Raw ABI JSON describes types as strings (`"uint256"`, `"tuple[]"`, ...).
//! They are decoded once into [`ParamType`] so the resolver and the codec
//! branch on a closed variant instead of re-parsing string prefixes.

use std::fmt;

use alloy_json_abi::Param as AbiParam;

use crate::domain::error::{EngineError, EngineResult};

/// A tuple component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    pub name: String,
    pub ty: ParamType,
}

/// Semantic type of an ABI parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Bool,
    Uint(usize),
    Int(usize),
    String,
    Bytes,
    FixedBytes(usize),
    Array(Box<ParamType>),
    FixedArray(Box<ParamType>, usize),
    Tuple(Vec<TupleField>),
}

impl ParamType {
    /// Decode the type of a raw ABI parameter, including tuple components
    pub fn from_abi(param: &AbiParam) -> EngineResult<Self> {
        Self::parse(&param.ty, &param.components)
    }

    /// Parse a type string; `components` supplies tuple members for `tuple...` types
    pub fn parse(ty: &str, components: &[AbiParam]) -> EngineResult<Self> {
        let ty = ty.trim();

        // Array suffixes bind from the right: `uint8[2][]` is a dynamic array of `uint8[2]`
        if let Some(stripped) = ty.strip_suffix(']') {
            let open = stripped
                .rfind('[')
                .ok_or_else(|| EngineError::MalformedAbi(format!("unbalanced brackets in '{ty}'")))?;
            let inner = Self::parse(&stripped[..open], components)?;
            let size = &stripped[open + 1..];
            if size.is_empty() {
                return Ok(ParamType::Array(Box::new(inner)));
            }
            let size: usize = size
                .parse()
                .map_err(|_| EngineError::MalformedAbi(format!("invalid array size in '{ty}'")))?;
            return Ok(ParamType::FixedArray(Box::new(inner), size));
        }

        match ty {
            "address" => Ok(ParamType::Address),
            "bool" => Ok(ParamType::Bool),
            "string" => Ok(ParamType::String),
            "bytes" => Ok(ParamType::Bytes),
            "uint" => Ok(ParamType::Uint(256)),
            "int" => Ok(ParamType::Int(256)),
            "tuple" => {
                let fields = components
                    .iter()
                    .map(|component| {
                        Ok(TupleField {
                            name: component.name.clone(),
                            ty: ParamType::from_abi(component)?,
                        })
                    })
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(ParamType::Tuple(fields))
            }
            _ => {
                if let Some(bits) = ty.strip_prefix("uint") {
                    return Ok(ParamType::Uint(parse_width(ty, bits)?));
                }
                if let Some(bits) = ty.strip_prefix("int") {
                    return Ok(ParamType::Int(parse_width(ty, bits)?));
                }
                if let Some(size) = ty.strip_prefix("bytes") {
                    let size: usize = size
                        .parse()
                        .map_err(|_| EngineError::MalformedAbi(format!("unknown type '{ty}'")))?;
                    if size == 0 || size > 32 {
                        return Err(EngineError::MalformedAbi(format!("invalid size in '{ty}'")));
                    }
                    return Ok(ParamType::FixedBytes(size));
                }
                Err(EngineError::MalformedAbi(format!("unsupported type '{ty}'")))
            }
        }
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, ParamType::Tuple(_))
    }
}

fn parse_width(ty: &str, bits: &str) -> EngineResult<usize> {
    let width: usize = bits
        .parse()
        .map_err(|_| EngineError::MalformedAbi(format!("unknown type '{ty}'")))?;
    if width == 0 || width > 256 || width % 8 != 0 {
        return Err(EngineError::MalformedAbi(format!("invalid width in '{ty}'")));
    }
    Ok(width)
}

/// Canonical Solidity spelling, as used in function signatures
impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::String => write!(f, "string"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::FixedBytes(size) => write!(f, "bytes{size}"),
            ParamType::Array(inner) => write!(f, "{inner}[]"),
            ParamType::FixedArray(inner, size) => write!(f, "{inner}[{size}]"),
            ParamType::Tuple(fields) => {
                let inner: Vec<String> = fields.iter().map(|field| field.ty.to_string()).collect();
                write!(f, "({})", inner.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, ty: &str, components: Vec<AbiParam>) -> AbiParam {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "type": ty,
            "components": components,
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(ParamType::parse("address", &[]).unwrap(), ParamType::Address);
        assert_eq!(ParamType::parse("uint256", &[]).unwrap(), ParamType::Uint(256));
        assert_eq!(ParamType::parse("int64", &[]).unwrap(), ParamType::Int(64));
        assert_eq!(ParamType::parse("uint", &[]).unwrap(), ParamType::Uint(256));
        assert_eq!(ParamType::parse("bytes32", &[]).unwrap(), ParamType::FixedBytes(32));
        assert_eq!(ParamType::parse("bytes", &[]).unwrap(), ParamType::Bytes);
    }

    #[test]
    fn test_parse_nested_arrays() {
        let ty = ParamType::parse("uint8[2][]", &[]).unwrap();
        assert_eq!(
            ty,
            ParamType::Array(Box::new(ParamType::FixedArray(Box::new(ParamType::Uint(8)), 2)))
        );
        assert_eq!(ty.to_string(), "uint8[2][]");
    }

    #[test]
    fn test_parse_tuple_array() {
        let components = vec![param("to", "address", vec![]), param("amount", "uint256", vec![])];
        let ty = ParamType::from_abi(&param("orders", "tuple[]", components)).unwrap();
        assert_eq!(ty.to_string(), "(address,uint256)[]");
        let ParamType::Array(inner) = ty else {
            panic!("expected array");
        };
        let ParamType::Tuple(fields) = *inner else {
            panic!("expected tuple");
        };
        assert_eq!(fields[1].name, "amount");
    }

    #[test]
    fn test_reject_invalid_types() {
        assert!(ParamType::parse("uint7", &[]).is_err());
        assert!(ParamType::parse("bytes33", &[]).is_err());
        assert!(ParamType::parse("function", &[]).is_err());
        assert!(ParamType::parse("uint256]", &[]).is_err());
    }
}
