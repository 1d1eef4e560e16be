//! Argument Coercion
//!
//! Converts raw call data (path segments, parameter strings, body elements)
//! into values matching a parameter's declared [`TypeTag`].
//!
//! # Type Mapping
//!
//! | Tag | Accepts |
//! |-----|---------|
//! | Bool | `true`/`false` (any case), `1`/`0`, JSON booleans and 0/1 numbers |
//! | Int | integer text, integral JSON numbers, booleans as 0/1 |
//! | Float | numeric text, JSON numbers |
//! | String | any text; JSON numbers and booleans are stringified |
//! | Value | anything, untouched |
//! | Params | JSON objects of scalars or arrays of scalars |
//!
//! Null converts to null for every tag: the slot simply stays unbound.

use qrpc_common::{Arg, Fault, MultiMap};
use serde_json::{Number, Value};
use std::fmt;

use crate::service::TypeTag;

/// Coerces a raw string, as found in a path segment or a call parameter.
pub fn coerce_str(tag: TypeTag, raw: &str) -> Result<Arg, Fault> {
    let value = match tag {
        TypeTag::Bool => Value::Bool(parse_bool(raw).ok_or_else(|| mismatch(tag, raw))?),
        TypeTag::Int => Value::from(raw.trim().parse::<i64>().map_err(|_| mismatch(tag, raw))?),
        TypeTag::Float => float(raw.trim().parse::<f64>().map_err(|_| mismatch(tag, raw))?, raw)?,
        TypeTag::String | TypeTag::Value => Value::String(raw.to_string()),
        TypeTag::Params | TypeTag::Callback => return Err(mismatch(tag, raw)),
    };
    Ok(Arg::Value(value))
}

/// Coerces a JSON value, as found in the call body.
pub fn coerce_value(tag: TypeTag, value: Value) -> Result<Arg, Fault> {
    if value.is_null() || tag == TypeTag::Value {
        return Ok(Arg::Value(value));
    }

    let converted = match (tag, value) {
        (TypeTag::Bool, Value::Bool(b)) => Value::Bool(b),
        (TypeTag::Bool, Value::Number(n)) => match n.as_i64() {
            Some(0) => Value::Bool(false),
            Some(1) => Value::Bool(true),
            _ => return Err(mismatch(tag, &n)),
        },

        (TypeTag::Int, Value::Number(n)) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Value::from(f as i64)
                }
                _ => return Err(mismatch(tag, &n)),
            },
        },
        (TypeTag::Int, Value::Bool(b)) => Value::from(b as i64),

        (TypeTag::Float, Value::Number(n)) => {
            let f = n.as_f64().ok_or_else(|| mismatch(tag, &n))?;
            float(f, &n)?
        }

        (TypeTag::String, Value::String(s)) => Value::String(s),
        (TypeTag::String, Value::Number(n)) => Value::String(n.to_string()),
        (TypeTag::String, Value::Bool(b)) => Value::String(b.to_string()),

        (TypeTag::Params, value) => {
            return MultiMap::from_json(&value)
                .map(Arg::Params)
                .ok_or_else(|| mismatch(tag, &value));
        }

        (_, Value::String(s)) => return coerce_str(tag, &s),
        (_, other) => return Err(mismatch(tag, &other)),
    };
    Ok(Arg::Value(converted))
}

/// Coerces an already-built argument. Callbacks pass through untouched.
pub fn coerce_arg(tag: TypeTag, arg: Arg) -> Result<Arg, Fault> {
    match (tag, arg) {
        (_, Arg::Callback(cb)) => Ok(Arg::Callback(cb)),
        (TypeTag::Params, Arg::Params(params)) => Ok(Arg::Params(params)),
        (_, Arg::Params(params)) => coerce_value(tag, params.to_json()),
        (_, Arg::Value(value)) => coerce_value(tag, value),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" => Some(true),
        "0" => Some(false),
        s if s.eq_ignore_ascii_case("true") => Some(true),
        s if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn float(f: f64, source: impl fmt::Display) -> Result<Value, Fault> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| Fault::Coercion(format!("{} is not a finite number", source)))
}

fn mismatch(tag: TypeTag, source: impl fmt::Display) -> Fault {
    Fault::Coercion(format!("cannot convert '{}' to {:?}", source, tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrpc_common::Callback;
    use serde_json::json;

    fn value(arg: Arg) -> Value {
        arg.as_value().cloned().expect("expected a value argument")
    }

    #[test]
    fn test_coerce_str() {
        assert_eq!(value(coerce_str(TypeTag::Int, "42").unwrap()), json!(42));
        assert_eq!(value(coerce_str(TypeTag::Int, " -7 ").unwrap()), json!(-7));
        assert_eq!(value(coerce_str(TypeTag::Float, "2.5").unwrap()), json!(2.5));
        assert_eq!(value(coerce_str(TypeTag::Bool, "TRUE").unwrap()), json!(true));
        assert_eq!(value(coerce_str(TypeTag::Bool, "0").unwrap()), json!(false));
        assert_eq!(value(coerce_str(TypeTag::String, "42").unwrap()), json!("42"));
        assert_eq!(value(coerce_str(TypeTag::Value, "x").unwrap()), json!("x"));
    }

    #[test]
    fn test_coerce_str_failures() {
        assert!(matches!(coerce_str(TypeTag::Int, "forty"), Err(Fault::Coercion(_))));
        assert!(matches!(coerce_str(TypeTag::Float, "NaN"), Err(Fault::Coercion(_))));
        assert!(matches!(coerce_str(TypeTag::Bool, "maybe"), Err(Fault::Coercion(_))));
        assert!(matches!(coerce_str(TypeTag::Params, "a=b"), Err(Fault::Coercion(_))));
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(value(coerce_value(TypeTag::Int, json!(3.0)).unwrap()), json!(3));
        assert_eq!(value(coerce_value(TypeTag::Int, json!("12")).unwrap()), json!(12));
        assert_eq!(value(coerce_value(TypeTag::Float, json!(1)).unwrap()), json!(1.0));
        assert_eq!(value(coerce_value(TypeTag::String, json!(5)).unwrap()), json!("5"));
        assert_eq!(value(coerce_value(TypeTag::Bool, json!(1)).unwrap()), json!(true));
        assert_eq!(value(coerce_value(TypeTag::Int, Value::Null).unwrap()), Value::Null);
        assert_eq!(
            value(coerce_value(TypeTag::Value, json!({"a": [1]})).unwrap()),
            json!({"a": [1]})
        );
        assert!(matches!(coerce_value(TypeTag::Int, json!(1.5)), Err(Fault::Coercion(_))));
        assert!(matches!(coerce_value(TypeTag::String, json!([1])), Err(Fault::Coercion(_))));
    }

    #[test]
    fn test_coerce_params() {
        let arg = coerce_value(TypeTag::Params, json!({"q": "x", "n": [1, 2]})).unwrap();
        match arg {
            Arg::Params(params) => {
                assert_eq!(params.get_first("q"), Some("x"));
                assert_eq!(params.get_all("n").len(), 2);
            }
            other => panic!("expected params, got {:?}", other),
        }
        assert!(matches!(coerce_value(TypeTag::Params, json!(3)), Err(Fault::Coercion(_))));
    }

    #[test]
    fn test_coerce_arg() {
        let params = MultiMap::new().with("id", "9");
        assert!(matches!(
            coerce_arg(TypeTag::Params, Arg::Params(params.clone())).unwrap(),
            Arg::Params(_)
        ));
        assert_eq!(
            value(coerce_arg(TypeTag::Value, Arg::Params(params)).unwrap()),
            json!({"id": "9"})
        );
        assert!(coerce_arg(TypeTag::Int, Arg::Callback(Callback::new(|_| {})))
            .unwrap()
            .is_callback());
    }
}
