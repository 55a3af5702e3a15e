use super::{Scalar, ScalarError};
use crate::value::Value;

/// Boolean, wire form `"0x0"`/`"0x1"`. Accepts `true|false|"0x0"|"0x1"|0|1`
/// on load for interoperability with loosely-typed callers.
pub struct Boolean;

impl Scalar for Boolean {
    const NAME: &'static str = "Boolean";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let b = match wire {
            Value::Bool(b) => *b,
            Value::Int(0) => false,
            Value::Int(1) => true,
            Value::Str(s) if s == "0x0" => false,
            Value::Str(s) if s == "0x1" => true,
            _ => return Err(ScalarError),
        };
        Ok(Value::Bool(b))
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        let b = host.as_bool().ok_or(ScalarError)?;
        Ok(Value::Str(if b { "0x1".into() } else { "0x0".into() }))
    }
}
