use super::{Scalar, ScalarError};
use crate::value::Value;

/// Plain text, identical on the wire and in-host.
pub struct StringScalar;

impl Scalar for StringScalar {
    const NAME: &'static str = "String";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let s = wire.as_str().ok_or(ScalarError)?;
        Ok(Value::Str(s.to_string()))
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        Self::load(host)
    }
}
