use super::{Scalar, ScalarError};
use crate::value::Value;
use base64::Engine;

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// A 65-byte recoverable secp256k1 signature, wire form standard base64.
pub struct Signature;

impl Scalar for Signature {
    const NAME: &'static str = "Signature";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let s = wire.as_str().ok_or(ScalarError)?;
        let bytes = ENGINE.decode(s).map_err(|_| ScalarError)?;
        if bytes.len() != 65 {
            return Err(ScalarError);
        }
        Ok(Value::Str(s.to_string()))
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        Self::load(host)
    }
}

impl Signature {
    /// Encode a raw 65-byte recoverable signature to its wire base64 form.
    pub fn encode(bytes: &[u8; 65]) -> String {
        ENGINE.encode(bytes)
    }

    /// Decode a wire base64 signature back to its raw 65 bytes.
    pub fn decode(wire: &str) -> Result<[u8; 65], ScalarError> {
        let bytes = ENGINE.decode(wire).map_err(|_| ScalarError)?;
        bytes.try_into().map_err(|_| ScalarError)
    }
}
