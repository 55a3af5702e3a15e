use super::{Scalar, ScalarError};
use crate::value::Value;

/// Byte sequence, wire form `0x` + even-length lowercase hex.
///
/// Per §4.1: if `dump` is handed a plain text string rather than an
/// already-hex-encoded one (e.g. a caller-supplied message body), it is
/// treated as UTF-8 bytes and hex-encoded directly — there is no way to
/// distinguish "already hex" from "plain text that happens to look like
/// hex" at this layer, so callers that mean hex must dump bytes, not text;
/// [`BinaryData::dump_text`] is the explicit entry point for the text case.
pub struct BinaryData;

impl Scalar for BinaryData {
    const NAME: &'static str = "BinaryData";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let s = wire.as_str().ok_or(ScalarError)?;
        let hex_part = s.strip_prefix("0x").ok_or(ScalarError)?;
        if hex_part.len() % 2 != 0 {
            return Err(ScalarError);
        }
        if !hex_part.is_empty() && !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ScalarError);
        }
        let bytes = hex::decode(hex_part).map_err(|_| ScalarError)?;
        Ok(Value::Str(format!("0x{}", hex::encode(bytes))))
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        // A dump input is already the on-wire hex form produced by a prior
        // load, or caller-supplied raw bytes expressed as a hex string.
        Self::load(host)
    }
}

impl BinaryData {
    /// Hex-encode a UTF-8 text payload (e.g. `send_message`'s `data`).
    pub fn dump_text(text: &str) -> Value {
        Value::Str(format!("0x{}", hex::encode(text.as_bytes())))
    }
}
