use super::{Scalar, ScalarError};
use crate::value::Value;

fn is_lowercase_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

fn check_prefixed(s: &str, prefixes: &[&str], body_len: usize) -> bool {
    prefixes.iter().any(|p| {
        s.len() == p.len() + body_len && s.starts_with(p) && is_lowercase_hex(&s[p.len()..])
    })
}

/// `hx…`/`cx…`, 42 characters total, either prefix accepted.
pub struct Address;

impl Scalar for Address {
    const NAME: &'static str = "Address";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let s = wire.as_str().ok_or(ScalarError)?;
        if check_prefixed(s, &["hx", "cx"], 40) {
            Ok(Value::Str(s.to_string()))
        } else {
            Err(ScalarError)
        }
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        Self::load(host)
    }
}

/// Externally Owned Account address: `hx` + 40 lowercase hex. Rejects `cx`.
pub struct Eoa;

impl Scalar for Eoa {
    const NAME: &'static str = "EOA";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let s = wire.as_str().ok_or(ScalarError)?;
        if check_prefixed(s, &["hx"], 40) {
            Ok(Value::Str(s.to_string()))
        } else {
            Err(ScalarError)
        }
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        Self::load(host)
    }
}

/// Smart Contract address: `cx` + 40 lowercase hex. Rejects `hx`.
pub struct Score;

impl Scalar for Score {
    const NAME: &'static str = "SCORE";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let s = wire.as_str().ok_or(ScalarError)?;
        if check_prefixed(s, &["cx"], 40) {
            Ok(Value::Str(s.to_string()))
        } else {
            Err(ScalarError)
        }
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        Self::load(host)
    }
}

/// `0x` + 64 lowercase hex.
pub struct Hash;

impl Scalar for Hash {
    const NAME: &'static str = "Hash";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let s = wire.as_str().ok_or(ScalarError)?;
        if check_prefixed(s, &["0x"], 64) {
            Ok(Value::Str(s.to_string()))
        } else {
            Err(ScalarError)
        }
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        Self::load(host)
    }
}

/// The 21-byte zero SCORE address used as the `to` of `install_score`.
pub const ZERO_SCORE_ADDRESS: &str = "cx0000000000000000000000000000000000000000";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_accepts_either_prefix() {
        assert!(Address::load(&Value::Str(
            "hxbe258ceb872e08851f1f59694dac2558708ece11".into()
        ))
        .is_ok());
        assert!(Address::load(&Value::Str(
            "cxb0776ee37f5b45bfaea8cff1d8232fbb6122ec32".into()
        ))
        .is_ok());
    }

    #[test]
    fn eoa_rejects_score_prefix() {
        assert!(Eoa::load(&Value::Str(
            "cxb0776ee37f5b45bfaea8cff1d8232fbb6122ec32".into()
        ))
        .is_err());
    }

    #[test]
    fn score_rejects_eoa_prefix() {
        assert!(Score::load(&Value::Str(
            "hxbe258ceb872e08851f1f59694dac2558708ece11".into()
        ))
        .is_err());
    }

    #[test]
    fn rejects_wrong_length_or_uppercase() {
        assert!(Address::load(&Value::Str("hxbe258c".into())).is_err());
        assert!(Address::load(&Value::Str(
            "hxBE258ceb872e08851f1f59694dac2558708ece11".into()
        ))
        .is_err());
    }

    #[test]
    fn hash_requires_64_hex_chars() {
        let ok = format!("0x{}", "a".repeat(64));
        assert!(Hash::load(&Value::Str(ok)).is_ok());
        let short = format!("0x{}", "a".repeat(63));
        assert!(Hash::load(&Value::Str(short)).is_err());
    }
}
