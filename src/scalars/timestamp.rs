use super::{Scalar, ScalarError};
use crate::value::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Microseconds since the Unix epoch, wall clock. Host and wire
/// representations are both microsecond counts; the wire form is always
/// `0x`-hex (Open Question (b), SPEC_FULL.md §3: the historical
/// plain-integer/hex inconsistency is not replicated here).
pub struct Timestamp;

impl Scalar for Timestamp {
    const NAME: &'static str = "Timestamp";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let micros = match wire {
            Value::Int(i) => *i,
            Value::Str(s) => {
                let hex = s.strip_prefix("0x").ok_or(ScalarError)?;
                i128::from_str_radix(hex, 16).map_err(|_| ScalarError)?
            }
            _ => return Err(ScalarError),
        };
        if micros < 0 {
            return Err(ScalarError);
        }
        Ok(Value::Int(micros))
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        let micros = host.as_int().ok_or(ScalarError)?;
        if micros < 0 {
            return Err(ScalarError);
        }
        Ok(Value::Str(format!("0x{:x}", micros as u128)))
    }
}

impl Timestamp {
    /// Current wall-clock time as microseconds since the epoch, used as the
    /// default for `timestamp` in the request builder.
    pub fn now_micros() -> i128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is after the Unix epoch")
            .as_micros() as i128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_is_always_hex() {
        assert_eq!(
            Timestamp::dump(&Value::Int(1_600_000_000_000_000)).unwrap(),
            Value::Str(format!("0x{:x}", 1_600_000_000_000_000u128))
        );
    }

    #[test]
    fn load_accepts_both_forms() {
        assert_eq!(Timestamp::load(&Value::Int(5)).unwrap(), Value::Int(5));
        assert_eq!(
            Timestamp::load(&Value::Str("0x5".into())).unwrap(),
            Value::Int(5)
        );
    }

    #[test]
    fn round_trip() {
        let now = Timestamp::now_micros();
        let wire = Timestamp::dump(&Value::Int(now)).unwrap();
        assert_eq!(Timestamp::load(&wire).unwrap(), Value::Int(now));
    }
}
